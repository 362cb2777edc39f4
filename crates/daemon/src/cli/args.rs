pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "gophernest")]
#[command(about = "Serve a filesystem over HTTP and download zipped bundles from it")]
pub struct Args {
    /// Daemon URL (defaults to localhost on the configured api_port)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the gophernest config directory (defaults to ~/.gophernest)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Bearer token sent with API requests
    #[arg(long, global = true, env = "GOPHERNEST_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}
