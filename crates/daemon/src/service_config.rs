use std::path::PathBuf;

use common::archive::ArchiveOptions;

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// Port for the API HTTP server.
    pub api_port: u16,
    /// Origins allowed by the CORS layer
    pub allowed_origins: Vec<String>,

    // filesystem configuration
    /// Directory listed when no path is given, and the
    ///  confinement root when `confine_to_root` is set
    pub root: PathBuf,
    pub confine_to_root: bool,
    pub archive: ArchiveOptions,

    // auth
    /// Secret used to verify bearer tokens. Protected routes
    ///  answer 500 while this is unset.
    pub jwt_secret: Option<String>,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}
