use std::path::PathBuf;

use clap::Args;

use common::archive::HiddenPolicy;
use gophernest_daemon::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// API server port
    #[arg(long, default_value_t = 5000)]
    pub api_port: u16,

    /// Directory served by default (defaults to the home directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Refuse to read anything outside the root directory
    #[arg(long)]
    pub confine_to_root: bool,

    /// Include hidden directories and files in downloads
    #[arg(long)]
    pub include_hidden: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            api_port: self.api_port,
            root: self.root.clone().unwrap_or(defaults.root.clone()),
            confine_to_root: self.confine_to_root,
            hidden_policy: if self.include_hidden {
                HiddenPolicy::Include
            } else {
                defaults.hidden_policy
            },
            ..defaults
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        Ok(format!(
            "Initialized gophernest directory at: {}\n\
             - Config: {}\n\
             - Logs: {}\n\
             - API port: {}\n\
             - Root: {}\n\
             - Confined to root: {}",
            state.config_dir.display(),
            state.config_path.display(),
            state.logs_path.display(),
            state.config.api_port,
            state.config.root.display(),
            state.config.confine_to_root,
        ))
    }
}
