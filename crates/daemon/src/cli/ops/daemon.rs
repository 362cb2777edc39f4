use clap::Args;

use common::archive::ArchiveOptions;
use gophernest_daemon::state::AppState;
use gophernest_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override API server port (default from config)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Override the served root directory (default from config)
    #[arg(long)]
    pub root: Option<std::path::PathBuf>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,

    /// Log level for stdout and file logs
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] gophernest_daemon::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // Load state from config path (or default ~/.gophernest)
        let state = AppState::load(ctx.config_path.clone())?;

        let config = ServiceConfig {
            api_port: self.api_port.unwrap_or(state.config.api_port),
            allowed_origins: state.config.allowed_origins.clone(),
            root: self.root.clone().unwrap_or(state.config.root.clone()),
            confine_to_root: state.config.confine_to_root,
            archive: ArchiveOptions::new(state.config.hidden_policy, state.config.max_depth),
            jwt_secret: AppState::jwt_secret(),
            log_level: self.log_level,
            log_dir: self.log_dir.clone(),
        };

        spawn_service(&config).await;
        Ok("daemon ended".to_string())
    }
}
