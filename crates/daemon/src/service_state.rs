use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::archive::{AllowAll, ArchiveOptions, PathPolicy, RootConfined};
use common::token::{TokenError, TokenSigner};

use super::service_config::Config;

struct Inner {
    root: PathBuf,
    archive: ArchiveOptions,
    policy: Arc<dyn PathPolicy>,
    signer: Option<TokenSigner>,
}

/// Everything request handlers need, built once at startup.
#[derive(Clone)]
pub struct State(Arc<Inner>);

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        let policy: Arc<dyn PathPolicy> = if config.confine_to_root {
            tracing::info!(root = %config.root.display(), "confining archives to root");
            Arc::new(RootConfined::new(&config.root))
        } else {
            Arc::new(AllowAll)
        };

        let signer = match config.jwt_secret.as_deref() {
            Some(secret) => Some(TokenSigner::new(secret)?),
            None => {
                tracing::warn!("no token secret configured, protected routes will fail");
                None
            }
        };

        if !config.root.is_dir() {
            tracing::warn!(root = %config.root.display(), "root directory not found");
        }

        Ok(Self::new(
            config.root.clone(),
            config.archive,
            policy,
            signer,
        ))
    }

    pub fn new(
        root: PathBuf,
        archive: ArchiveOptions,
        policy: Arc<dyn PathPolicy>,
        signer: Option<TokenSigner>,
    ) -> Self {
        Self(Arc::new(Inner {
            root,
            archive,
            policy,
            signer,
        }))
    }

    pub fn root(&self) -> &Path {
        &self.0.root
    }

    pub fn archive_options(&self) -> ArchiveOptions {
        self.0.archive
    }

    pub fn policy(&self) -> Arc<dyn PathPolicy> {
        self.0.policy.clone()
    }

    pub fn signer(&self) -> Option<&TokenSigner> {
        self.0.signer.as_ref()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("invalid token secret: {0}")]
    InvalidSecret(#[from] TokenError),
}
