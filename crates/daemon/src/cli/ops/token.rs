use clap::Args;

use common::token::{TokenError, TokenSigner};
use gophernest_daemon::state::{AppState, StateError, JWT_SECRET_ENV};

#[derive(Args, Debug, Clone)]
pub struct Token {
    /// Subject recorded in the token
    #[arg(long, default_value = "gophernest")]
    pub subject: String,

    /// Token lifetime in days (default from config)
    #[arg(long)]
    pub ttl_days: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenOpError {
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("{0} is not set")]
    MissingSecret(&'static str),
    #[error("token lifetime must be positive")]
    InvalidTtl,
    #[error("token error: {0}")]
    Token(#[from] TokenError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Token {
    type Error = TokenOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let ttl_days = match self.ttl_days {
            Some(days) => days,
            None => AppState::load(ctx.config_path.clone())?.config.token_ttl_days,
        };
        if ttl_days <= 0 {
            return Err(TokenOpError::InvalidTtl);
        }

        let secret = AppState::jwt_secret().ok_or(TokenOpError::MissingSecret(JWT_SECRET_ENV))?;
        let signer = TokenSigner::new(secret)?;
        Ok(signer.mint(&self.subject, chrono::Duration::days(ttl_days))?)
    }
}
