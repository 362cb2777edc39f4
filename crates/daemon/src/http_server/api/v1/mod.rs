use axum::routing::{get, post};
use axum::Router;

use crate::ServiceState;

pub mod children;
pub mod download;
pub mod healthcheck;

// Re-export for convenience
pub use children::ChildrenRequest;
pub use download::DownloadRequest;
pub use healthcheck::HealthcheckRequest;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/healthcheck", get(healthcheck::handler))
        .route("/children", get(children::handler))
        .route("/download", post(download::handler))
        .with_state(state)
}

/// Error body shared by the v1 endpoints.
pub(crate) fn error_body(code: http::StatusCode, error: impl Into<String>) -> serde_json::Value {
    serde_json::json!({
        "code": code.as_u16(),
        "error": error.into(),
    })
}
