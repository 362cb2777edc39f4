use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::header::AUTHORIZATION;
use http::StatusCode;

use common::token::TokenError;

use crate::ServiceState;

/// Gate requests on a valid `Authorization: Bearer <token>` header.
///
/// The second space-separated piece of the header is taken as the token,
///  the scheme word itself is not checked.
pub async fn require_bearer(
    State(state): State<ServiceState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    let token = header
        .split(' ')
        .nth(1)
        .ok_or(AuthError::MalformedHeader)?;

    let signer = state.signer().ok_or(AuthError::NotConfigured)?;
    let claims = signer.verify(token)?;
    tracing::debug!(sub = %claims.sub, "request authorized");

    Ok(next.run(request).await)
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("malformed authorization header")]
    MalformedHeader,
    #[error("token secret not configured")]
    NotConfigured,
    #[error("token rejected: {0}")]
    Rejected(#[from] TokenError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingHeader | AuthError::MalformedHeader => {
                tracing::debug!("{}", self);
                StatusCode::UNAUTHORIZED.into_response()
            }
            AuthError::Rejected(ref e) => {
                tracing::debug!(error = %e, "token rejected");
                StatusCode::FORBIDDEN.into_response()
            }
            AuthError::NotConfigured => {
                tracing::error!("{}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "code": 500,
                        "message": "JWT secret not configured",
                    })),
                )
                    .into_response()
            }
        }
    }
}
