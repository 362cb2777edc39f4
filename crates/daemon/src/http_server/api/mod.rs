use axum::middleware;
use axum::Router;

pub mod client;
pub mod v1;

use super::auth;
use crate::ServiceState;

/// Every route under here requires a bearer token.
pub fn router(state: ServiceState) -> Router<ServiceState> {
    v1::router(state.clone())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ))
        .with_state(state)
}
