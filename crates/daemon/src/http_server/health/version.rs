use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;

pub async fn handler() -> impl IntoResponse {
    (StatusCode::OK, Json(common::prelude::build_info()))
}
