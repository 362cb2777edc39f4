use std::path::PathBuf;

use axum::extract::{Json, Query, State};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::archive::PolicyViolation;
use common::entry::{list_children, Entry, ListError};

use super::error_body;
use crate::http_server::api::client::ApiRequest;
use crate::ServiceState;

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct ChildrenRequest {
    /// Directory to list (defaults to the server's root)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    pub path: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Query(req): Query<ChildrenRequest>,
) -> Result<impl IntoResponse, ChildrenError> {
    let dir = req
        .path
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| state.root().to_path_buf());

    state.policy().check(&dir).await?;
    let children: Vec<Entry> = list_children(&dir).await?;

    Ok((StatusCode::OK, Json(children)))
}

#[derive(Debug, thiserror::Error)]
pub enum ChildrenError {
    #[error("path not allowed: {0}")]
    Forbidden(#[from] PolicyViolation),
    #[error(transparent)]
    List(#[from] ListError),
}

impl IntoResponse for ChildrenError {
    fn into_response(self) -> Response {
        let status = match self {
            ChildrenError::Forbidden(_) => {
                tracing::warn!("{}", self);
                StatusCode::FORBIDDEN
            }
            ChildrenError::List(_) => {
                tracing::error!("{}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(error_body(status, self.to_string()))).into_response()
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for ChildrenRequest {
    type Response = Vec<Entry>;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/v1/children").unwrap();
        client.get(full_url).query(&self)
    }
}
