use axum::extract::{Json, State};
use axum::response::IntoResponse;
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::http_server::api::client::ApiRequest;
use crate::ServiceState;

const ROOT_MISSING: &str = "The root directory could not be found.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthcheckRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Healthcheck {
    pub health: String,
    pub errors: Vec<String>,
    pub directory_found: bool,
}

/// Always answers 200; the payload says whether the server can see its root.
pub async fn handler(State(state): State<ServiceState>) -> impl IntoResponse {
    let directory_found = tokio::fs::metadata(state.root())
        .await
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false);

    let report = if directory_found {
        Healthcheck {
            health: "Server is in good health".to_string(),
            errors: Vec::new(),
            directory_found,
        }
    } else {
        Healthcheck {
            health: "Server is in bad health".to_string(),
            errors: vec![ROOT_MISSING.to_string()],
            directory_found,
        }
    };

    (StatusCode::OK, Json(report))
}

impl ApiRequest for HealthcheckRequest {
    type Response = Healthcheck;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/v1/healthcheck").unwrap();
        client.get(full_url)
    }
}
