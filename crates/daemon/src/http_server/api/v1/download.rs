use std::io;

use axum::body::{Body, Bytes};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::io::DuplexStream;
use tokio::sync::oneshot;
use tokio_util::io::ReaderStream;

use common::archive::{build_archive, ArchiveError, ArchiveRequest, RequestError};

use super::error_body;
use crate::http_server::api::client::ApiRequest;
use crate::ServiceState;

/// Bytes buffered between the archive producer and the response body.
const PIPE_CAPACITY: usize = 64 * 1024;

pub const ARCHIVE_FILE_NAME: &str = "downloads.zip";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRequest {
    #[serde(rename = "filePaths")]
    pub file_paths: Vec<String>,
}

/// Stream a zip of the requested files and directories.
///
/// The body is validated before anything touches the filesystem. After
///  that the archive is produced on its own task and streamed through a
///  bounded pipe, so a slow client slows the producer down and a gone
///  client stops it.
pub async fn handler(
    State(state): State<ServiceState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, DownloadError> {
    let Json(body) = body?;
    let request = ArchiveRequest::from_value(&body)?;

    let (reader, writer) = tokio::io::duplex(PIPE_CAPACITY);
    let options = state.archive_options();
    let policy = state.policy();
    let requested = request.paths().len();
    let (done_tx, done_rx) = oneshot::channel();

    tokio::spawn(async move {
        let outcome = build_archive(&request, writer, options, policy.as_ref()).await;
        match &outcome {
            Ok(report) => {
                for skipped in &report.skipped {
                    tracing::debug!(
                        path = %skipped.path.display(),
                        reason = %skipped.reason,
                        "left out of archive"
                    );
                }
                tracing::info!(
                    requested,
                    entries = report.entry_count(),
                    bytes = report.bytes_read,
                    skipped = report.skipped.len(),
                    "archive complete"
                );
            }
            Err(e) => {
                tracing::warn!(requested, error = %e, "archive aborted");
            }
        }
        let _ = done_tx.send(outcome.map(|_| ()));
    });

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, "application/zip".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename={}", ARCHIVE_FILE_NAME),
            ),
        ],
        archive_body(reader, done_rx),
    )
        .into_response())
}

/// Response body fed by the archive producer.
///
/// Once the pipe drains, the producer's outcome decides how the body ends:
///  a clean finish, or an error that makes the server cut the connection
///  instead of passing off a truncated zip as complete.
fn archive_body(
    reader: DuplexStream,
    done: oneshot::Receiver<Result<(), ArchiveError>>,
) -> Body {
    let tail = futures::stream::once(done).filter_map(|outcome| async move {
        match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(Err::<Bytes, _>(io::Error::other(e))),
            Err(_) => Some(Err(io::Error::other("archive producer exited early"))),
        }
    });
    Body::from_stream(ReaderStream::new(reader).chain(tail))
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),
    #[error("invalid file paths: {0}")]
    Paths(#[from] RequestError),
}

impl IntoResponse for DownloadError {
    fn into_response(self) -> Response {
        tracing::debug!("rejecting download: {}", self);
        (
            StatusCode::BAD_REQUEST,
            Json(error_body(
                StatusCode::BAD_REQUEST,
                "Invalid file paths provided.",
            )),
        )
            .into_response()
    }
}

// Client implementation - the response is a zip stream, use `ApiClient::call_raw`
impl ApiRequest for DownloadRequest {
    type Response = ();

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/v1/download").unwrap();
        client.post(full_url).json(&self)
    }
}
