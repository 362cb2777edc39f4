#[allow(clippy::module_inception)]
mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;

use reqwest::{Client, RequestBuilder, Url};

/// A typed request against the daemon's HTTP API.
///
/// `Response` is what [`ApiClient::call`] decodes the JSON body into;
///  requests that answer with a byte stream go through [`ApiClient::call_raw`].
pub trait ApiRequest {
    type Response;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder;
}
