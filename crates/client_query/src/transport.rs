//! HTTP transport used to reach the service.
//!
//! The transport only moves bytes. Building requests and decoding batch responses happen in the
//! callers so that tests can swap in a fake without touching the wire format.

use async_trait::async_trait;
use http::HeaderMap;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::Error;

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;

/// Performs the raw HTTP exchanges needed by the client.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POSTs `body` to `url` and returns the response body as text.
    ///
    /// # Errors
    ///
    /// Returns `Error::TransportError` if the request cannot be sent or the server answers
    /// with a non-success status. The message has the form `"{status} - {body}"`.
    async fn post(&self, url: &str, headers: HeaderMap, body: String) -> Result<String, Error>;

    /// GETs `url` and returns the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::TransportError` on connection failures or non-success statuses and
    /// `Error::MalformedResponse` if the body is not JSON.
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<Value, Error>;
}

/// [`HttpTransport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn read_body(response: reqwest::Response) -> Result<String, Error> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::TransportError(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "Request rejected by the server");
            return Err(Error::TransportError(format!(
                "{} - {}",
                status.as_u16(),
                body
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, headers, body), fields(body_len = body.len()))]
    async fn post(&self, url: &str, headers: HeaderMap, body: String) -> Result<String, Error> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::TransportError(e.to_string()))?;

        Self::read_body(response).await
    }

    #[instrument(skip(self, headers))]
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<Value, Error> {
        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| Error::TransportError(e.to_string()))?;

        let body = Self::read_body(response).await?;
        serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(format!("response is not valid JSON: {}", e)))
    }
}
