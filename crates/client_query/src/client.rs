//! Round-trip execution of batches against a site.

use std::sync::Arc;

use async_trait::async_trait;
use http::header::{HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

use crate::providers::{DigestProvider, TokenProvider};
use crate::request::ClientQueryRequest;
use crate::response::BatchResults;
use crate::transport::HttpTransport;
use crate::Error;

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

/// Path of the batch endpoint, relative to the site URL.
pub const PROCESS_QUERY_PATH: &str = "/_vti_bin/client.svc/ProcessQuery";

const REQUEST_DIGEST: HeaderName = HeaderName::from_static("x-requestdigest");
const ODATA_NO_METADATA: &str = "application/json;odata=nometadata";

/// The site a call is made against and the name the caller reports to the server.
///
/// Passed explicitly into every call; nothing about the connection is kept in global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    pub site_url: Url,
    pub application_name: String,
}

impl ClientContext {
    pub fn new(site_url: Url, application_name: impl Into<String>) -> Self {
        Self {
            site_url,
            application_name: application_name.into(),
        }
    }

    /// The scheme and host of the site, which is the resource tokens are issued for.
    pub fn resource(&self) -> String {
        self.site_url.origin().ascii_serialization()
    }

    /// Absolute URL of the batch endpoint for this site.
    pub fn process_query_url(&self) -> String {
        format!(
            "{}{}",
            self.site_url.as_str().trim_end_matches('/'),
            PROCESS_QUERY_PATH
        )
    }
}

/// Sends one batch and returns its decoded results.
#[async_trait]
pub trait BatchRunner: Send + Sync {
    /// Executes `request` against the site in `context`.
    ///
    /// # Errors
    ///
    /// Any [`Error`] variant. The batch either fully decodes or fails as a whole.
    async fn run_batch(
        &self,
        context: &ClientContext,
        request: &ClientQueryRequest,
    ) -> Result<BatchResults, Error>;
}

/// [`BatchRunner`] that talks to the service through an [`HttpTransport`].
#[derive(Clone)]
pub struct ClientQueryClient {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenProvider>,
    digests: Arc<dyn DigestProvider>,
}

impl ClientQueryClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenProvider>,
        digests: Arc<dyn DigestProvider>,
    ) -> Self {
        Self {
            transport,
            tokens,
            digests,
        }
    }

    /// GETs a REST resource under the site in `context` and returns the JSON body.
    ///
    /// `path` is appended to the site URL as is, so it must already be percent-safe.
    ///
    /// # Errors
    ///
    /// - `Error::AuthError` if no token can be obtained
    /// - `Error::TransportError` if the server rejects the request
    #[instrument(skip(self, context), fields(site = %context.site_url))]
    pub async fn get_json(&self, context: &ClientContext, path: &str) -> Result<Value, Error> {
        let token = self.tokens.access_token(&context.resource()).await?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer(&token)?);
        headers.insert(ACCEPT, HeaderValue::from_static(ODATA_NO_METADATA));

        let url = format!(
            "{}/{}",
            context.site_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        self.transport.get(&url, headers).await
    }
}

fn bearer(token: &SecretString) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
        .map_err(|_| Error::AuthError("access token contains invalid characters".to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

#[async_trait]
impl BatchRunner for ClientQueryClient {
    #[instrument(
        skip(self, context, request),
        fields(site = %context.site_url, actions = request.actions().len())
    )]
    async fn run_batch(
        &self,
        context: &ClientContext,
        request: &ClientQueryRequest,
    ) -> Result<BatchResults, Error> {
        let body = request.to_xml(&context.application_name)?;

        let token = self.tokens.access_token(&context.resource()).await?;
        let digest = self.digests.form_digest(context.site_url.as_str()).await?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer(&token)?);
        headers.insert(
            REQUEST_DIGEST,
            HeaderValue::from_str(&digest).map_err(|_| {
                Error::AuthError("form digest contains invalid characters".to_string())
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/xml"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        debug!(body_len = body.len(), "Sending batch");
        let response = self
            .transport
            .post(&context.process_query_url(), headers, body)
            .await?;

        let results = request.decode_response(&response)?;
        info!(results = results.len(), "Batch completed");
        Ok(results)
    }
}
