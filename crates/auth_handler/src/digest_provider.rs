//! Form digest retrieval through the `contextinfo` endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use client_query::{DigestProvider, Error, HttpTransport, TokenProvider};
use http::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use http::HeaderMap;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::{AuthError, AuthResult};

#[cfg(test)]
#[path = "digest_provider_tests.rs"]
mod tests;

const CONTEXT_INFO_PATH: &str = "/_api/contextinfo";

/// Requests a fresh form digest from `{site}/_api/contextinfo` on every call.
#[derive(Clone)]
pub struct ContextInfoDigestProvider {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenProvider>,
}

impl ContextInfoDigestProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { transport, tokens }
    }

    fn resource(site_url: &str) -> AuthResult<String> {
        let url = Url::parse(site_url)
            .map_err(|e| AuthError::DigestError(format!("invalid site URL '{}': {}", site_url, e)))?;
        Ok(url.origin().ascii_serialization())
    }
}

fn read_digest(body: &str) -> AuthResult<String> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        AuthError::DigestError(format!("context info response is not valid JSON: {}", e))
    })?;

    value
        .get("FormDigestValue")
        .or_else(|| value.pointer("/d/GetContextWebInformation/FormDigestValue"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            AuthError::DigestError("context info response has no FormDigestValue".to_string())
        })
}

#[async_trait]
impl DigestProvider for ContextInfoDigestProvider {
    #[instrument(skip(self))]
    async fn form_digest(&self, site_url: &str) -> Result<String, Error> {
        let token = self
            .tokens
            .access_token(&Self::resource(site_url)?)
            .await?;

        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|_| AuthError::InvalidCredentials)?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json;odata=nometadata"),
        );

        let url = format!("{}{}", site_url.trim_end_matches('/'), CONTEXT_INFO_PATH);
        let body = self
            .transport
            .post(&url, headers, String::new())
            .await
            .map_err(|e| match e {
                Error::TransportError(message) => AuthError::DigestError(message),
                other => AuthError::DigestError(other.to_string()),
            })?;

        let digest = read_digest(&body)?;
        debug!("Retrieved form digest");
        Ok(digest)
    }
}
