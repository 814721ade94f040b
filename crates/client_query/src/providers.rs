//! Collaborator interfaces for credentials.
//!
//! The client never stores tokens or digests between calls; it asks these providers for
//! fresh values on every round trip.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::Error;

/// Supplies bearer tokens for a target resource.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a bearer token valid for `resource` (the site origin, e.g.
    /// `https://contoso.sharepoint.com`).
    ///
    /// # Errors
    ///
    /// Returns `Error::AuthError` with the provider's message if no token can be obtained.
    async fn access_token(&self, resource: &str) -> Result<SecretString, Error>;
}

/// Supplies the anti-forgery form digest required by mutating calls.
#[async_trait]
pub trait DigestProvider: Send + Sync {
    /// Returns the `FormDigestValue` for `site_url`.
    ///
    /// # Errors
    ///
    /// Returns `Error::AuthError` or `Error::TransportError` if the digest cannot be obtained.
    async fn form_digest(&self, site_url: &str) -> Result<String, Error>;
}
