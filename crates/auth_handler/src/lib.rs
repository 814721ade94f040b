//! Credential providers for the batch client.
//!
//! This crate supplies the concrete implementations of the credential interfaces that
//! `client_query` consumes:
//! - [`StaticTokenProvider`] and [`EnvironmentTokenProvider`] hand out bearer tokens
//! - [`ContextInfoDigestProvider`] fetches the form digest required by mutating calls
//!
//! Acquiring the token itself (interactive or device-code login) happens outside this
//! workspace; the providers only carry an existing token to the client.

mod digest_provider;
mod token_providers;

pub use digest_provider::ContextInfoDigestProvider;
pub use token_providers::{EnvironmentTokenProvider, StaticTokenProvider};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Result type for authentication operations
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while obtaining credentials
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    /// No token is available from the configured source.
    ///
    /// The payload names the source, e.g. the environment variable that was read.
    #[error("No access token found in {0}. Log in and try again")]
    MissingToken(String),

    /// The token source holds a value that cannot be used as a bearer token.
    #[error("Invalid credentials provided")]
    InvalidCredentials,

    /// Retrieving the form digest failed.
    ///
    /// Carries the underlying message verbatim.
    #[error("{0}")]
    DigestError(String),
}

impl From<AuthError> for client_query::Error {
    fn from(error: AuthError) -> Self {
        client_query::Error::AuthError(error.to_string())
    }
}
