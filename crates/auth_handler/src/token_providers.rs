//! Bearer token sources.

use async_trait::async_trait;
use client_query::{Error, TokenProvider};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use crate::AuthError;

#[cfg(test)]
#[path = "token_providers_tests.rs"]
mod tests;

/// Hands out one token fixed at construction time, whatever the resource.
///
/// # Examples
///
/// ```rust
/// use auth_handler::StaticTokenProvider;
///
/// let provider = StaticTokenProvider::new("eyJ0eXAiOi...".to_string());
/// assert_eq!(format!("{:?}", provider), "StaticTokenProvider { token: \"<REDACTED>\" }");
/// ```
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    pub fn new(token: String) -> Self {
        Self {
            token: SecretString::from(token),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self, _resource: &str) -> Result<SecretString, Error> {
        if self.token.expose_secret().trim().is_empty() {
            return Err(AuthError::InvalidCredentials.into());
        }
        Ok(SecretString::from(self.token.expose_secret().to_string()))
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &"<REDACTED>")
            .finish()
    }
}

/// Reads the token from an environment variable on every call.
///
/// Reading at call time lets a long running process pick up a refreshed token.
#[derive(Debug, Clone)]
pub struct EnvironmentTokenProvider {
    variable: String,
}

impl EnvironmentTokenProvider {
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }
}

#[async_trait]
impl TokenProvider for EnvironmentTokenProvider {
    #[instrument(skip(self), fields(variable = %self.variable))]
    async fn access_token(&self, resource: &str) -> Result<SecretString, Error> {
        let token = std::env::var(&self.variable)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AuthError::MissingToken(self.variable.clone()))?;

        debug!("Read access token from environment");
        Ok(SecretString::from(token))
    }
}
