//! Command modules for the spo-batch CLI.
//!
//! - `field_set_cmd`: update the properties of a site or list column
//! - `externaluser_list_cmd`: page through the external users of the tenant or of one site
//! - `list_webhook_get_cmd`: read one webhook subscription of a list

use std::sync::Arc;

use auth_handler::{ContextInfoDigestProvider, EnvironmentTokenProvider};
use client_query::{ClientQueryClient, ReqwestTransport};
use serde::Serialize;

use crate::config::AppConfig;
use crate::errors::Error;

pub mod externaluser_list_cmd;
pub mod field_set_cmd;
pub mod list_webhook_get_cmd;

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;

/// Parses a `Name=Value` pair. Only the first `=` separates the two.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Wires the HTTP transport and the credential providers described by `config`.
pub fn build_client(config: &AppConfig) -> ClientQueryClient {
    let transport = Arc::new(ReqwestTransport::new());
    let tokens = Arc::new(EnvironmentTokenProvider::new(
        config.authentication.token_env_var.clone(),
    ));
    let digests = Arc::new(ContextInfoDigestProvider::new(
        transport.clone(),
        tokens.clone(),
    ));
    ClientQueryClient::new(transport, tokens, digests)
}

/// Renders `value` as pretty printed JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, Error> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Output(e.to_string()))
}
