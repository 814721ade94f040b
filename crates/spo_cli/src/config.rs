//! Configuration management for the spo-batch CLI.
//!
//! The configuration is stored in TOML format and can be loaded from a specified file path or
//! from the default location in the current directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

use crate::errors::Error;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "config.toml";

/// Application name reported to the service when none is configured
pub const DEFAULT_APPLICATION_NAME: &str = "spo-batch";

/// Environment variable holding the bearer token when none is configured
pub const DEFAULT_TOKEN_ENV_VAR: &str = "SPO_ACCESS_TOKEN";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Main configuration structure for the spo-batch CLI application.
///
/// # Example TOML Configuration
///
/// ```toml
/// [connection]
/// admin_url = "https://contoso-admin.sharepoint.com"
/// application_name = "spo-batch"
///
/// [authentication]
/// token_env_var = "SPO_ACCESS_TOKEN"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub authentication: AuthenticationConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file at the specified path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file does not exist, cannot be read, or does not
    /// contain a valid configuration.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use std::path::Path;
    /// use spo_cli::config::AppConfig;
    ///
    /// let config = AppConfig::load(Path::new("./config.toml")).unwrap();
    /// println!("{}", config.connection.application_name);
    /// ```
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {:?}",
                path
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read configuration file: {}", e)))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse configuration file: {}", e)))?;

        Ok(config)
    }

    /// Loads the configuration the user pointed at, or the default file if there is one.
    ///
    /// An explicitly given path must exist. Without one, a missing `config.toml` in the
    /// current directory yields the built-in defaults.
    pub fn load_or_default(config_path: Option<&str>) -> Result<Self, Error> {
        let path = get_config_path(config_path);
        if config_path.is_none() && !path.exists() {
            debug!("No configuration file found, using defaults");
            return Ok(Self::default());
        }
        Self::load(&path)
    }
}

/// Where the CLI connects to.
#[derive(Debug, Deserialize)]
pub struct ConnectionConfig {
    /// URL of the tenant admin site, required by tenant-wide commands.
    #[serde(default)]
    pub admin_url: Option<String>,

    /// Name reported to the service in every batch.
    #[serde(default = "ConnectionConfig::default_application_name")]
    pub application_name: String,
}

impl ConnectionConfig {
    fn default_application_name() -> String {
        DEFAULT_APPLICATION_NAME.to_string()
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            admin_url: None,
            application_name: ConnectionConfig::default_application_name(),
        }
    }
}

/// Configuration for CLI authentication settings.
///
/// The token is never stored in the file; only the name of the environment variable that
/// carries it.
#[derive(Debug, Deserialize)]
pub struct AuthenticationConfig {
    #[serde(default = "AuthenticationConfig::default_token_env_var")]
    pub token_env_var: String,
}

impl AuthenticationConfig {
    fn default_token_env_var() -> String {
        DEFAULT_TOKEN_ENV_VAR.to_string()
    }
}

impl Default for AuthenticationConfig {
    fn default() -> Self {
        Self {
            token_env_var: AuthenticationConfig::default_token_env_var(),
        }
    }
}

/// Resolves the path to the configuration file.
///
/// - If `config_path` is `Some(path)`, returns that path
/// - Otherwise returns `./config.toml` in the current directory
pub fn get_config_path(config_path: Option<&str>) -> PathBuf {
    if let Some(path) = config_path {
        PathBuf::from(path)
    } else {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        current_dir.join(DEFAULT_CONFIG_FILENAME)
    }
}
