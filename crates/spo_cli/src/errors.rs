use client_query::Error as ClientError;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the spo-batch CLI application.
///
/// Messages coming from the service are shown to the user exactly as the service phrased them.
#[derive(Error, Debug)]
pub enum Error {
    /// A batch or REST call failed.
    ///
    /// Wraps the client error without adding any prefix, so a server message such as
    /// `File Not Found.` reaches the user verbatim.
    #[error("{0}")]
    Client(#[from] ClientError),

    /// Configuration error occurred while loading or parsing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line arguments were provided.
    ///
    /// The message is the validation failure itself, e.g. `invalid is not a valid GUID`.
    #[error("{0}")]
    InvalidArguments(String),

    /// The command needs a tenant admin site but the configured site is not one.
    #[error("{0} is not a tenant admin site. Log in to your tenant admin site and try again")]
    NotTenantAdminSite(String),

    /// Failed to render command output.
    #[error("Failed to write output: {0}")]
    Output(String),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArguments(_) => 2,
            Error::Config(_) => 3,
            Error::Client(_) | Error::NotTenantAdminSite(_) | Error::Output(_) => 1,
        }
    }
}
