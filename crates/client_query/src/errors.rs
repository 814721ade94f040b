//! Error types for client query operations.
//!
//! This module defines the error types that can occur when building, sending and decoding
//! a process query batch. Messages reported by the server or by the HTTP layer are carried
//! verbatim so that the calling command can show them to the user unchanged.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during client query operations.
///
/// A batch either fully decodes or the whole operation fails with one of these variants.
/// The codec never retries and never attempts partial recovery.
///
/// ## Examples
///
/// ```rust,ignore
/// use client_query::Error;
///
/// match client.run_batch(&context, &request).await {
///     Ok(results) => println!("{} results", results.len()),
///     Err(Error::ProtocolError(msg)) => eprintln!("{}", msg),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Acquiring a bearer token or a form digest failed.
    ///
    /// The contained string is the message supplied by the provider.
    #[error("{0}")]
    AuthError(String),

    /// The request referenced an object path that was never declared, or declared an id twice.
    ///
    /// This is a programming error in the code that assembled the request. It is reported
    /// before anything is sent.
    #[error("Invalid object path reference: {0}")]
    InvalidReference(String),

    /// The response did not have the expected shape.
    ///
    /// This occurs when:
    /// - The body is not a JSON array
    /// - The leading diagnostic record is missing or unreadable
    /// - Fewer result markers were returned than the request expects
    /// - A result could not be converted to the requested type
    #[error("Malformed client query response: {0}")]
    MalformedResponse(String),

    /// The server reported an error in the diagnostic record.
    ///
    /// The contained string is the server's `ErrorMessage`, untouched.
    #[error("{0}")]
    ProtocolError(String),

    /// The HTTP layer failed.
    ///
    /// The contained string is the transport's message, untouched.
    #[error("{0}")]
    TransportError(String),
}
