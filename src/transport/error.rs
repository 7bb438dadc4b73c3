//! Error types for HTTP exchanges.

use thiserror::Error;

/// Error type for a failed HTTP exchange.
///
/// Only failures where no response was received end up here. A response
/// with an error status is a successful exchange and is classified later
/// by [`crate::sansio::decipher_response`].
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
