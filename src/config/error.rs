//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid GitLab instance URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The invalid URL string
        url: String,
        /// Reason for invalidity
        reason: String,
    },

    /// API version not of the form `v<number>`.
    #[error("Invalid API version '{0}': expected e.g. 'v4'")]
    InvalidApiVersion(String),

    /// Requester or token unusable as a header value.
    #[error("Invalid value for {field}: {reason}")]
    InvalidHeaderValue {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Unparseable receiver address.
    #[error("Invalid bind address '{value}': {reason}")]
    InvalidBind {
        /// The invalid address
        value: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Query parameter not in `key=value` form.
    #[error("Invalid parameter '{0}': expected 'key=value'")]
    InvalidParam(String),

    /// Blank event type in the receiver's event list.
    #[error("Event types must not be empty")]
    EmptyEventType,
}
