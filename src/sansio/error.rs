//! Error taxonomy for GitLab API responses and webhook validation.

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

use super::{DecodeError, RateLimit};

/// Everything that can go wrong while interpreting GitLab traffic.
///
/// The HTTP variants mirror the status-code families a caller typically
/// reacts to differently: redirects, client errors (with rate limiting and
/// field validation split out), and server failures. Each carries the status
/// and a human-readable message, defaulting to the status reason phrase.
#[derive(Debug, Error)]
pub enum GitLabError {
    /// A webhook request failed secret-token validation.
    #[error("Webhook validation failed: {0}")]
    ValidationFailure(String),

    /// An event accessor was used on a payload lacking that attribute.
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    /// A successful response carried a body that could not be decoded.
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] DecodeError),

    /// A status outside every other category (e.g. 205).
    #[error("{message}")]
    Http {
        /// Response status
        status: StatusCode,
        /// Server message or reason phrase
        message: String,
    },

    /// 3XX response.
    #[error("{message}")]
    Redirection {
        /// Response status
        status: StatusCode,
        /// Server message or reason phrase
        message: String,
    },

    /// 4XX response not covered by a more specific variant.
    #[error("{message}")]
    BadRequest {
        /// Response status
        status: StatusCode,
        /// Server message or reason phrase
        message: String,
    },

    /// 403 response while the rate limit is exhausted.
    #[error("{message}")]
    RateLimitExceeded {
        /// Rate limit reported alongside the rejection
        rate_limit: RateLimit,
        /// Server message, or "rate limit exceeded"
        message: String,
    },

    /// 422 response; `errors` holds the structured field errors, if any.
    #[error("{message}")]
    InvalidField {
        /// Entries of the response's `errors` array
        errors: Vec<Value>,
        /// Server message, annotated with the offending field names
        message: String,
    },

    /// 5XX response.
    #[error("{message}")]
    GitLabBroken {
        /// Response status
        status: StatusCode,
        /// Server message or reason phrase
        message: String,
    },
}

impl GitLabError {
    /// Returns the HTTP status this error represents, if it came from one.
    #[must_use]
    pub const fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. }
            | Self::Redirection { status, .. }
            | Self::BadRequest { status, .. }
            | Self::GitLabBroken { status, .. } => Some(*status),
            Self::RateLimitExceeded { .. } => Some(StatusCode::FORBIDDEN),
            Self::InvalidField { .. } => Some(StatusCode::UNPROCESSABLE_ENTITY),
            Self::ValidationFailure(_) | Self::AttributeNotFound(_) | Self::Decode(_) => None,
        }
    }

    /// Returns true for the whole 4XX family, including rate limiting and
    /// field validation.
    #[must_use]
    pub const fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Self::BadRequest { .. } | Self::RateLimitExceeded { .. } | Self::InvalidField { .. }
        )
    }

    /// Returns the rate limit snapshot carried by [`Self::RateLimitExceeded`].
    #[must_use]
    pub const fn rate_limit(&self) -> Option<&RateLimit> {
        match self {
            Self::RateLimitExceeded { rate_limit, .. } => Some(rate_limit),
            _ => None,
        }
    }

    pub(crate) fn bad_request(status: StatusCode, message: impl Into<String>) -> Self {
        Self::BadRequest {
            status,
            message: message.into(),
        }
    }
}

/// Canonical reason phrase for `status`, or its numeric form if unknown.
pub(crate) fn reason_phrase(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_string(), ToString::to_string)
}
