//! Error type for API client calls.

use thiserror::Error;

use crate::sansio::GitLabError;
use crate::transport::HttpError;

/// Everything that can fail during a [`super::GitLabApi`] call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// GitLab answered with an error status or an undecodable body.
    #[error(transparent)]
    GitLab(#[from] GitLabError),

    /// No response was obtained.
    #[error("Transport error: {0}")]
    Transport(#[from] HttpError),

    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A header value contained forbidden bytes.
    #[error("Invalid header value: {0}")]
    Header(#[from] http::header::InvalidHeaderValue),

    /// A request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// The [`GitLabError`] inside, if GitLab itself rejected the request.
    #[must_use]
    pub const fn gitlab(&self) -> Option<&GitLabError> {
        match self {
            Self::GitLab(e) => Some(e),
            _ => None,
        }
    }
}
