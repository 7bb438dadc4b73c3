//! Inbound webhook events.

use std::sync::LazyLock;

use http::{HeaderMap, StatusCode};
use serde_json::{Map, Value};
use subtle::ConstantTimeEq;

use super::{GitLabError, decode_body};

/// Header carrying the event type, e.g. `Issue Hook`.
pub const EVENT_HEADER: &str = "x-gitlab-event";

/// Header carrying the shared secret token.
pub const TOKEN_HEADER: &str = "x-gitlab-token";

static EMPTY_OBJECT: LazyLock<Map<String, Value>> = LazyLock::new(Map::new);

/// Details of a GitLab webhook event.
///
/// The event type is kept as the string GitLab sends rather than an enum,
/// so new hook kinds work without a release of this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    data: Value,
    event_type: String,
    secret: Option<String>,
}

impl Event {
    /// Creates an event from an already decoded payload.
    #[must_use]
    pub fn new(data: Value, event_type: impl Into<String>, secret: Option<String>) -> Self {
        Self {
            data,
            event_type: event_type.into(),
            secret,
        }
    }

    /// The decoded payload.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }

    /// The event type from the `x-gitlab-event` header.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The secret the event was validated against, if any.
    #[must_use]
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    /// The payload's `object_attributes` object, or an empty one.
    #[must_use]
    pub fn object_attributes(&self) -> &Map<String, Value> {
        self.data
            .get("object_attributes")
            .and_then(Value::as_object)
            .unwrap_or(&EMPTY_OBJECT)
    }

    /// The payload's `project.id`.
    ///
    /// # Errors
    ///
    /// Returns [`GitLabError::AttributeNotFound`] if the payload has no
    /// `project` object or it has no `id`.
    pub fn project_id(&self) -> Result<&Value, GitLabError> {
        let project = self
            .data
            .get("project")
            .ok_or_else(|| GitLabError::AttributeNotFound("project".to_string()))?;
        project
            .get("id")
            .ok_or_else(|| GitLabError::AttributeNotFound("id".to_string()))
    }

    /// Builds an event from an inbound webhook request.
    ///
    /// Validation is unconditional whenever either side expects it: a
    /// `x-gitlab-token` header requires a matching `secret`, and a
    /// configured `secret` requires the header.
    ///
    /// # Errors
    ///
    /// - [`GitLabError::ValidationFailure`] on any secret mismatch
    /// - [`GitLabError::BadRequest`] (415) unless the body is JSON or
    ///   form-encoded JSON
    /// - [`GitLabError::BadRequest`] (400) without an `x-gitlab-event` header
    pub fn from_request(
        headers: &HeaderMap,
        body: &[u8],
        secret: Option<&str>,
    ) -> Result<Self, GitLabError> {
        validate_token(headers, secret)?;

        let content_type = headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(unsupported_media_type)?;
        let data = decode_body(Some(content_type), body, true).map_err(|e| {
            tracing::debug!("Rejecting webhook body: {e}");
            unsupported_media_type()
        })?;

        let event_type = headers
            .get(EVENT_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                GitLabError::bad_request(
                    StatusCode::BAD_REQUEST,
                    format!("{EVENT_HEADER} header is missing"),
                )
            })?;

        Ok(Self::new(
            data.unwrap_or(Value::Null),
            event_type,
            secret.map(ToString::to_string),
        ))
    }
}

fn validate_token(headers: &HeaderMap, secret: Option<&str>) -> Result<(), GitLabError> {
    match (headers.get(TOKEN_HEADER), secret) {
        (Some(_), None) => Err(GitLabError::ValidationFailure(
            "secret not provided".to_string(),
        )),
        (Some(token), Some(secret)) => {
            if constant_time_eq(token.as_bytes(), secret.as_bytes()) {
                Ok(())
            } else {
                Err(GitLabError::ValidationFailure("invalid secret".to_string()))
            }
        }
        (None, Some(_)) => Err(GitLabError::ValidationFailure(format!(
            "{TOKEN_HEADER} is missing"
        ))),
        (None, None) => Ok(()),
    }
}

fn unsupported_media_type() -> GitLabError {
    GitLabError::bad_request(
        StatusCode::UNSUPPORTED_MEDIA_TYPE,
        "expected a content-type of 'application/json' or 'application/x-www-form-urlencoded'",
    )
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    bool::from(a.ct_eq(b))
}

#[cfg(test)]
mod tests {
    use super::constant_time_eq;

    #[test]
    fn constant_time_eq_matches_equality() {
        assert!(constant_time_eq(b"123456", b"123456"));
        assert!(!constant_time_eq(b"123456", b"123457"));
        assert!(!constant_time_eq(b"123456", b"1234567"));
        assert!(constant_time_eq(b"", b""));
    }
}
