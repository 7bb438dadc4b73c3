//! Response classification, pagination links and request headers.

use std::sync::LazyLock;

use http::header::{ACCEPT, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use regex::Regex;
use serde_json::Value;

use super::error::reason_phrase;
use super::{GitLabError, RateLimit, decode_body};

/// Status codes treated as success.
pub const SUCCESS_STATUSES: [StatusCode; 4] = [
    StatusCode::OK,
    StatusCode::CREATED,
    StatusCode::ACCEPTED,
    StatusCode::NO_CONTENT,
];

const PRIVATE_TOKEN: HeaderName = HeaderName::from_static("private-token");

/// One `<uri>; param="value"` entry of an RFC 5988 `Link` header.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(?P<uri>[^>]+)>;\s*(?P<param_type>\w+)="(?P<param_value>\w+)"(,\s*)?"#)
        .expect("link pattern is valid")
});

/// The useful parts of a successful API response.
#[derive(Debug, Clone, PartialEq)]
pub struct Deciphered {
    /// Decoded body; `None` for an empty body or missing content type
    pub data: Option<Value>,
    /// Rate limit reported by the response, if any
    pub rate_limit: Option<RateLimit>,
    /// URL of the next page of results, if any
    pub next_page: Option<String>,
}

/// Extracts the `rel="next"` URI from a `Link` header.
///
/// Other relations (`prev`, `first`, `last`, ...) are ignored.
///
/// ```
/// use gitlab_sansio::sansio::next_link;
///
/// let link = r#"<https://gitlab.com/api/v4/projects?page=1>; rel="prev", <https://gitlab.com/api/v4/projects?page=3>; rel="next""#;
/// assert_eq!(
///     next_link(Some(link)).as_deref(),
///     Some("https://gitlab.com/api/v4/projects?page=3")
/// );
/// ```
#[must_use]
pub fn next_link(link: Option<&str>) -> Option<String> {
    LINK_RE
        .captures_iter(link?)
        .find(|caps| &caps["param_type"] == "rel" && &caps["param_value"] == "next")
        .map(|caps| caps["uri"].to_string())
}

/// Interprets a GitLab API response.
///
/// 200, 201, 202 and 204 are successes and yield the decoded body, the
/// rate limit and the next page link. Every other status becomes the
/// matching [`GitLabError`] variant, using the JSON body's `message` when
/// there is one.
///
/// # Errors
///
/// - [`GitLabError::GitLabBroken`] for 5XX
/// - [`GitLabError::RateLimitExceeded`] for 403 with no requests remaining
/// - [`GitLabError::InvalidField`] for 422
/// - [`GitLabError::BadRequest`] for any other 4XX
/// - [`GitLabError::Redirection`] for 3XX
/// - [`GitLabError::Http`] for anything else
/// - [`GitLabError::Decode`] if a success body cannot be decoded
pub fn decipher_response(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Deciphered, GitLabError> {
    let content_type = headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    if SUCCESS_STATUSES.contains(&status) {
        let link = headers.get(http::header::LINK).and_then(|v| v.to_str().ok());
        return Ok(Deciphered {
            data: decode_body(content_type, body, false)?,
            rate_limit: RateLimit::from_headers(headers),
            next_page: next_link(link),
        });
    }

    // An undecodable error body must not hide the status.
    let data = decode_body(content_type, body, false).ok().flatten();
    Err(classify_error(status, headers, data.as_ref()))
}

fn classify_error(status: StatusCode, headers: &HeaderMap, data: Option<&Value>) -> GitLabError {
    let message = data.and_then(|d| d.get("message")).and_then(message_text);

    if status.is_server_error() {
        return GitLabError::GitLabBroken {
            status,
            message: message.unwrap_or_else(|| reason_phrase(status)),
        };
    }

    if status.is_client_error() {
        if status == StatusCode::FORBIDDEN {
            if let Some(rate_limit) = RateLimit::from_headers(headers).filter(|r| r.remaining == 0)
            {
                return GitLabError::RateLimitExceeded {
                    rate_limit,
                    message: message.unwrap_or_else(|| "rate limit exceeded".to_string()),
                };
            }
        } else if status == StatusCode::UNPROCESSABLE_ENTITY {
            return invalid_field(data, message);
        }
        return GitLabError::BadRequest {
            status,
            message: message.unwrap_or_else(|| reason_phrase(status)),
        };
    }

    let message = message.unwrap_or_else(|| reason_phrase(status));
    if status.is_redirection() {
        GitLabError::Redirection { status, message }
    } else {
        GitLabError::Http { status, message }
    }
}

fn invalid_field(data: Option<&Value>, message: Option<String>) -> GitLabError {
    let errors: Vec<Value> = data
        .and_then(|d| d.get("errors"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let base = message.unwrap_or_else(|| reason_phrase(StatusCode::UNPROCESSABLE_ENTITY));

    let message = if errors.is_empty() {
        base
    } else {
        let fields = errors
            .iter()
            .map(|e| match e.get("field") {
                Some(Value::String(field)) => format!("'{field}'"),
                Some(other) => other.to_string(),
                None => "None".to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{base} for {fields}")
    };

    GitLabError::InvalidField { errors, message }
}

/// GitLab sometimes sends `message` as an object of per-field complaints.
fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Builds the GitLab-specific request headers.
///
/// The user agent identifies the requester (a username or project name).
/// With an access token the request is authenticated via `private-token`,
/// which also raises the rate limit.
///
/// # Errors
///
/// Returns an error if `requester` or `access_token` contain bytes that
/// are not allowed in a header value.
pub fn create_headers(
    requester: &str,
    access_token: Option<&str>,
) -> Result<HeaderMap, http::header::InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_str(requester)?);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some(token) = access_token {
        let mut value = HeaderValue::from_str(token)?;
        value.set_sensitive(true);
        headers.insert(PRIVATE_TOKEN, value);
    }
    Ok(headers)
}
