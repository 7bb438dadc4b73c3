//! Content-type aware body decoding.

use serde_json::Value;
use thiserror::Error;

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Error type for body decoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Strict decoding met a content type that is neither JSON nor form data.
    #[error("Unrecognized content type: {0:?}")]
    UnrecognizedContentType(String),

    /// The declared charset is not UTF-8 compatible.
    #[error("Unsupported charset: {0:?}")]
    UnsupportedCharset(String),

    /// The body is not valid UTF-8.
    #[error("Body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The body (or the form `payload` field) is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Form-encoded body without a `payload` field.
    #[error("Form-encoded body has no 'payload' field")]
    MissingPayload,
}

/// Splits a `content-type` header into media type and charset.
///
/// The media type is lowercased with parameters stripped; the charset
/// defaults to `utf-8`.
///
/// ```
/// use gitlab_sansio::sansio::parse_content_type;
///
/// let (kind, charset) = parse_content_type(Some("Application/JSON; charset=UTF-8"));
/// assert_eq!(kind.as_deref(), Some("application/json"));
/// assert_eq!(charset, "utf-8");
/// ```
#[must_use]
pub fn parse_content_type(content_type: Option<&str>) -> (Option<String>, String) {
    let Some(content_type) = content_type.filter(|c| !c.trim().is_empty()) else {
        return (None, "utf-8".to_string());
    };

    let mut parts = content_type.split(';');
    let media_type = parts
        .next()
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty());

    let charset = parts
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .map_or_else(
            || "utf-8".to_string(),
            |(_, value)| value.trim().trim_matches('"').to_ascii_lowercase(),
        );

    (media_type, charset)
}

/// Decodes an HTTP body according to its content type.
///
/// - empty body or no content type: `Ok(None)`
/// - `application/json`: the parsed JSON
/// - `application/x-www-form-urlencoded`: the JSON in the `payload` field
/// - anything else: the body as a JSON string, or
///   [`DecodeError::UnrecognizedContentType`] when `strict`
///
/// # Errors
///
/// Returns [`DecodeError`] if the charset is not UTF-8 compatible, the body
/// is malformed for its type, or the type is unknown in strict mode.
pub fn decode_body(
    content_type: Option<&str>,
    body: &[u8],
    strict: bool,
) -> Result<Option<Value>, DecodeError> {
    let (media_type, charset) = parse_content_type(content_type);
    let Some(media_type) = media_type else {
        return Ok(None);
    };
    if body.is_empty() {
        return Ok(None);
    }

    if !matches!(charset.as_str(), "utf-8" | "utf8" | "us-ascii" | "ascii") {
        return Err(DecodeError::UnsupportedCharset(charset));
    }
    let text = std::str::from_utf8(body)?;

    match media_type.as_str() {
        JSON => Ok(Some(serde_json::from_str(text)?)),
        FORM => {
            let payload = url::form_urlencoded::parse(text.as_bytes())
                .find(|(key, _)| key == "payload")
                .map(|(_, value)| value.into_owned())
                .ok_or(DecodeError::MissingPayload)?;
            Ok(Some(serde_json::from_str(&payload)?))
        }
        _ if strict => Err(DecodeError::UnrecognizedContentType(media_type)),
        _ => Ok(Some(Value::String(text.to_string()))),
    }
}
