//! Request bodies.

use serde::Serialize;
use serde_json::Value;

use super::ApiError;

/// Body of an outgoing request.
///
/// JSON `null` is a legitimate payload, so "no body" gets its own variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// Nothing is sent; `content-length: 0`.
    #[default]
    Empty,
    /// Sent as UTF-8 JSON.
    Json(Value),
}

impl RequestBody {
    /// Serializes `value` into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Json`] if `value` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Returns true for [`Self::Empty`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub(crate) fn to_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Self::Empty => None,
            Self::Json(value) => Some(value.to_string().into_bytes()),
        }
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}
