//! The exchange types the API client hands to a transport.

use std::sync::Arc;

use super::HttpError;

/// One outgoing API call: method, fully expanded URL, headers, body.
///
/// Built by [`crate::api::GitLabApi`] after URL formatting and cache
/// validation; header names are always lowercase.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method
    pub method: http::Method,
    /// Absolute URL, query included
    pub url: url::Url,
    /// `user-agent`, `accept`, `private-token`, validators, ...
    pub headers: http::HeaderMap,
    /// Encoded JSON payload; `None` for [`crate::api::RequestBody::Empty`]
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// A request without headers or body.
    #[must_use]
    pub fn new(method: http::Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: http::HeaderMap::new(),
            body: None,
        }
    }

    /// Shorthand for a bare `GET`.
    #[must_use]
    pub fn get(url: url::Url) -> Self {
        Self::new(http::Method::GET, url)
    }

    /// Attaches an encoded payload.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Replaces the header map.
    #[must_use]
    pub fn with_headers(mut self, headers: http::HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Header value as text, if present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// What came back from GitLab, body fully read.
///
/// Interpreting it is left to [`crate::sansio::decipher_response`].
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code
    pub status: http::StatusCode,
    /// Headers; lookups are case-insensitive
    pub headers: http::HeaderMap,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Assembles a response from its parts.
    #[must_use]
    pub const fn new(status: http::StatusCode, headers: http::HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Header value as text, if present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Trait for performing one HTTP exchange.
///
/// This is the entire surface the API client needs from a network stack:
/// send a request, hand back status, headers and body. Connection pooling,
/// TLS and socket-level retries are the implementation's business.
///
/// # Example
///
/// ```ignore
/// use gitlab_sansio::transport::{HttpClient, HttpRequest, HttpResponse, HttpError};
///
/// struct MockClient {
///     response: HttpResponse,
/// }
///
/// impl HttpClient for MockClient {
///     async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
///         Ok(self.response.clone())
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Sends an HTTP request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when no response could be obtained:
    /// - Network connection fails ([`HttpError::Connection`])
    /// - Request times out ([`HttpError::Timeout`])
    /// - URL is invalid ([`HttpError::InvalidUrl`])
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, HttpError>> + Send;
}

impl<T: HttpClient> HttpClient for Arc<T> {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        (**self).request(req).await
    }
}
