//! [`HttpClient`] over reqwest, the transport the binary ships with.

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Sends GitLab API requests with a shared `reqwest::Client`.
///
/// Headers and body go out exactly as the API client built them; reqwest
/// only adds transport-level headers such as `host`.
///
/// ```no_run
/// use gitlab_sansio::api::{GitLabApi, Params};
/// use gitlab_sansio::transport::ReqwestClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = GitLabApi::new(ReqwestClient::new(), "my-project");
/// let version = api.get_item("/version", &Params::new()).await?;
/// println!("{version:?}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Uses reqwest's defaults: pooled connections, rustls, no timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    /// Creates a client whose exchanges give up after `timeout`.
    ///
    /// This is the caller-level cancellation the API client relies on:
    /// a timed-out exchange surfaces as [`HttpError::Timeout`] and leaves
    /// any response cache untouched.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Connection`] if the TLS backend cannot be initialized.
    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, HttpError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Connection(Box::new(e)))?;
        Ok(Self { inner })
    }

    /// Wraps a preconfigured client, e.g. one with a proxy or custom roots.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { inner: client }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self.inner.request(req.method, req.url.as_str());

        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout
            } else if e.is_builder() {
                HttpError::InvalidUrl(e.to_string())
            } else {
                HttpError::Connection(Box::new(e))
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::Connection(Box::new(e)))?
            .to_vec();

        Ok(HttpResponse::new(status, headers, body))
    }
}
