//! The GitLab API client.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use http::header::{
    CONTENT_LENGTH, CONTENT_TYPE, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde_json::Value;
use url::Url;

use super::{
    ApiError, Cache, CacheEntry, MemoryCache, PageIter, Params, RequestBody, api_root, format_url,
};
use crate::sansio::{Deciphered, RateLimit, create_headers, decipher_response};
use crate::time::{Sleeper, TokioSleeper};
use crate::transport::{HttpClient, HttpRequest};

/// Default GitLab instance.
pub const DEFAULT_URL: &str = "https://gitlab.com";

/// Default REST API version.
pub const DEFAULT_API_VERSION: &str = "v4";

/// Decoded payload and next page link of one exchange.
pub(crate) type Exchange = (Option<Value>, Option<String>);

/// Client for GitLab's REST API over any [`HttpClient`].
///
/// Owns the pieces of state that outlive a single call: the last seen
/// [`RateLimit`] and an optional conditional-request [`Cache`]. Both sit
/// behind short-lived mutexes, so one client can serve concurrent tasks;
/// concurrent updates are last-writer-wins.
///
/// # Example
///
/// ```no_run
/// use gitlab_sansio::api::{GitLabApi, MemoryCache, Params};
/// use gitlab_sansio::transport::ReqwestClient;
///
/// # async fn run() -> Result<(), gitlab_sansio::api::ApiError> {
/// let api = GitLabApi::new(ReqwestClient::new(), "my-bot")
///     .with_access_token("glpat-xxxx")
///     .with_cache(MemoryCache::new());
///
/// let project = api.get_item("/projects/{id}", &Params::new().with("id", "42")).await?;
/// let issues = api.get_iter("/projects/42/issues", &Params::new()).collect().await?;
/// # Ok(())
/// # }
/// ```
pub struct GitLabApi<H, C = MemoryCache, S = TokioSleeper> {
    http: H,
    requester: String,
    access_token: Option<String>,
    api_url: Url,
    cache: Option<Mutex<C>>,
    rate_limit: Mutex<Option<RateLimit>>,
    sleeper: S,
}

impl<H: HttpClient> GitLabApi<H> {
    /// Creates a client for `https://gitlab.com/api/v4/` without a cache.
    ///
    /// `requester` is sent as the user agent; use a username or project
    /// name.
    pub fn new(http: H, requester: impl Into<String>) -> Self {
        Self {
            http,
            requester: requester.into(),
            access_token: None,
            api_url: default_api_url(),
            cache: None,
            rate_limit: Mutex::new(None),
            sleeper: TokioSleeper,
        }
    }
}

impl<H: HttpClient, C: Cache, S: Sleeper> GitLabApi<H, C, S> {
    /// Authenticates requests with a personal or project access token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Targets another GitLab instance or API version.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if `base` is not an absolute URL.
    pub fn with_url(mut self, base: &str, api_version: &str) -> Result<Self, ApiError> {
        self.api_url = api_root(base, api_version)?;
        Ok(self)
    }

    /// Enables conditional GETs backed by `cache`.
    pub fn with_cache<C2: Cache>(self, cache: C2) -> GitLabApi<H, C2, S> {
        self.with_optional_cache(Some(cache))
    }

    /// Like [`Self::with_cache`], but `None` leaves caching off.
    pub fn with_optional_cache<C2: Cache>(self, cache: Option<C2>) -> GitLabApi<H, C2, S> {
        GitLabApi {
            http: self.http,
            requester: self.requester,
            access_token: self.access_token,
            api_url: self.api_url,
            cache: cache.map(Mutex::new),
            rate_limit: self.rate_limit,
            sleeper: self.sleeper,
        }
    }

    /// Replaces the pacing collaborator used by [`Self::sleep`].
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> GitLabApi<H, C, S2> {
        GitLabApi {
            http: self.http,
            requester: self.requester,
            access_token: self.access_token,
            api_url: self.api_url,
            cache: self.cache,
            rate_limit: self.rate_limit,
            sleeper,
        }
    }

    /// The API root every relative path is resolved against.
    #[must_use]
    pub const fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// The user agent sent with every request.
    #[must_use]
    pub fn requester(&self) -> &str {
        &self.requester
    }

    /// The most recent rate limit, decremented for requests in flight.
    #[must_use]
    pub fn rate_limit(&self) -> Option<RateLimit> {
        lock(&self.rate_limit).clone()
    }

    /// Locks the cache for inspection, if one is configured.
    pub fn cache(&self) -> Option<MutexGuard<'_, C>> {
        self.cache.as_ref().map(lock)
    }

    /// Waits for `duration` using the configured [`Sleeper`].
    ///
    /// The client never paces itself; callers check [`Self::rate_limit`]
    /// and sleep as they see fit.
    pub async fn sleep(&self, duration: Duration) {
        self.sleeper.sleep(duration).await;
    }

    /// Builds the full URL for `path` with `params`.
    ///
    /// See [`super::format_url`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if the result is not a valid URL.
    pub fn format_url(&self, path: &str, params: &Params) -> Result<Url, ApiError> {
        Ok(format_url(&self.api_url, path, params)?)
    }

    /// Fetches a single item.
    ///
    /// For endpoints returning paginated lists, see [`Self::get_iter`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request cannot be built or sent, or
    /// GitLab answers with an error.
    pub async fn get_item(&self, path: &str, params: &Params) -> Result<Option<Value>, ApiError> {
        let (data, _) = self
            .make_request(Method::GET, path, params, &RequestBody::Empty)
            .await?;
        Ok(data)
    }

    /// Iterates over every item of a paginated endpoint.
    ///
    /// Pages are fetched lazily, following `rel="next"` links with the
    /// same `params`.
    pub fn get_iter(&self, path: &str, params: &Params) -> PageIter<'_, H, C, S> {
        PageIter::new(self, path.to_string(), params.clone())
    }

    /// Sends a `POST` request.
    ///
    /// # Errors
    ///
    /// See [`Self::get_item`].
    pub async fn post(
        &self,
        path: &str,
        params: &Params,
        data: &RequestBody,
    ) -> Result<Option<Value>, ApiError> {
        let (data, _) = self.make_request(Method::POST, path, params, data).await?;
        Ok(data)
    }

    /// Sends a `PATCH` request.
    ///
    /// # Errors
    ///
    /// See [`Self::get_item`].
    pub async fn patch(
        &self,
        path: &str,
        params: &Params,
        data: &RequestBody,
    ) -> Result<Option<Value>, ApiError> {
        let (data, _) = self.make_request(Method::PATCH, path, params, data).await?;
        Ok(data)
    }

    /// Sends a `PUT` request. Pass [`RequestBody::Empty`] for no body.
    ///
    /// # Errors
    ///
    /// See [`Self::get_item`].
    pub async fn put(
        &self,
        path: &str,
        params: &Params,
        data: &RequestBody,
    ) -> Result<Option<Value>, ApiError> {
        let (data, _) = self.make_request(Method::PUT, path, params, data).await?;
        Ok(data)
    }

    /// Sends a `DELETE` request. Pass [`RequestBody::Empty`] for no body.
    ///
    /// # Errors
    ///
    /// See [`Self::get_item`].
    pub async fn delete(
        &self,
        path: &str,
        params: &Params,
        data: &RequestBody,
    ) -> Result<(), ApiError> {
        self.make_request(Method::DELETE, path, params, data).await?;
        Ok(())
    }

    /// Performs one exchange and returns the payload and next page link.
    pub(crate) async fn make_request(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        body: &RequestBody,
    ) -> Result<Exchange, ApiError> {
        let url = self.format_url(path, params)?;
        let mut headers = create_headers(&self.requester, self.access_token.as_deref())?;

        let payload = body.to_bytes();
        let cacheable = method == Method::GET && payload.is_none() && self.cache.is_some();
        let cached = if cacheable {
            self.cache().and_then(|mut cache| cache.get(url.as_str()))
        } else {
            None
        };
        if let Some(entry) = &cached {
            add_validators(&mut headers, entry)?;
        }

        let mut request = HttpRequest::new(method, url.clone());
        match payload {
            None => {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(0u32));
            }
            Some(bytes) => {
                headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/json; charset=utf-8"),
                );
                headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
                request = request.with_body(bytes);
            }
        }
        request = request.with_headers(headers);

        if let Some(rate_limit) = lock(&self.rate_limit).as_mut() {
            rate_limit.consume();
        }

        tracing::debug!(
            method = %request.method,
            url = %url,
            conditional = cached.is_some(),
            "Sending request"
        );
        let response = self.http.request(request).await?;

        if response.status == StatusCode::NOT_MODIFIED {
            if let Some(entry) = cached {
                tracing::debug!(url = %url, "Not modified, using cached response");
                return Ok((entry.payload, entry.next_page));
            }
        }

        let deciphered = decipher_response(response.status, &response.headers, &response.body)?;
        *lock(&self.rate_limit) = deciphered.rate_limit.clone();

        if cacheable {
            if let Some(entry) = cache_entry(&response.headers, &deciphered) {
                if let Some(mut cache) = self.cache() {
                    tracing::debug!(url = %url, "Caching response");
                    cache.insert(url.to_string(), entry);
                }
            }
        }

        Ok((deciphered.data, deciphered.next_page))
    }
}

impl<H, C, S> std::fmt::Debug for GitLabApi<H, C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabApi")
            .field("requester", &self.requester)
            .field("api_url", &self.api_url.as_str())
            .field("authenticated", &self.access_token.is_some())
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

fn default_api_url() -> Url {
    api_root(DEFAULT_URL, DEFAULT_API_VERSION).expect("default API URL is valid")
}

fn add_validators(headers: &mut HeaderMap, entry: &CacheEntry) -> Result<(), ApiError> {
    if let Some(etag) = &entry.etag {
        headers.insert(IF_NONE_MATCH, HeaderValue::from_str(etag)?);
    }
    if let Some(last_modified) = &entry.last_modified {
        headers.insert(IF_MODIFIED_SINCE, HeaderValue::from_str(last_modified)?);
    }
    Ok(())
}

/// Builds a cache entry if the response carries any validator.
fn cache_entry(headers: &HeaderMap, deciphered: &Deciphered) -> Option<CacheEntry> {
    let etag = header_string(headers, &ETAG);
    let last_modified = header_string(headers, &LAST_MODIFIED);
    if etag.is_none() && last_modified.is_none() {
        return None;
    }
    Some(CacheEntry {
        etag,
        last_modified,
        payload: deciphered.data.clone(),
        next_page: deciphered.next_page.clone(),
    })
}

fn header_string(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
