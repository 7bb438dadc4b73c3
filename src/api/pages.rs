//! Lazy iteration over paginated endpoints.

use std::collections::VecDeque;

use http::Method;
use serde_json::Value;

use super::endpoint::query_params;
use super::{ApiError, Cache, GitLabApi, Params, RequestBody};
use crate::time::Sleeper;
use crate::transport::HttpClient;

/// Item-by-item iterator over a paginated endpoint.
///
/// Each page is fetched on demand. Array payloads yield their elements;
/// any other payload yields itself once, and an empty body yields
/// nothing. Iteration ends after the last page without a `rel="next"`
/// link.
///
/// Next-page URLs are already expanded, so follow-up requests only carry
/// the params the path's template did not consume.
pub struct PageIter<'a, H, C, S> {
    api: &'a GitLabApi<H, C, S>,
    params: Params,
    follow_params: Option<Params>,
    next_url: Option<String>,
    buffer: VecDeque<Value>,
}

impl<'a, H: HttpClient, C: Cache, S: Sleeper> PageIter<'a, H, C, S> {
    pub(crate) fn new(api: &'a GitLabApi<H, C, S>, path: String, params: Params) -> Self {
        let follow_params = Some(query_params(&path, &params));
        Self {
            api,
            params,
            follow_params,
            next_url: Some(path),
            buffer: VecDeque::new(),
        }
    }

    /// Fetches the next item, requesting new pages as needed.
    ///
    /// Returns `Ok(None)` once every page is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] of the failing page request. The iterator
    /// is exhausted afterwards.
    pub async fn next(&mut self) -> Result<Option<Value>, ApiError> {
        while self.buffer.is_empty() {
            let Some(url) = self.next_url.take() else {
                return Ok(None);
            };
            let (data, next_page) = self
                .api
                .make_request(Method::GET, &url, &self.params, &RequestBody::Empty)
                .await?;
            tracing::debug!(url = %url, more = next_page.is_some(), "Fetched page");

            if let Some(params) = self.follow_params.take() {
                self.params = params;
            }
            self.next_url = next_page;
            self.buffer = match data {
                Some(Value::Array(items)) => items.into(),
                Some(item) => VecDeque::from([item]),
                None => VecDeque::new(),
            };
        }
        Ok(self.buffer.pop_front())
    }

    /// Collects all remaining items into a `Vec`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ApiError`] encountered.
    pub async fn collect(mut self) -> Result<Vec<Value>, ApiError> {
        let mut all = Vec::new();
        while let Some(item) = self.next().await? {
            all.push(item);
        }
        Ok(all)
    }
}

impl<H, C, S> std::fmt::Debug for PageIter<'_, H, C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageIter")
            .field("next_url", &self.next_url)
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}
