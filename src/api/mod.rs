//! Request/cache orchestration for GitLab's REST API.
//!
//! [`GitLabApi`] turns calls like `get_item("/projects/{id}", ...)` into
//! [`crate::transport::HttpRequest`]s, hands them to an
//! [`crate::transport::HttpClient`], and interprets the answers with
//! [`crate::sansio`]. Along the way it:
//! - resolves paths and URI templates against the API root
//! - sends conditional GETs from a [`Cache`] and serves `304`s from it
//! - tracks the most recent [`crate::sansio::RateLimit`]
//! - follows `rel="next"` links in [`PageIter`]

mod body;
mod cache;
mod client;
mod endpoint;
mod error;
mod pages;

#[cfg(test)]
mod test_fixtures;

pub use body::RequestBody;
pub use cache::{Cache, CacheEntry, LruCache, MemoryCache};
pub use client::{DEFAULT_API_VERSION, DEFAULT_URL, GitLabApi};
pub use endpoint::{Params, api_root, format_url};
pub use error::ApiError;
pub use pages::PageIter;
