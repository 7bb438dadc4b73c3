//! gitlab-sansio: a transport-agnostic GitLab API client and webhook router
//!
//! The protocol rules live in [`sansio`] as pure functions over headers,
//! status codes and bodies. [`api`] drives them through any
//! [`transport::HttpClient`], with conditional-request caching, rate-limit
//! tracking and pagination. [`routing`] dispatches validated webhook
//! [`sansio::Event`]s to async callbacks and [`server`] exposes them over HTTP.

pub mod api;
pub mod config;
pub mod routing;
pub mod sansio;
pub mod server;
pub mod time;
pub mod transport;
