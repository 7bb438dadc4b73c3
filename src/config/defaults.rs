//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

/// Default GitLab instance.
pub const URL: &str = crate::api::DEFAULT_URL;

/// Default REST API version.
pub const API_VERSION: &str = crate::api::DEFAULT_API_VERSION;

/// Default user agent.
pub const REQUESTER: &str = "gitlab-sansio";

/// Default number of cached GET responses.
pub const CACHE_SIZE: usize = 500;

/// Default webhook receiver address.
pub const BIND: &str = "127.0.0.1:8080";

/// Event types logged by the receiver when none are configured.
pub const EVENTS: &[&str] = &[
    "Push Hook",
    "Tag Push Hook",
    "Issue Hook",
    "Note Hook",
    "Merge Request Hook",
    "Pipeline Hook",
    "Job Hook",
    "Release Hook",
];

/// Default event types as owned strings.
#[must_use]
pub fn events() -> Vec<String> {
    EVENTS.iter().map(ToString::to_string).collect()
}
