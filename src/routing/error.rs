//! Error types for event routing.

use thiserror::Error;

/// Boxed error returned by a failing callback.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for callback registration.
#[derive(Debug, Error)]
pub enum RouterError {
    /// More than one object attribute was given for a single route.
    #[error(
        "dispatching based on object attributes is only supported up to one level deep; \
         {count} levels specified"
    )]
    TooManyAttributes {
        /// Number of attributes given
        count: usize,
    },
}

/// One or more callbacks failed during [`super::Router::dispatch`].
///
/// Every matched callback still ran; this collects the failures.
#[derive(Debug, Error)]
#[error("{} of {invoked} callbacks failed for {event_type:?}", failures.len())]
pub struct DispatchError {
    /// Event type being dispatched
    pub event_type: String,
    /// Number of callbacks invoked, failing or not
    pub invoked: usize,
    /// Errors in callback order
    pub failures: Vec<BoxError>,
}
