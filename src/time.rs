//! Time and pacing abstractions.
//!
//! [`Clock`] lets rate-limit checks run against a controlled "now" in tests.
//! [`Sleeper`] is the pacing collaborator: callers use it to wait out a
//! rate limit, the API client never sleeps on its own.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Abstraction over wall-clock time.
///
/// # Example
///
/// ```
/// use gitlab_sansio::time::{Clock, SystemClock};
///
/// let now = SystemClock.now();
/// assert!(now.timestamp() > 0);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock using actual system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Suspends the current task for a while.
pub trait Sleeper: Send + Sync {
    /// Sleeps for `duration`.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeper backed by [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that returns immediately. Meant for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {}
}
