//! Rate limit snapshot parsed from response headers.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use http::HeaderMap;

use crate::time::Clock;

const LIMIT_HEADER: &str = "ratelimit-limit";
const REMAINING_HEADER: &str = "ratelimit-remaining";
const RESET_HEADER: &str = "ratelimit-reset";

/// The rate limit imposed upon the requester.
///
/// `limit` is the number of requests allowed per window, `remaining` how
/// many are left in the current one, and `reset` when `remaining` goes back
/// up to `limit`.
///
/// The snapshot is advisory: the API client overwrites it after every
/// response and decrements it locally before each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests allowed per window
    pub limit: u64,
    /// Requests left in the current window
    pub remaining: u64,
    /// When the window resets
    pub reset: DateTime<Utc>,
}

impl RateLimit {
    /// Creates a snapshot from its parts.
    #[must_use]
    pub const fn new(limit: u64, remaining: u64, reset: DateTime<Utc>) -> Self {
        Self {
            limit,
            remaining,
            reset,
        }
    }

    /// Creates a snapshot whose reset is given in (possibly fractional)
    /// seconds since the Unix epoch.
    ///
    /// Returns `None` if the epoch is not finite or out of range.
    #[must_use]
    pub fn from_epoch(limit: u64, remaining: u64, reset_epoch: f64) -> Option<Self> {
        if !reset_epoch.is_finite() {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let micros = (reset_epoch * 1_000_000.0).round() as i64;
        let reset = DateTime::from_timestamp_micros(micros)?;
        Some(Self::new(limit, remaining, reset))
    }

    /// Reads `ratelimit-limit`, `ratelimit-remaining` and `ratelimit-reset`.
    ///
    /// Returns `None` unless all three are present and well-formed.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let limit = header_str(headers, LIMIT_HEADER)?.parse().ok()?;
        let remaining = header_str(headers, REMAINING_HEADER)?.parse().ok()?;
        let reset_epoch = header_str(headers, RESET_HEADER)?.parse().ok()?;

        Self::from_epoch(limit, remaining, reset_epoch)
    }

    /// Whether another request can be made at `now`: requests remain, or
    /// the reset time has passed.
    #[must_use]
    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        self.remaining > 0 || now > self.reset
    }

    /// [`Self::is_available_at`] using the given clock.
    #[must_use]
    pub fn is_available(&self, clock: &impl Clock) -> bool {
        self.is_available_at(clock.now())
    }

    /// How long until the window resets, zero if it already has.
    ///
    /// Handy as the argument to a [`crate::time::Sleeper`] when
    /// [`Self::is_available_at`] is false.
    #[must_use]
    pub fn time_until_reset(&self, now: DateTime<Utc>) -> Duration {
        (self.reset - now).to_std().unwrap_or(Duration::ZERO)
    }

    /// Records one locally issued request.
    pub(crate) const fn consume(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "< {}/{} until {} >",
            group_thousands(self.remaining),
            group_thousands(self.limit),
            self.reset
        )
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

/// Formats `n` with comma thousands separators.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
