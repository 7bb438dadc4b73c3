//! Webhook event routing.
//!
//! A [`Router`] maps event types, optionally narrowed by one
//! `object_attributes` key/value pair, to async callbacks and fans an
//! [`crate::sansio::Event`] out to every match.

mod error;
mod router;

#[cfg(test)]
mod router_tests;

pub use error::{BoxError, DispatchError, RouterError};
pub use router::{Callback, CallbackFuture, Router};
