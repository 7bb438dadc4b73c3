//! Built-in callbacks.

use std::sync::Arc;

use serde_json::Value;

use crate::routing::{BoxError, Router, RouterError};
use crate::sansio::Event;

/// Builds a router logging every event of the given types.
///
/// Useful on its own to watch deliveries, or merged with real handlers.
///
/// # Errors
///
/// Never fails in practice; registration errors are passed through.
pub fn log_events<A>(events: &[String]) -> Result<Router<A>, RouterError>
where
    A: Clone + Send + 'static,
{
    let mut router = Router::new();
    for event_type in events {
        router.register(event_type, &[], log_callback::<A>)?;
    }
    Ok(router)
}

async fn log_callback<A>(event: Arc<Event>, _args: A) -> Result<(), BoxError> {
    log_event(&event);
    Ok(())
}

fn log_event(event: &Event) {
    let data = event.data();
    let project = data
        .pointer("/project/path_with_namespace")
        .and_then(Value::as_str)
        .unwrap_or("-");
    let action = event
        .object_attributes()
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or("-");
    let user = data
        .pointer("/user/username")
        .or_else(|| data.get("user_username"))
        .and_then(Value::as_str)
        .unwrap_or("-");

    tracing::info!(
        event_type = event.event_type(),
        project,
        action,
        user,
        "Received webhook"
    );
}
