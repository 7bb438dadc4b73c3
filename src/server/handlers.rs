//! Request handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, error, warn};

use super::WebhookState;
use crate::sansio::Event;

/// `POST /`: validate, decode and dispatch one webhook delivery.
pub async fn receive_webhook<A>(
    State(state): State<WebhookState<A>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode
where
    A: Clone + Send + Sync + 'static,
{
    let event = match Event::from_request(&headers, &body, state.secret.as_deref()) {
        Ok(event) => event,
        Err(e) => {
            warn!("Rejected webhook: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    match state.router.dispatch(&event, state.args.clone()).await {
        Ok(invoked) => {
            debug!(event_type = event.event_type(), invoked, "Webhook handled");
            StatusCode::OK
        }
        Err(e) => {
            error!("Webhook dispatch failed: {e}");
            for failure in &e.failures {
                error!("  {failure}");
            }
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// `GET /health`
pub async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
