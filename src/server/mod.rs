//! Minimal webhook receiver.
//!
//! Serves two routes:
//! - `POST /` validates the request into an [`crate::sansio::Event`] and
//!   dispatches it through a [`crate::routing::Router`]
//! - `GET /health` answers `{"status":"ok"}`
//!
//! Any validation, decoding or callback failure is logged and answered
//! with 500; everything else with 200, matched or not.

mod handlers;
mod hooks;


use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use tokio::net::TcpListener;
use tracing::info;

use crate::routing::Router;

pub use hooks::log_events;

/// Shared state of the receiver.
#[derive(Debug)]
pub struct WebhookState<A> {
    router: Arc<Router<A>>,
    secret: Option<String>,
    args: A,
}

impl<A> WebhookState<A> {
    /// Dispatches through `router`, handing each callback a clone of `args`.
    ///
    /// With a `secret`, requests must carry a matching `x-gitlab-token`.
    pub fn new(router: Router<A>, secret: Option<String>, args: A) -> Self {
        Self {
            router: Arc::new(router),
            secret,
            args,
        }
    }
}

impl<A: Clone> Clone for WebhookState<A> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            secret: self.secret.clone(),
            args: self.args.clone(),
        }
    }
}

/// Creates the axum router for the receiver.
pub fn create_router<A>(state: WebhookState<A>) -> axum::Router
where
    A: Clone + Send + Sync + 'static,
{
    axum::Router::new()
        .route("/", post(handlers::receive_webhook::<A>))
        .route("/health", get(handlers::health_check))
        .with_state(state)
}

/// Serves the receiver on `addr` until `shutdown` completes.
///
/// # Errors
///
/// Returns an I/O error if the address cannot be bound.
pub async fn start_server<A, F>(
    state: WebhookState<A>,
    addr: SocketAddr,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    A: Clone + Send + Sync + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("Webhook receiver listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Webhook receiver stopped");
    Ok(())
}

/// Completes on Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
