//! Application execution logic.
//!
//! Builds the API client from the validated config, then either serves
//! webhooks until a shutdown signal or fetches one API path and prints it.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use gitlab_sansio::api::{ApiError, Cache, GitLabApi, LruCache, Params};
use gitlab_sansio::config::{Action, GitLabSettings, ServerSettings, ValidatedConfig};
use gitlab_sansio::routing::RouterError;
use gitlab_sansio::server::{WebhookState, log_events, shutdown_signal, start_server};
use gitlab_sansio::time::Sleeper;
use gitlab_sansio::transport::{HttpClient, HttpError, ReqwestClient};

/// Type alias for the application's API client.
type AppApi = GitLabApi<ReqwestClient, LruCache>;

/// Per-exchange timeout for API requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to build the HTTP client.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] HttpError),

    /// API request failed.
    #[error("API request failed: {0}")]
    Api(#[from] ApiError),

    /// Failed to register webhook callbacks.
    #[error("Failed to set up webhook routes: {0}")]
    Router(#[from] RouterError),

    /// Webhook receiver failed.
    #[error("Webhook receiver failed: {0}")]
    Server(#[source] std::io::Error),

    /// Failed to render the API response.
    #[error("Failed to render response: {0}")]
    Output(#[from] serde_json::Error),
}

/// Executes the selected action.
///
/// # Errors
///
/// Returns an error if:
/// - The HTTP client cannot be created
/// - A `get` request fails
/// - The receiver address cannot be bound
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires
/// real network access and signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let api = create_api(&config.gitlab)?;
    tracing::debug!("API root: {}", api.api_url());

    match config.action {
        Action::Serve => serve(api, &config.server).await,
        Action::Get { path, params, all } => {
            let value = fetch(&api, &path, &params, all).await?;
            println!("{}", render(&value)?);
            log_rate_limit(&api);
            Ok(())
        }
    }
}

/// Builds the API client; a `cache_size` of 0 disables caching.
fn create_api(settings: &GitLabSettings) -> Result<AppApi, RunError> {
    let http = ReqwestClient::with_timeout(REQUEST_TIMEOUT).map_err(RunError::Client)?;

    let mut api = GitLabApi::new(http, settings.requester.clone())
        .with_url(settings.url.as_str(), &settings.api_version)?
        .with_optional_cache(NonZeroUsize::new(settings.cache_size).map(LruCache::new));

    if let Some(ref token) = settings.access_token {
        api = api.with_access_token(token.clone());
    }

    Ok(api)
}

/// Runs the webhook receiver until Ctrl+C or SIGTERM.
///
/// Callbacks receive the shared API client so they can call back into GitLab.
#[cfg(not(tarpaulin_include))]
async fn serve(api: AppApi, settings: &ServerSettings) -> Result<(), RunError> {
    let router = log_events::<Arc<AppApi>>(&settings.events)?;
    tracing::info!(
        "Logging {} event type(s) with {} callback(s)",
        settings.events.len(),
        router.len()
    );
    if settings.secret.is_none() {
        tracing::warn!("No webhook secret configured; deliveries are not authenticated");
    }

    let state = WebhookState::new(router, settings.secret.clone(), Arc::new(api));
    start_server(state, settings.bind, shutdown_signal())
        .await
        .map_err(RunError::Server)
}

/// Fetches `path`: the single payload, or every item across pages with `all`.
///
/// A response without a body is reported as `null`.
async fn fetch<H, C, S>(
    api: &GitLabApi<H, C, S>,
    path: &str,
    params: &Params,
    all: bool,
) -> Result<Value, ApiError>
where
    H: HttpClient,
    C: Cache,
    S: Sleeper,
{
    if all {
        let items = api.get_iter(path, params).collect().await?;
        tracing::debug!("Fetched {} item(s) from {path}", items.len());
        Ok(Value::Array(items))
    } else {
        Ok(api.get_item(path, params).await?.unwrap_or(Value::Null))
    }
}

fn render(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

fn log_rate_limit<H: HttpClient, C: Cache, S: Sleeper>(api: &GitLabApi<H, C, S>) {
    if let Some(limit) = api.rate_limit() {
        tracing::debug!("Rate limit: {limit}");
    }
}
