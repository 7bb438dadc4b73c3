//! Two-level dispatch table for webhook events.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use super::{BoxError, DispatchError, RouterError};
use crate::sansio::Event;

/// Future returned by a [`Callback`].
pub type CallbackFuture = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send>>;

/// A registered event handler.
///
/// Receives the event and a clone of the extra argument passed to
/// [`Router::dispatch`], typically an API client handle.
pub type Callback<A> = Arc<dyn Fn(Arc<Event>, A) -> CallbackFuture + Send + Sync>;

/// Callbacks keyed by an attribute value.
type ValueRoutes<A> = Vec<(Value, Vec<Callback<A>>)>;

/// Routes [`Event`]s to registered async callbacks.
///
/// A route is either shallow (every event of a type) or deep (events of a
/// type whose `object_attributes[key]` equals a value). Tables keep
/// registration order, and callbacks run in that order: shallow ones
/// first, then deep ones by key.
///
/// # Example
///
/// ```
/// use gitlab_sansio::routing::Router;
/// use serde_json::json;
///
/// let mut router: Router<()> = Router::new();
/// router
///     .register("Issue Hook", &[("action", json!("open"))], |event, ()| async move {
///         println!("issue opened: {}", event.object_attributes()["title"]);
///         Ok(())
///     })
///     .unwrap();
/// assert_eq!(router.len(), 1);
/// ```
pub struct Router<A> {
    shallow: Vec<(String, Vec<Callback<A>>)>,
    deep: Vec<(String, Vec<(String, ValueRoutes<A>)>)>,
}

impl<A: Clone + Send + 'static> Router<A> {
    /// Creates an empty router.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            shallow: Vec::new(),
            deep: Vec::new(),
        }
    }

    /// Builds one router from the routes of several others.
    ///
    /// Routes keep their relative order within each bucket.
    #[must_use]
    pub fn merge<'a>(routers: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut merged = Self::new();
        for router in routers {
            merged.extend(router);
        }
        merged
    }

    /// Appends every route of `other`.
    pub fn extend(&mut self, other: &Self) {
        for (event_type, callbacks) in &other.shallow {
            bucket(&mut self.shallow, event_type).extend(callbacks.iter().cloned());
        }
        for (event_type, keys) in &other.deep {
            for (key, values) in keys {
                for (value, callbacks) in values {
                    self.deep_bucket(event_type, key, value)
                        .extend(callbacks.iter().cloned());
                }
            }
        }
    }

    /// Adds `callback` for events of `event_type`.
    ///
    /// With one `(key, value)` attribute the callback only runs when the
    /// event's `object_attributes[key]` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::TooManyAttributes`] for more than one
    /// attribute.
    pub fn add(
        &mut self,
        callback: Callback<A>,
        event_type: &str,
        attributes: &[(&str, Value)],
    ) -> Result<(), RouterError> {
        match attributes {
            [] => bucket(&mut self.shallow, event_type).push(callback),
            [(key, value)] => self.deep_bucket(event_type, key, value).push(callback),
            _ => {
                return Err(RouterError::TooManyAttributes {
                    count: attributes.len(),
                });
            }
        }
        Ok(())
    }

    /// Wraps an async function as a [`Callback`] and adds it.
    ///
    /// Returns the callback so it can be added to other routers too.
    ///
    /// # Errors
    ///
    /// See [`Self::add`].
    pub fn register<F, Fut>(
        &mut self,
        event_type: &str,
        attributes: &[(&str, Value)],
        f: F,
    ) -> Result<Callback<A>, RouterError>
    where
        F: Fn(Arc<Event>, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let callback: Callback<A> =
            Arc::new(move |event: Arc<Event>, args: A| -> CallbackFuture {
                Box::pin(f(event, args))
            });
        self.add(Arc::clone(&callback), event_type, attributes)?;
        Ok(callback)
    }

    /// Runs every callback matching `event`, passing each a clone of `args`.
    ///
    /// A failing callback does not stop the others.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] holding every callback failure.
    pub async fn dispatch(&self, event: &Event, args: A) -> Result<usize, DispatchError> {
        let callbacks = self.matching(event);
        if callbacks.is_empty() {
            tracing::debug!(event_type = event.event_type(), "No callbacks registered");
            return Ok(0);
        }

        let shared = Arc::new(event.clone());
        let mut failures = Vec::new();
        for callback in &callbacks {
            if let Err(e) = callback(Arc::clone(&shared), args.clone()).await {
                tracing::warn!(event_type = event.event_type(), "Callback failed: {e}");
                failures.push(e);
            }
        }

        let invoked = callbacks.len();
        tracing::debug!(event_type = event.event_type(), invoked, "Dispatched event");
        if failures.is_empty() {
            Ok(invoked)
        } else {
            Err(DispatchError {
                event_type: event.event_type().to_string(),
                invoked,
                failures,
            })
        }
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        let shallow: usize = self.shallow.iter().map(|(_, cbs)| cbs.len()).sum();
        let deep: usize = self
            .deep
            .iter()
            .flat_map(|(_, keys)| keys)
            .flat_map(|(_, values)| values)
            .map(|(_, cbs)| cbs.len())
            .sum();
        shallow + deep
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matching(&self, event: &Event) -> Vec<Callback<A>> {
        let event_type = event.event_type();
        let mut found: Vec<Callback<A>> = lookup(&self.shallow, event_type)
            .cloned()
            .unwrap_or_default();

        if let Some(keys) = lookup(&self.deep, event_type) {
            let attributes = event.object_attributes();
            for (key, values) in keys {
                let Some(actual) = attributes.get(key) else {
                    continue;
                };
                if let Some(cbs) = lookup(values, actual) {
                    found.extend(cbs.iter().cloned());
                }
            }
        }
        found
    }

    fn deep_bucket(
        &mut self,
        event_type: &str,
        key: &str,
        value: &Value,
    ) -> &mut Vec<Callback<A>> {
        let keys = bucket(&mut self.deep, event_type);
        let values = bucket(keys, key);
        match values.iter().position(|(v, _)| v == value) {
            Some(index) => &mut values[index].1,
            None => {
                values.push((value.clone(), Vec::new()));
                let last = values.len() - 1;
                &mut values[last].1
            }
        }
    }
}

impl<A: Clone + Send + 'static> Default for Router<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for Router<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shallow: Vec<&str> = self.shallow.iter().map(|(t, _)| t.as_str()).collect();
        let deep: Vec<&str> = self.deep.iter().map(|(t, _)| t.as_str()).collect();
        f.debug_struct("Router")
            .field("shallow", &shallow)
            .field("deep", &deep)
            .finish()
    }
}

fn lookup<'a, K, Q, V>(table: &'a [(K, V)], key: &Q) -> Option<&'a V>
where
    K: PartialEq<Q>,
    Q: ?Sized,
{
    table.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

/// Entry for `key`, appended with an empty value if missing.
fn bucket<'a, V: Default>(table: &'a mut Vec<(String, V)>, key: &str) -> &'a mut V {
    match table.iter().position(|(k, _)| k == key) {
        Some(index) => &mut table[index].1,
        None => {
            table.push((key.to_string(), V::default()));
            let last = table.len() - 1;
            &mut table[last].1
        }
    }
}
