//! Bound endpoint handles.
//!
//! A handle pairs a definition with the shared HTTP client and cache store.
//! Query handles subscribe through the store so every consumer of the same
//! `(endpoint, argument)` pair shares one entry and one in-flight request;
//! mutation handles execute immediately and broadcast their invalidation
//! tags once the call has succeeded.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use staffroom_cache::{CacheStore, QueryKey, QueryOutput, QueryRunner, QueryState, Subscription};
use staffroom_core::{ApiError, RequestSpec, Result, Tag};
use staffroom_http::HttpClient;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::registry::{EndpointKind, MutationDef, QueryDef, Registry};

// ============================================================================
// Binder
// ============================================================================

/// Wires definitions to the shared client, store and registry.
pub(crate) struct Binder {
    pub(crate) http: Arc<HttpClient>,
    pub(crate) store: Arc<CacheStore>,
    pub(crate) registry: Arc<Registry>,
}

impl Binder {
    pub(crate) fn query<A, T>(&self, def: QueryDef<A, T>) -> Result<QueryHandle<A, T>> {
        self.registry.register(def.name, EndpointKind::Query)?;
        Ok(QueryHandle {
            def,
            http: self.http.clone(),
            store: self.store.clone(),
        })
    }

    pub(crate) fn mutation<A, T>(&self, def: MutationDef<A, T>) -> Result<MutationHandle<A, T>> {
        self.registry.register(def.name, EndpointKind::Mutation)?;
        Ok(MutationHandle {
            def,
            http: self.http.clone(),
            store: self.store.clone(),
        })
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Executes one endpoint's fetch for the cache store.
///
/// Captured per entry: the request is built once from the argument, and
/// every refetch of the entry re-sends it and recomputes the provided tags
/// from the fresh payload.
struct EndpointRunner<A> {
    http: Arc<HttpClient>,
    spec: RequestSpec,
    transform: Option<fn(Value) -> Result<Value>>,
    tags: fn(&Value, &A) -> Vec<Tag>,
    arg: A,
}

#[async_trait]
impl<A: Send + Sync + 'static> QueryRunner for EndpointRunner<A> {
    async fn run(&self) -> Result<QueryOutput> {
        let raw = self.http.send(&self.spec).await?;
        let data = match self.transform {
            Some(transform) => transform(raw)?,
            None => raw,
        };
        let tags = (self.tags)(&data, &self.arg);
        Ok(QueryOutput { data, tags })
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, data: Value) -> Result<T> {
    serde_json::from_value(data).map_err(|e| ApiError::decode(format!("{endpoint}: {e}")))
}

// ============================================================================
// Query Handle
// ============================================================================

/// Bound read endpoint.
pub struct QueryHandle<A, T> {
    def: QueryDef<A, T>,
    http: Arc<HttpClient>,
    store: Arc<CacheStore>,
}

impl<A, T> QueryHandle<A, T>
where
    A: Serialize + Send + Sync + 'static,
    T: DeserializeOwned,
{
    pub fn name(&self) -> &'static str {
        self.def.name
    }

    /// Subscribe to this endpoint for `arg`, using the definition's default
    /// polling interval if it declares one.
    pub fn subscribe(&self, arg: A) -> Result<TypedSubscription<T>> {
        self.subscribe_inner(arg, self.def.poll)
    }

    /// Subscribe with an explicit polling interval.
    pub fn subscribe_polling(&self, arg: A, interval: Duration) -> Result<TypedSubscription<T>> {
        self.subscribe_inner(arg, Some(interval))
    }

    fn subscribe_inner(&self, arg: A, poll: Option<Duration>) -> Result<TypedSubscription<T>> {
        let key = QueryKey::new(self.def.name, &arg)?;
        let runner: Arc<dyn QueryRunner> = Arc::new(EndpointRunner {
            http: self.http.clone(),
            spec: (self.def.build)(&arg),
            transform: self.def.transform,
            tags: self.def.tags,
            arg,
        });
        let inner = match poll {
            Some(interval) => self.store.subscribe_polling(key, runner, interval),
            None => self.store.subscribe(key, runner),
        };
        Ok(TypedSubscription {
            inner,
            _marker: PhantomData,
        })
    }

    /// One-shot fetch that bypasses the cache entirely.
    pub async fn fetch(&self, arg: &A) -> Result<T> {
        let spec = (self.def.build)(arg);
        let raw = self.http.send(&spec).await?;
        let data = match self.def.transform {
            Some(transform) => transform(raw)?,
            None => raw,
        };
        decode(self.def.name, data)
    }
}

// ============================================================================
// Mutation Handle
// ============================================================================

/// Bound write endpoint.
pub struct MutationHandle<A, T> {
    def: MutationDef<A, T>,
    http: Arc<HttpClient>,
    store: Arc<CacheStore>,
}

impl<A, T> MutationHandle<A, T>
where
    T: DeserializeOwned,
{
    pub fn name(&self) -> &'static str {
        self.def.name
    }

    /// Execute the mutation. Invalidation tags are broadcast only after the
    /// HTTP call succeeded, so a failed write never refetches anything.
    pub async fn run(&self, arg: &A) -> Result<T> {
        if let Some(validate) = self.def.validate {
            validate(arg)?;
        }
        let spec = (self.def.build)(arg);
        let raw = self.http.send(&spec).await?;
        let data = match self.def.transform {
            Some(transform) => transform(raw)?,
            None => raw,
        };
        let decoded: T = decode(self.def.name, data)?;

        let tags = (self.def.invalidates)(arg, &decoded);
        debug!(endpoint = self.def.name, invalidates = tags.len(), "mutation succeeded");
        if !tags.is_empty() {
            self.store.invalidate(&tags);
        }
        Ok(decoded)
    }
}

// ============================================================================
// Typed Subscriptions
// ============================================================================

/// Cache entry state decoded into the endpoint's payload type.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryView<T> {
    Uninitialized,
    Loading,
    Ready { data: T, stale: bool },
    Failed { error: ApiError, stale: bool },
    Refetching { previous: Option<T> },
}

impl<T> QueryView<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            QueryView::Ready { data, .. } => Some(data),
            QueryView::Refetching {
                previous: Some(previous),
            } => Some(previous),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            QueryView::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, QueryView::Ready { .. })
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self, QueryView::Loading | QueryView::Refetching { .. })
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, QueryView::Ready { .. } | QueryView::Failed { .. })
    }
}

impl<T: DeserializeOwned> QueryView<T> {
    fn from_state(state: QueryState) -> Self {
        match state {
            QueryState::Uninitialized => QueryView::Uninitialized,
            QueryState::Loading => QueryView::Loading,
            QueryState::Success { data, stale } => {
                match serde_json::from_value(data.as_ref().clone()) {
                    Ok(decoded) => QueryView::Ready {
                        data: decoded,
                        stale,
                    },
                    Err(e) => QueryView::Failed {
                        error: ApiError::decode(e.to_string()),
                        stale,
                    },
                }
            }
            QueryState::Error { error, stale } => QueryView::Failed { error, stale },
            QueryState::Refetching { previous } => QueryView::Refetching {
                previous: previous
                    .and_then(|data| serde_json::from_value(data.as_ref().clone()).ok()),
            },
        }
    }
}

/// A live, typed interest in one cache entry.
///
/// Dropping it releases the underlying store subscription (and its polling
/// task, if any).
pub struct TypedSubscription<T> {
    inner: Subscription,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> TypedSubscription<T> {
    pub fn key(&self) -> &QueryKey {
        self.inner.key()
    }

    /// The decoded state right now.
    pub fn current(&self) -> QueryView<T> {
        QueryView::from_state(self.inner.current())
    }

    /// Wait for the next state change and decode it.
    pub async fn changed(&mut self) -> QueryView<T> {
        QueryView::from_state(self.inner.changed().await)
    }

    /// Wait until the current fetch cycle lands on `Ready` or `Failed`.
    pub async fn settled(&mut self) -> QueryView<T> {
        QueryView::from_state(self.inner.settled().await)
    }

    /// The raw, untyped store subscription.
    pub fn raw(&self) -> &Subscription {
        &self.inner
    }
}
