use crate::state::QueryKey;
use staffroom_core::ApiError;
use uuid::Uuid;

/// Observable lifecycle events of the cache store.
///
/// Every fetch carries a correlation id so starts and completions can be
/// paired in logs and tests.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    FetchStarted { key: QueryKey, fetch_id: Uuid },
    FetchSucceeded { key: QueryKey, fetch_id: Uuid },
    FetchFailed {
        key: QueryKey,
        fetch_id: Uuid,
        error: ApiError,
    },
    /// A subscribed entry matched an invalidation and is refetching.
    Invalidated { key: QueryKey },
    /// An unsubscribed entry matched an invalidation and was marked stale.
    MarkedStale { key: QueryKey },
    Evicted { key: QueryKey },
}

impl StoreEvent {
    pub fn key(&self) -> &QueryKey {
        match self {
            StoreEvent::FetchStarted { key, .. }
            | StoreEvent::FetchSucceeded { key, .. }
            | StoreEvent::FetchFailed { key, .. }
            | StoreEvent::Invalidated { key }
            | StoreEvent::MarkedStale { key }
            | StoreEvent::Evicted { key } => key,
        }
    }
}
