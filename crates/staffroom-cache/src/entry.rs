use crate::event::StoreEvent;
use crate::runner::{QueryOutput, QueryRunner};
use crate::state::{QueryKey, QueryState};
use parking_lot::Mutex;
use staffroom_core::Tag;
use std::sync::Arc;
use std::sync::atomic::AtomicU32;
use std::time::Instant;
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};
use uuid::Uuid;

/// Why a fetch is being started. Only invalidations queue a follow-up when a
/// fetch is already in flight; polls and resubscribes ride the running one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FetchCause {
    Initial,
    Invalidated,
    Poll,
    Resubscribe,
}

/// Mutable bookkeeping of one entry. Everything here is read and written
/// under the one lock; the lock is never held across an await.
pub(crate) struct EntryInner {
    /// Tags the last successful fetch provided.
    pub tags: Vec<Tag>,
    /// A fetch task is currently running for this entry.
    pub fetching: bool,
    /// An invalidation landed mid-fetch; run exactly one more round.
    pub pending_refetch: bool,
    /// Invalidated while unsubscribed; refetch lazily on next subscribe.
    pub stale: bool,
    /// Removed from the store; completing fetches must not publish.
    pub retired: bool,
    /// When the last subscriber left, for grace-window eviction.
    pub released_at: Option<Instant>,
}

pub(crate) struct CacheEntry {
    pub key: QueryKey,
    pub runner: Arc<dyn QueryRunner>,
    pub tx: watch::Sender<QueryState>,
    pub subscribers: AtomicU32,
    pub inner: Mutex<EntryInner>,
}

impl CacheEntry {
    pub fn new(key: QueryKey, runner: Arc<dyn QueryRunner>) -> Arc<Self> {
        let (tx, _) = watch::channel(QueryState::Uninitialized);
        Arc::new(Self {
            key,
            runner,
            tx,
            subscribers: AtomicU32::new(0),
            inner: Mutex::new(EntryInner {
                tags: Vec::new(),
                fetching: false,
                pending_refetch: false,
                stale: false,
                retired: false,
                released_at: None,
            }),
        })
    }
}

/// Start a fetch for the entry unless one is already running.
///
/// With a fetch in flight, an invalidation records a pending refetch and
/// every other cause is a no-op, so one key never has two requests in the
/// air.
pub(crate) fn trigger_fetch(
    entry: &Arc<CacheEntry>,
    events: &broadcast::Sender<StoreEvent>,
    cause: FetchCause,
) {
    let fetch_id = {
        let mut inner = entry.inner.lock();
        if inner.retired {
            return;
        }
        if inner.fetching {
            if cause == FetchCause::Invalidated {
                inner.pending_refetch = true;
            }
            return;
        }
        inner.fetching = true;
        let next = {
            let current = entry.tx.borrow();
            match &*current {
                QueryState::Uninitialized | QueryState::Loading => QueryState::Loading,
                QueryState::Success { data, .. } => QueryState::Refetching {
                    previous: Some(data.clone()),
                },
                QueryState::Error { .. } => QueryState::Refetching { previous: None },
                QueryState::Refetching { previous } => QueryState::Refetching {
                    previous: previous.clone(),
                },
            }
        };
        entry.tx.send_replace(next);
        Uuid::new_v4()
    };

    debug!(key = %entry.key, fetch_id = %fetch_id, cause = ?cause, "fetch started");
    let _ = events.send(StoreEvent::FetchStarted {
        key: entry.key.clone(),
        fetch_id,
    });

    let entry = entry.clone();
    let events = events.clone();
    tokio::spawn(run_fetch(entry, events, fetch_id));
}

/// Run the entry's fetch to completion, then run the pending follow-up
/// rounds an invalidation may have queued. The entry stays `fetching` across
/// rounds so no other fetch can slip in between.
async fn run_fetch(
    entry: Arc<CacheEntry>,
    events: broadcast::Sender<StoreEvent>,
    mut fetch_id: Uuid,
) {
    loop {
        let outcome = entry.runner.run().await;

        let (event, next_round) = {
            let mut inner = entry.inner.lock();
            if inner.retired {
                inner.fetching = false;
                return;
            }
            let event = match outcome {
                Ok(QueryOutput { data, tags }) => {
                    inner.tags = tags;
                    inner.stale = false;
                    entry.tx.send_replace(QueryState::Success {
                        data: Arc::new(data),
                        stale: false,
                    });
                    StoreEvent::FetchSucceeded {
                        key: entry.key.clone(),
                        fetch_id,
                    }
                }
                Err(error) => {
                    entry.tx.send_replace(QueryState::Error {
                        error: error.clone(),
                        stale: inner.stale,
                    });
                    StoreEvent::FetchFailed {
                        key: entry.key.clone(),
                        fetch_id,
                        error,
                    }
                }
            };

            let next_round = if std::mem::take(&mut inner.pending_refetch) {
                let previous = entry.tx.borrow().data().cloned();
                entry.tx.send_replace(QueryState::Refetching { previous });
                Some(Uuid::new_v4())
            } else {
                inner.fetching = false;
                None
            };
            (event, next_round)
        };

        match &event {
            StoreEvent::FetchFailed { error, .. } => {
                warn!(key = %entry.key, fetch_id = %fetch_id, error = %error, "fetch failed");
            }
            _ => {
                debug!(key = %entry.key, fetch_id = %fetch_id, "fetch succeeded");
            }
        }
        let _ = events.send(event);

        match next_round {
            Some(next_id) => {
                debug!(key = %entry.key, fetch_id = %next_id, cause = ?FetchCause::Invalidated, "fetch started");
                let _ = events.send(StoreEvent::FetchStarted {
                    key: entry.key.clone(),
                    fetch_id: next_id,
                });
                fetch_id = next_id;
            }
            None => return,
        }
    }
}
