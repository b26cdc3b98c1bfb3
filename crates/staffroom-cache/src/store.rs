use crate::entry::{CacheEntry, FetchCause, trigger_fetch};
use crate::event::StoreEvent;
use crate::runner::QueryRunner;
use crate::state::{QueryKey, QueryState};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use staffroom_core::{Tag, invalidation_matches};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

/// Buffer for the store event stream; slow observers drop old events.
const EVENT_BUFFER_SIZE: usize = 1024;

/// Default grace window an unsubscribed entry survives before `sweep`
/// evicts it.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(60);

// ============================================================================
// Cache store
// ============================================================================

/// Normalized, tag-indexed cache of query results.
///
/// Entries are keyed by endpoint name plus serialized argument and carry the
/// tags their last fetch provided. Subscribing creates the entry and starts
/// its fetch; further subscribers share the entry and its single in-flight
/// request. Mutations call [`CacheStore::invalidate`] with the tags they
/// touched: subscribed matches refetch immediately, unsubscribed matches are
/// marked stale and refetch on their next subscribe.
pub struct CacheStore {
    entries: DashMap<QueryKey, Arc<CacheEntry>>,
    events: broadcast::Sender<StoreEvent>,
    grace: Duration,
}

impl CacheStore {
    #[must_use]
    pub fn new(grace: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self {
            entries: DashMap::new(),
            events,
            grace,
        }
    }

    /// Subscribe to a key. The first subscriber creates the entry and starts
    /// the fetch; a stale entry refetches; otherwise the subscriber attaches
    /// to whatever is already there, including an in-flight request.
    ///
    /// The runner is captured on entry creation; later subscribers to the
    /// same key reuse it.
    pub fn subscribe(&self, key: QueryKey, runner: Arc<dyn QueryRunner>) -> Subscription {
        self.subscribe_inner(key, runner, None)
    }

    /// Like [`CacheStore::subscribe`], plus a polling task that re-issues
    /// the fetch on `interval` for as long as this subscription is held.
    pub fn subscribe_polling(
        &self,
        key: QueryKey,
        runner: Arc<dyn QueryRunner>,
        interval: Duration,
    ) -> Subscription {
        self.subscribe_inner(key, runner, Some(interval))
    }

    fn subscribe_inner(
        &self,
        key: QueryKey,
        runner: Arc<dyn QueryRunner>,
        poll: Option<Duration>,
    ) -> Subscription {
        let entry = match self.entries.entry(key.clone()) {
            Entry::Occupied(occupied) => {
                let entry = occupied.get().clone();
                let needs_refetch = {
                    let mut inner = entry.inner.lock();
                    entry.subscribers.fetch_add(1, Ordering::SeqCst);
                    inner.released_at = None;
                    inner.stale && !inner.fetching
                };
                if needs_refetch {
                    trigger_fetch(&entry, &self.events, FetchCause::Resubscribe);
                }
                entry
            }
            Entry::Vacant(vacant) => {
                let entry = CacheEntry::new(key, runner);
                entry.subscribers.store(1, Ordering::SeqCst);
                vacant.insert(entry.clone());
                trigger_fetch(&entry, &self.events, FetchCause::Initial);
                entry
            }
        };

        let rx = entry.tx.subscribe();
        let poll_task = poll.map(|interval| {
            let entry = entry.clone();
            let events = self.events.clone();
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(interval).await;
                    trigger_fetch(&entry, &events, FetchCause::Poll);
                }
            })
        });

        Subscription {
            entry,
            rx,
            poll_task,
        }
    }

    /// Apply an invalidation set to every entry whose provided tags match.
    ///
    /// Subscribed entries refetch right away; an entry with a fetch already
    /// in flight queues exactly one follow-up. Unsubscribed entries are only
    /// marked stale.
    pub fn invalidate(&self, tags: &[Tag]) {
        if tags.is_empty() {
            return;
        }
        let mut refetched = 0usize;
        let mut marked_stale = 0usize;

        for entry_ref in self.entries.iter() {
            let entry = entry_ref.value().clone();
            let subscribed = {
                let mut inner = entry.inner.lock();
                if !invalidation_matches(tags, &inner.tags) {
                    continue;
                }
                if entry.subscribers.load(Ordering::SeqCst) > 0 {
                    true
                } else {
                    inner.stale = true;
                    let restated = {
                        let current = entry.tx.borrow();
                        match &*current {
                            QueryState::Success { data, .. } => Some(QueryState::Success {
                                data: data.clone(),
                                stale: true,
                            }),
                            QueryState::Error { error, .. } => Some(QueryState::Error {
                                error: error.clone(),
                                stale: true,
                            }),
                            _ => None,
                        }
                    };
                    if let Some(state) = restated {
                        entry.tx.send_replace(state);
                    }
                    false
                }
            };

            if subscribed {
                let _ = self.events.send(StoreEvent::Invalidated {
                    key: entry.key.clone(),
                });
                trigger_fetch(&entry, &self.events, FetchCause::Invalidated);
                refetched += 1;
            } else {
                let _ = self.events.send(StoreEvent::MarkedStale {
                    key: entry.key.clone(),
                });
                marked_stale += 1;
            }
        }

        let declared = tags.iter().map(Tag::to_string).collect::<Vec<_>>().join(",");
        info!(tags = %declared, refetched, marked_stale, "cache invalidated");
    }

    /// Current published state of a key, if the entry exists.
    pub fn snapshot(&self, key: &QueryKey) -> Option<QueryState> {
        self.entries.get(key).map(|e| e.tx.borrow().clone())
    }

    /// Evict unsubscribed entries whose grace window has elapsed. Returns
    /// how many were evicted. Entries with subscribers are never touched.
    pub fn sweep(&self) -> usize {
        let grace = self.grace;
        let mut evicted = Vec::new();
        self.entries.retain(|key, entry| {
            if entry.subscribers.load(Ordering::SeqCst) > 0 {
                return true;
            }
            let mut inner = entry.inner.lock();
            match inner.released_at {
                Some(at) if at.elapsed() >= grace => {
                    inner.retired = true;
                    evicted.push(key.clone());
                    false
                }
                _ => true,
            }
        });

        for key in &evicted {
            debug!(key = %key, "entry evicted");
            let _ = self.events.send(StoreEvent::Evicted { key: key.clone() });
        }
        evicted.len()
    }

    /// Drop every entry, subscribed or not. Used on logout so nothing from
    /// the previous session survives; still-mounted subscribers observe
    /// `Uninitialized`.
    pub fn clear(&self) {
        let mut cleared = 0usize;
        self.entries.retain(|key, entry| {
            {
                let mut inner = entry.inner.lock();
                inner.retired = true;
                inner.pending_refetch = false;
                entry.tx.send_replace(QueryState::Uninitialized);
            }
            let _ = self.events.send(StoreEvent::Evicted { key: key.clone() });
            cleared += 1;
            false
        });
        info!(entries = cleared, "cache cleared");
    }

    /// Observe store lifecycle events. Only events sent after this call are
    /// received.
    pub fn events(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for entry_ref in self.entries.iter() {
            let entry = entry_ref.value();
            stats.entries += 1;
            let subscribers = entry.subscribers.load(Ordering::SeqCst) as usize;
            stats.total_subscribers += subscribers;
            if subscribers > 0 {
                stats.subscribed_entries += 1;
            }
            let inner = entry.inner.lock();
            if inner.stale {
                stats.stale_entries += 1;
            }
            if inner.fetching {
                stats.in_flight += 1;
            }
        }
        stats
    }

    #[must_use]
    pub fn grace(&self) -> Duration {
        self.grace
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE)
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.entries.len())
            .field("grace", &self.grace)
            .finish()
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// A live interest in one cache entry.
///
/// Holds a watch receiver for the entry's state. Dropping it releases the
/// subscriber count (starting the eviction grace window on the last one) and
/// stops this subscription's polling; it never cancels an in-flight fetch.
pub struct Subscription {
    entry: Arc<CacheEntry>,
    rx: watch::Receiver<QueryState>,
    poll_task: Option<tokio::task::JoinHandle<()>>,
}

impl Subscription {
    pub fn key(&self) -> &QueryKey {
        &self.entry.key
    }

    /// The state right now.
    pub fn current(&self) -> QueryState {
        self.rx.borrow().clone()
    }

    /// Wait for the next state change and return it.
    pub async fn changed(&mut self) -> QueryState {
        // The sender lives inside the entry this subscription holds, so the
        // channel cannot close while we are alive.
        let _ = self.rx.changed().await;
        self.rx.borrow_and_update().clone()
    }

    /// Wait until the current fetch cycle lands on `Success` or `Error`.
    pub async fn settled(&mut self) -> QueryState {
        loop {
            let state = self.rx.borrow_and_update().clone();
            if state.is_settled() {
                return state;
            }
            if self.rx.changed().await.is_err() {
                return state;
            }
        }
    }

    /// A bare receiver for callers that select over several entries.
    pub fn watch(&self) -> watch::Receiver<QueryState> {
        self.rx.clone()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = &self.poll_task {
            task.abort();
        }
        let mut inner = self.entry.inner.lock();
        if self.entry.subscribers.fetch_sub(1, Ordering::SeqCst) == 1 {
            inner.released_at = Some(Instant::now());
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Point-in-time counters over the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub subscribed_entries: usize,
    pub total_subscribers: usize,
    pub stale_entries: usize,
    pub in_flight: usize,
}

// ============================================================================
// Tests
// ============================================================================
