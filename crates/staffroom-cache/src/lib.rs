//! # staffroom-cache
//!
//! Tag-indexed query cache for the Staffroom client.
//!
//! The store holds one entry per `(endpoint, argument)` pair. Subscribers
//! share entries and their in-flight fetches; mutations invalidate by tag,
//! refetching what is on screen and marking the rest stale. Fetching is
//! delegated to a [`QueryRunner`], so this crate knows nothing about HTTP.
//!
//! ## Example
//!
//! ```ignore
//! use staffroom_cache::{CacheStore, QueryKey};
//! use staffroom_core::{Tag, TagKind};
//!
//! let store = CacheStore::default();
//! let mut sub = store.subscribe(QueryKey::new("job", &"42")?, runner);
//! let state = sub.settled().await;
//!
//! // Elsewhere, after a successful edit:
//! store.invalidate(&[Tag::item(TagKind::Job, "42")]);
//! ```

mod entry;
mod event;
mod runner;
mod state;
mod store;

pub use event::StoreEvent;
pub use runner::{QueryOutput, QueryRunner};
pub use state::{QueryKey, QueryState};
pub use store::{CacheStats, CacheStore, DEFAULT_GRACE, Subscription};

/// Type alias for a shared runner trait object.
pub type DynRunner = std::sync::Arc<dyn QueryRunner>;
