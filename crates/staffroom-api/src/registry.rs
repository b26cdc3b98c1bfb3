//! Declarative endpoint definitions and the name registry.
//!
//! An endpoint is data: a name, a pure request builder, an optional response
//! transform and a tag function. Binding a definition registers its name;
//! registering the same name twice is a programming error surfaced as
//! [`ApiError::DuplicateEndpoint`] so a copy-pasted definition fails at
//! startup instead of silently sharing cache entries.

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use staffroom_core::{ApiError, RequestSpec, Result, Tag};
use std::marker::PhantomData;
use std::time::Duration;
use tracing::debug;

// ============================================================================
// Query Definitions
// ============================================================================

/// Declaration of one cacheable read endpoint.
///
/// `A` is the argument type (serialized into the cache key), `T` the typed
/// payload consumers deserialize. All behavior is plain function pointers,
/// so definitions are `Copy` and carry no state.
pub struct QueryDef<A, T> {
    pub(crate) name: &'static str,
    pub(crate) build: fn(&A) -> RequestSpec,
    pub(crate) transform: Option<fn(Value) -> Result<Value>>,
    pub(crate) tags: fn(&Value, &A) -> Vec<Tag>,
    pub(crate) poll: Option<Duration>,
    _marker: PhantomData<fn(&A) -> T>,
}

impl<A, T> QueryDef<A, T> {
    pub const fn new(
        name: &'static str,
        build: fn(&A) -> RequestSpec,
        tags: fn(&Value, &A) -> Vec<Tag>,
    ) -> Self {
        Self {
            name,
            build,
            transform: None,
            tags,
            poll: None,
            _marker: PhantomData,
        }
    }

    /// Normalize the raw response before it is cached or decoded.
    #[must_use]
    pub const fn with_transform(mut self, transform: fn(Value) -> Result<Value>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Default polling interval for subscriptions to this endpoint.
    #[must_use]
    pub const fn with_poll(mut self, interval: Duration) -> Self {
        self.poll = Some(interval);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<A, T> Clone for QueryDef<A, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, T> Copy for QueryDef<A, T> {}

// ============================================================================
// Mutation Definitions
// ============================================================================

/// Declaration of one write endpoint.
///
/// `invalidates` receives the argument and the decoded response and names
/// the tags the write touched; the cache store applies them only after the
/// HTTP call succeeds.
pub struct MutationDef<A, T> {
    pub(crate) name: &'static str,
    pub(crate) build: fn(&A) -> RequestSpec,
    pub(crate) transform: Option<fn(Value) -> Result<Value>>,
    pub(crate) validate: Option<fn(&A) -> Result<()>>,
    pub(crate) invalidates: fn(&A, &T) -> Vec<Tag>,
    _marker: PhantomData<fn(&A) -> T>,
}

impl<A, T> MutationDef<A, T> {
    pub const fn new(
        name: &'static str,
        build: fn(&A) -> RequestSpec,
        invalidates: fn(&A, &T) -> Vec<Tag>,
    ) -> Self {
        Self {
            name,
            build,
            transform: None,
            validate: None,
            invalidates,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn with_transform(mut self, transform: fn(Value) -> Result<Value>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Client-side validation, run before the request is built. A failure
    /// rejects the mutation without touching the network.
    #[must_use]
    pub const fn with_validation(mut self, validate: fn(&A) -> Result<()>) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<A, T> Clone for MutationDef<A, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, T> Copy for MutationDef<A, T> {}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Query,
    Mutation,
}

/// Insertion-ordered set of registered endpoint names.
///
/// Purely for duplicate detection and introspection; the bound handles do
/// the actual work.
#[derive(Debug, Default)]
pub struct Registry {
    names: RwLock<IndexMap<&'static str, EndpointKind>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: &'static str, kind: EndpointKind) -> Result<()> {
        let mut names = self.names.write();
        if names.contains_key(name) {
            return Err(ApiError::duplicate_endpoint(name));
        }
        names.insert(name, kind);
        debug!(endpoint = name, kind = ?kind, "endpoint registered");
        Ok(())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.names.read().keys().copied().collect()
    }

    pub fn kind_of(&self, name: &str) -> Option<EndpointKind> {
        self.names.read().get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }
}
