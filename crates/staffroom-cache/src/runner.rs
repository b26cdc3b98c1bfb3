use async_trait::async_trait;
use serde_json::Value;
use staffroom_core::{Result, Tag};

/// Result of one successful fetch: the payload to cache and the tags the
/// entry provides from now on.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput {
    pub data: Value,
    pub tags: Vec<Tag>,
}

/// Executes the fetch for one cache entry.
///
/// The store owns no HTTP knowledge; it re-runs whatever runner the entry
/// was created with, for the first load, invalidation refetches and polling
/// alike. The endpoint registry binds a runner from an HTTP client, a
/// request builder and the entry's argument.
#[async_trait]
pub trait QueryRunner: Send + Sync {
    async fn run(&self) -> Result<QueryOutput>;
}
