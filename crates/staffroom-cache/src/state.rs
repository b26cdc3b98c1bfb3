use serde::Serialize;
use serde_json::Value;
use staffroom_core::{ApiError, Result};
use std::fmt;
use std::sync::Arc;

/// Identity of one cache entry: the endpoint name plus the canonical JSON of
/// its argument. Different arguments are different entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub endpoint: &'static str,
    pub arg: String,
}

impl QueryKey {
    /// Build a key by serializing the argument. Struct fields serialize in
    /// declaration order and map keys sort, so equal arguments always
    /// produce equal keys.
    pub fn new<A: Serialize>(endpoint: &'static str, arg: &A) -> Result<Self> {
        let arg = serde_json::to_string(arg)
            .map_err(|e| ApiError::invalid_key(format!("{endpoint}: {e}")))?;
        Ok(Self { endpoint, arg })
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.endpoint, self.arg)
    }
}

/// Published state of one cache entry.
///
/// Entries move `Uninitialized → Loading → Success | Error`, and on
/// invalidation or polling `→ Refetching → Success | Error`. `Refetching`
/// keeps the previous payload so consumers can keep rendering it.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    Uninitialized,
    Loading,
    Success { data: Arc<Value>, stale: bool },
    Error { error: ApiError, stale: bool },
    Refetching { previous: Option<Arc<Value>> },
}

impl QueryState {
    /// Payload a consumer can render right now, if any.
    pub fn data(&self) -> Option<&Arc<Value>> {
        match self {
            QueryState::Success { data, .. } => Some(data),
            QueryState::Refetching { previous } => previous.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            QueryState::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    /// First fetch in flight, nothing to show yet.
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    /// Any fetch in flight, first or not.
    pub fn is_fetching(&self) -> bool {
        matches!(self, QueryState::Loading | QueryState::Refetching { .. })
    }

    /// Settled means the last fetch finished, one way or the other.
    pub fn is_settled(&self) -> bool {
        matches!(self, QueryState::Success { .. } | QueryState::Error { .. })
    }

    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            QueryState::Success { stale: true, .. } | QueryState::Error { stale: true, .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Filters {
        q: String,
        location: Option<String>,
    }

    #[test]
    fn test_equal_args_produce_equal_keys() {
        let a = QueryKey::new(
            "listJobs",
            &Filters {
                q: "math".into(),
                location: None,
            },
        )
        .unwrap();
        let b = QueryKey::new(
            "listJobs",
            &Filters {
                q: "math".into(),
                location: None,
            },
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_args_produce_different_keys() {
        let a = QueryKey::new("job", &"1").unwrap();
        let b = QueryKey::new("job", &"2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_map_keys_are_canonicalized() {
        // serde_json maps sort their keys, so insertion order cannot split
        // one logical argument into two cache entries.
        let mut first = serde_json::Map::new();
        first.insert("a".into(), json!(1));
        first.insert("b".into(), json!(2));
        let mut second = serde_json::Map::new();
        second.insert("b".into(), json!(2));
        second.insert("a".into(), json!(1));

        let ka = QueryKey::new("listJobs", &first).unwrap();
        let kb = QueryKey::new("listJobs", &second).unwrap();
        assert_eq!(ka, kb);
    }

    #[test]
    fn test_display_is_readable() {
        let key = QueryKey::new("job", &"42").unwrap();
        assert_eq!(key.to_string(), "job(\"42\")");
    }

    #[test]
    fn test_state_accessors() {
        let data = Arc::new(json!({"id": "1"}));

        let success = QueryState::Success {
            data: data.clone(),
            stale: false,
        };
        assert_eq!(success.data(), Some(&data));
        assert!(success.is_settled());
        assert!(!success.is_fetching());
        assert!(!success.is_stale());

        let refetching = QueryState::Refetching {
            previous: Some(data.clone()),
        };
        assert_eq!(refetching.data(), Some(&data));
        assert!(refetching.is_fetching());
        assert!(!refetching.is_settled());

        let loading = QueryState::Loading;
        assert!(loading.is_loading());
        assert!(loading.data().is_none());

        let error = QueryState::Error {
            error: ApiError::timeout(30),
            stale: true,
        };
        assert!(error.is_settled());
        assert!(error.is_stale());
        assert_eq!(error.error(), Some(&ApiError::timeout(30)));
    }
}
