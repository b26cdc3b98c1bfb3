//! The endpoint catalog, grouped by screen area.
//!
//! Each group declares its endpoints as [`QueryDef`](crate::QueryDef) /
//! [`MutationDef`](crate::MutationDef) values and binds them at startup;
//! builders are pure functions from the argument to a
//! [`RequestSpec`](staffroom_core::RequestSpec), so they are trivially
//! testable without a server.

pub mod applications;
pub mod auth;
pub mod content;
pub mod jobs;
pub mod notifications;
pub mod pipeline;
pub mod profile;

use serde::Serialize;
use serde_json::Value;

/// Serialize a request payload. Payloads are plain data structs, so this
/// cannot fail for any value the catalog constructs.
pub(crate) fn json_body<T: Serialize>(payload: &T) -> Value {
    serde_json::to_value(payload).expect("request payload serializes to JSON")
}
