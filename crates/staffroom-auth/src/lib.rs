//! Session and authorization layer for the Staffroom client.
//!
//! Holds the single source of truth for "who is signed in" and the pure
//! gate functions the view layer consults before rendering guarded routes.

pub mod gate;
pub mod session;

pub use gate::{can_access, require_authenticated, require_role, RouteDecision};
pub use session::{SessionState, SessionStore};
