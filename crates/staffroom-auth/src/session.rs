//! Session state shared across the client.
//!
//! The session is a single atomic cell read on every navigation and every
//! request decoration. Writers are rare (boot, login, logout), readers are
//! hot, so the store keeps the current [`SessionState`] behind an
//! [`ArcSwap`] and hands out cheap `Arc` clones of the signed-in user.

use std::sync::Arc;

use arc_swap::ArcSwap;
use staffroom_core::records::CurrentUser;
use tracing::info;

// ============================================================================
// Session State
// ============================================================================

/// Canonical session status.
///
/// `Pending` is the boot-time state: the client has not yet learned whether
/// the session cookie (if any) is still valid, and route gates must hold
/// their decision rather than redirect.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// Boot probe has not resolved yet.
    #[default]
    Pending,
    /// No signed-in user.
    Anonymous,
    /// A verified user is signed in.
    Authenticated(Arc<CurrentUser>),
}

impl SessionState {
    /// Returns the signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&Arc<CurrentUser>> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// True once a verified user is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// True while the boot probe is still unresolved.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, SessionState::Pending)
    }

    fn status_label(&self) -> &'static str {
        match self {
            SessionState::Pending => "pending",
            SessionState::Anonymous => "anonymous",
            SessionState::Authenticated(_) => "authenticated",
        }
    }
}

// ============================================================================
// Session Store
// ============================================================================

/// Process-wide holder of the current [`SessionState`].
///
/// All reads are lock-free loads; all writes replace the whole state in one
/// atomic swap, so readers never observe a half-updated session.
pub struct SessionStore {
    state: ArcSwap<SessionState>,
}

impl SessionStore {
    /// Creates a store in the [`SessionState::Pending`] state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ArcSwap::from_pointee(SessionState::Pending),
        }
    }

    /// Installs a verified user as the current session.
    ///
    /// This is the only writer that can move the store into
    /// [`SessionState::Authenticated`]; every sign-in path (boot probe,
    /// login, signup) funnels through it.
    pub fn set_credentials(&self, user: CurrentUser) {
        info!(
            user_id = %user.id,
            role = user.role.map(|r| r.as_str()).unwrap_or("none"),
            "session established"
        );
        self.state
            .store(Arc::new(SessionState::Authenticated(Arc::new(user))));
    }

    /// Clears the session unconditionally.
    ///
    /// Synchronous: the store is [`SessionState::Anonymous`] before this
    /// returns, regardless of any network teardown still in flight.
    pub fn log_out(&self) {
        let previous = self.state.swap(Arc::new(SessionState::Anonymous));
        if previous.is_authenticated() {
            info!("session cleared");
        }
    }

    /// Current state, cloned out of the cell.
    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState::clone(&self.state.load())
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<Arc<CurrentUser>> {
        self.state.load().user().cloned()
    }

    /// True once a verified user is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.load().is_authenticated()
    }

    /// True while the boot probe is still unresolved.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.load().is_pending()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("status", &self.state.load().status_label())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role_json: &str) -> CurrentUser {
        serde_json::from_value(serde_json::json!({
            "id": "u-1",
            "email": "dana@school.example",
            "name": "Dana",
            "role": role_json,
        }))
        .unwrap()
    }

    #[test]
    fn test_store_starts_pending() {
        let store = SessionStore::new();
        assert!(store.is_pending());
        assert!(!store.is_authenticated());
        assert!(store.user().is_none());
    }

    #[test]
    fn test_set_credentials_exposes_user() {
        let store = SessionStore::new();
        store.set_credentials(sample_user("employer"));

        assert!(store.is_authenticated());
        assert!(!store.is_pending());
        let user = store.user().unwrap();
        assert_eq!(user.email, "dana@school.example");
        assert_eq!(store.state(), SessionState::Authenticated(user));
    }

    #[test]
    fn test_log_out_is_synchronous_and_unconditional() {
        let store = SessionStore::new();
        store.set_credentials(sample_user("employee"));
        store.log_out();

        assert!(!store.is_authenticated());
        assert!(store.user().is_none());
        assert_eq!(store.state(), SessionState::Anonymous);

        // Logging out of a pending or anonymous session settles it too.
        let fresh = SessionStore::new();
        fresh.log_out();
        assert_eq!(fresh.state(), SessionState::Anonymous);
    }

    #[test]
    fn test_authenticated_iff_user_present() {
        let store = SessionStore::new();
        assert_eq!(store.is_authenticated(), store.user().is_some());

        store.set_credentials(sample_user("admin"));
        assert_eq!(store.is_authenticated(), store.user().is_some());

        store.log_out();
        assert_eq!(store.is_authenticated(), store.user().is_some());
    }

    #[test]
    fn test_swap_replaces_user_wholesale() {
        let store = SessionStore::new();
        store.set_credentials(sample_user("employer"));
        let first = store.user().unwrap();

        store.set_credentials(sample_user("college"));
        let second = store.user().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.role, Some(staffroom_core::role::Role::Employer));
        assert_eq!(second.role, Some(staffroom_core::role::Role::College));
    }
}
