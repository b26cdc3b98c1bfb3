//! Route authorization decisions.
//!
//! Gates are pure functions over the current [`SessionState`]: the view
//! layer calls them on every navigation and acts on the returned
//! [`RouteDecision`]. While the boot probe is unresolved the gates return
//! [`RouteDecision::Undecided`] so guarded routes render nothing instead of
//! bouncing a user whose cookie is about to be verified.

use staffroom_core::records::CurrentUser;
use staffroom_core::role::Role;
use tracing::debug;

use crate::session::{SessionState, SessionStore};

// ============================================================================
// Route Decision
// ============================================================================

/// Outcome of evaluating a gate against the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the guarded route.
    Allow,
    /// Session still pending; render nothing and re-evaluate later.
    Undecided,
    /// Not signed in; send the user to the login screen.
    RedirectToLogin,
    /// Signed in but not permitted; send the user to their home screen.
    RedirectToHome,
}

impl RouteDecision {
    /// Navigation target for redirect decisions, `None` otherwise.
    #[must_use]
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            RouteDecision::RedirectToLogin => Some("/login"),
            RouteDecision::RedirectToHome => Some("/"),
            RouteDecision::Allow | RouteDecision::Undecided => None,
        }
    }

    /// True when the guarded route may render.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, RouteDecision::Allow)
    }
}

// ============================================================================
// Gates
// ============================================================================

/// Gate for routes that only require a signed-in user.
#[must_use]
pub fn require_authenticated(session: &SessionStore) -> RouteDecision {
    match session.state() {
        SessionState::Pending => RouteDecision::Undecided,
        SessionState::Anonymous => RouteDecision::RedirectToLogin,
        SessionState::Authenticated(_) => RouteDecision::Allow,
    }
}

/// Gate for routes restricted to specific roles.
///
/// A signed-in user whose role is absent or outside `allowed` is redirected
/// home rather than to login: they have a session, just not this screen.
#[must_use]
pub fn require_role(session: &SessionStore, allowed: &[Role]) -> RouteDecision {
    match session.state() {
        SessionState::Pending => RouteDecision::Undecided,
        SessionState::Anonymous => RouteDecision::RedirectToLogin,
        SessionState::Authenticated(user) => {
            if can_access(Some(&user), allowed) {
                RouteDecision::Allow
            } else {
                debug!(
                    user_id = %user.id,
                    role = user.role.map(|r| r.as_str()).unwrap_or("none"),
                    required = ?allowed,
                    "role gate denied"
                );
                RouteDecision::RedirectToHome
            }
        }
    }
}

/// Whether `user` holds one of the `allowed` roles.
///
/// A missing user or a user without a parsed role never passes.
#[must_use]
pub fn can_access(user: Option<&CurrentUser>, allowed: &[Role]) -> bool {
    match user.and_then(|u| u.role) {
        Some(role) => allowed.iter().any(|r| *r == role),
        None => false,
    }
}
