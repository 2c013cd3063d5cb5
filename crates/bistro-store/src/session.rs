//! # Session Handle
//!
//! Tracks who is currently logged in.
//!
//! ## Design
//! The original system kept session flags as ambient global state read
//! implicitly by every store method. Here the session is an explicit handle
//! constructed once and injected into each store; cart and bill operations
//! re-resolve their scope from it on every call, so a user switch between
//! calls always lands on the correct user's data.
//!
//! ## Thread Safety
//! The handle is `Arc<Mutex<...>>`:
//! 1. All three stores share the same session
//! 2. A login/logout must not interleave with a scope read
//! 3. Store operations hold the lock only long enough to copy the scope
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   startup ──► restore snapshot from KV ──► validate against registry   │
//! │                    │                             │                      │
//! │                    │                     unknown username?              │
//! │                    ▼                             ▼                      │
//! │               logged in                    degrade to logged out        │
//! │                                                                         │
//! │   login / sign-up ──► establish(username) ──► snapshot persisted       │
//! │   logout          ──► clear()             ──► snapshot persisted       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

// =============================================================================
// Session Snapshot
// =============================================================================

/// The persisted form of the session: two flat fields, exactly what the
/// stores need to reconstruct scope at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Whether anyone is logged in.
    pub logged_in: bool,

    /// The active username; empty when logged out.
    pub current_username: String,
}

// =============================================================================
// Session Handle
// =============================================================================

/// Shared, mutex-guarded session state.
///
/// ## Invariant
/// When `is_logged_in()` is true, `current_username()` names a user that
/// exists in the registry. Login paths only establish sessions for users
/// they just loaded or created, and startup restore validates against the
/// registry before accepting a persisted snapshot.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<Mutex<SessionSnapshot>>,
}

impl Session {
    /// Creates a logged-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session pre-populated from a validated snapshot.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        Session {
            inner: Arc::new(Mutex::new(snapshot)),
        }
    }

    /// Marks `username` as the active user.
    pub fn establish(&self, username: &str) {
        let mut inner = self.inner.lock().expect("session mutex poisoned");
        inner.logged_in = true;
        inner.current_username = username.to_string();
    }

    /// Clears the session flags. Deletes no data.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("session mutex poisoned");
        *inner = SessionSnapshot::default();
    }

    /// Whether anyone is logged in.
    pub fn is_logged_in(&self) -> bool {
        self.inner.lock().expect("session mutex poisoned").logged_in
    }

    /// The active username, or `None` when logged out.
    pub fn current_username(&self) -> Option<String> {
        let inner = self.inner.lock().expect("session mutex poisoned");
        if inner.logged_in {
            Some(inner.current_username.clone())
        } else {
            None
        }
    }

    /// Copies the current state for persistence.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().expect("session mutex poisoned").clone()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_logged_out() {
        let session = Session::new();
        assert!(!session.is_logged_in());
        assert_eq!(session.current_username(), None);
    }

    #[test]
    fn test_establish_and_clear() {
        let session = Session::new();

        session.establish("alice");
        assert!(session.is_logged_in());
        assert_eq!(session.current_username(), Some("alice".to_string()));

        session.clear();
        assert!(!session.is_logged_in());
        assert_eq!(session.current_username(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let session = Session::new();
        let handle = session.clone();

        session.establish("bob");
        assert_eq!(handle.current_username(), Some("bob".to_string()));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let session = Session::new();
        session.establish("alice");

        let restored = Session::from_snapshot(session.snapshot());
        assert!(restored.is_logged_in());
        assert_eq!(restored.current_username(), Some("alice".to_string()));
    }
}
