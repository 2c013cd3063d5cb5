//! # Store Bundle
//!
//! Builds the three stores over shared handles, once, at application start.
//!
//! ## Construction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Stores::open(kv, catalog)                           │
//! │                                                                         │
//! │  1. read persisted session snapshot                                    │
//! │  2. validate it against the user registry                              │
//! │       └── unknown username? degrade to logged out (and persist that)   │
//! │  3. build Session handle, share it into UserStore/CartStore/BillStore  │
//! │                                                                         │
//! │  Explicit dependency injection: no singletons, no lazy statics, and    │
//! │  tests get a fresh world from every open().                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::warn;

use bistro_core::Bill;

use crate::bill::BillStore;
use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::checkout;
use crate::kv::{KvStore, KvStoreExt, StoreKey};
use crate::session::{Session, SessionSnapshot};
use crate::user::UserStore;

// =============================================================================
// Stores
// =============================================================================

/// The wired-up state layer: one session, three stores, one backend.
#[derive(Clone)]
pub struct Stores {
    session: Session,
    users: UserStore,
    cart: CartStore,
    bills: BillStore,
}

impl Stores {
    /// Opens the state layer over a backend and a catalog.
    ///
    /// Restores the persisted session, validating that the remembered
    /// username still exists; a dangling session (registry cleared since the
    /// last run) degrades to logged-out instead of resurrecting a ghost.
    pub fn open(kv: Arc<dyn KvStore>, catalog: Arc<dyn Catalog>) -> Self {
        let snapshot = Self::restore_snapshot(&kv);
        let session = Session::from_snapshot(snapshot);

        let users = UserStore::new(kv.clone(), session.clone());
        let cart = CartStore::new(kv.clone(), catalog.clone(), session.clone());
        let bills = BillStore::new(kv, catalog, session.clone(), users.clone());

        Stores {
            session,
            users,
            cart,
            bills,
        }
    }

    fn restore_snapshot(kv: &Arc<dyn KvStore>) -> SessionSnapshot {
        let snapshot: SessionSnapshot = match kv.get(&StoreKey::Session) {
            Ok(snapshot) => snapshot.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "Session snapshot unreadable; starting logged out");
                return SessionSnapshot::default();
            }
        };

        if !snapshot.logged_in {
            return SessionSnapshot::default();
        }

        let registry_has_user = match kv.get::<std::collections::BTreeMap<String, serde_json::Value>>(
            &StoreKey::Users,
        ) {
            Ok(registry) => registry
                .map(|r| r.contains_key(&snapshot.current_username))
                .unwrap_or(false),
            Err(err) => {
                warn!(error = %err, "User registry unreadable during session restore");
                false
            }
        };

        if !registry_has_user {
            warn!(
                username = %snapshot.current_username,
                "Persisted session names an unknown user; degrading to logged out"
            );
            let degraded = SessionSnapshot::default();
            if let Err(err) = kv.put(&StoreKey::Session, &degraded) {
                warn!(error = %err, "Could not persist degraded session");
            }
            return degraded;
        }

        snapshot
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The shared session handle.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Identity and profile operations.
    pub fn users(&self) -> &UserStore {
        &self.users
    }

    /// The active user's cart.
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Order records and history.
    pub fn bills(&self) -> &BillStore {
        &self.bills
    }

    /// Checkout composite over the bundled stores.
    pub fn place_order(&self, notes: Option<String>) -> Option<Bill> {
        checkout::place_order(&self.users, &self.cart, &self.bills, notes)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
