//! # Bill Store
//!
//! Converts priced cart snapshots into durable order records, tracks the
//! status lifecycle, and serves historical queries.
//!
//! ## Bill Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Bill Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create_bill() → Bill { status: Pending }                       │
//! │         • per-user sequential id from a persisted counter              │
//! │         • catalog name/price frozen into BillItems                     │
//! │         • total stored once, never recomputed                          │
//! │                                                                         │
//! │  2. PROGRESS                                                           │
//! │     └── update_bill_status() → forward moves only                      │
//! │     └── cancel_bill()       → only while Pending                       │
//! │                                                                         │
//! │  3. AUTO-DELIVERY CHECKPOINT                                           │
//! │     └── every query refreshes: active bills past 45 minutes are        │
//! │         promoted to Delivered and persisted before results return      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Id Monotonicity
//! The per-user counter only ever increments and survives bill clearing, so
//! ids are strictly increasing and never reused even after a debug wipe.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use bistro_core::{Bill, BillItem, BillStatus, CartLine, CoreError, Money};

use crate::catalog::Catalog;
use crate::kv::{KvStore, KvStoreExt, StoreKey};
use crate::session::Session;
use crate::user::UserStore;

// =============================================================================
// Bill Store
// =============================================================================

/// Order records over key-value persistence.
///
/// Cheap to clone: all fields are shared handles.
#[derive(Clone)]
pub struct BillStore {
    kv: Arc<dyn KvStore>,
    catalog: Arc<dyn Catalog>,
    session: Session,
    users: UserStore,
}

impl BillStore {
    /// Creates a store over the given backend, catalog, session handle and
    /// user registry (needed for cross-user aggregates).
    pub fn new(
        kv: Arc<dyn KvStore>,
        catalog: Arc<dyn Catalog>,
        session: Session,
        users: UserStore,
    ) -> Self {
        BillStore {
            kv,
            catalog,
            session,
            users,
        }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Materializes a bill from a priced cart snapshot.
    ///
    /// Requires an active session and a non-empty snapshot. Each line's
    /// current catalog name and price are frozen into the bill; lines whose
    /// item has left the menu are skipped with a warning. `total` is stored
    /// as passed (the caller may have folded in a delivery fee) and is never
    /// recomputed.
    #[allow(clippy::too_many_arguments)]
    pub fn create_bill(
        &self,
        customer_username: &str,
        cart_lines: &[CartLine],
        total: Money,
        delivery_address: &str,
        phone: &str,
        full_name: &str,
        notes: Option<String>,
    ) -> Option<Bill> {
        if self.scope("create_bill").is_none() {
            return None;
        }

        if cart_lines.is_empty() {
            warn!(username = %customer_username, error = %CoreError::EmptyCart, "create_bill rejected");
            return None;
        }

        let items: Vec<BillItem> = cart_lines
            .iter()
            .filter_map(|line| match self.catalog.food_by_id(line.food_item_id) {
                Some(food) => Some(BillItem {
                    food_id: food.id,
                    food_name: food.name,
                    unit_price: food.price,
                    quantity: line.quantity,
                }),
                None => {
                    warn!(food_id = line.food_item_id, "create_bill: item left the menu");
                    None
                }
            })
            .collect();

        if items.is_empty() {
            warn!(username = %customer_username, "create_bill: no line survived snapshotting");
            return None;
        }

        let bill_id = self.next_bill_id(customer_username)?;
        let now = Utc::now();
        let bill = Bill {
            bill_id,
            owner_username: customer_username.to_string(),
            items,
            total,
            delivery_address: delivery_address.to_string(),
            phone: phone.to_string(),
            full_name: full_name.to_string(),
            order_date: now,
            last_updated: now,
            status: BillStatus::Pending,
            notes,
        };

        let mut bills = self.load_bills(customer_username);
        bills.push(bill.clone());
        if !self.save_bills(customer_username, &bills) {
            return None;
        }

        info!(
            username = %customer_username,
            bill_id,
            total = %total,
            items = bill.items.len(),
            "Bill created"
        );
        Some(bill)
    }

    // =========================================================================
    // Queries (all pass the auto-delivery checkpoint)
    // =========================================================================

    /// The logged-in user's bills, oldest first.
    pub fn bills_for_current_user(&self) -> Vec<Bill> {
        let Some(username) = self.scope("bills_for_current_user") else {
            return Vec::new();
        };
        self.refreshed(&username)
    }

    /// One bill by id, scoped to the logged-in user.
    pub fn bill_by_id(&self, bill_id: i64) -> Option<Bill> {
        let username = self.scope("bill_by_id")?;
        self.refreshed(&username)
            .into_iter()
            .find(|b| b.bill_id == bill_id)
    }

    /// Any user's bills. Not session-scoped: this is the owner dashboard's
    /// view into any customer's history.
    pub fn bills_by_username(&self, username: &str) -> Vec<Bill> {
        self.refreshed(username)
    }

    /// Any user's bills filtered by status.
    pub fn bills_by_username_and_status(&self, username: &str, status: BillStatus) -> Vec<Bill> {
        self.refreshed(username)
            .into_iter()
            .filter(|b| b.status == status)
            .collect()
    }

    /// Every user's bills concatenated, in registry order. Feeds the owner
    /// revenue dashboard.
    pub fn all_bills_from_all_users(&self) -> Vec<Bill> {
        self.users
            .usernames()
            .iter()
            .flat_map(|username| self.refreshed(username))
            .collect()
    }

    // =========================================================================
    // Status Mutation
    // =========================================================================

    /// Moves a bill (in the logged-in user's scope) to a new status.
    ///
    /// The state machine in `BillStatus` is authoritative: backward moves,
    /// departures from terminal states and late cancellations are warning
    /// no-ops. A legal move refreshes `last_updated`.
    pub fn update_bill_status(&self, bill_id: i64, new_status: BillStatus) -> bool {
        let Some(username) = self.scope("update_bill_status") else {
            return false;
        };

        // Checkpoint first: a bill past the threshold is already Delivered,
        // whatever the stored status says.
        let mut bills = self.load_bills(&username);
        let now = Utc::now();
        for bill in bills.iter_mut() {
            bill.apply_auto_delivery(now);
        }

        let Some(bill) = bills.iter_mut().find(|b| b.bill_id == bill_id) else {
            warn!(
                username = %username,
                error = %CoreError::BillNotFound(bill_id),
                "update_bill_status rejected"
            );
            return false;
        };

        if !bill.status.can_transition_to(new_status) {
            warn!(
                username = %username,
                bill_id,
                error = %CoreError::InvalidStatusTransition {
                    from: bill.status,
                    to: new_status,
                },
                "update_bill_status rejected"
            );
            return false;
        }

        bill.status = new_status;
        bill.last_updated = now;
        debug!(username = %username, bill_id, status = ?new_status, "Bill status updated");
        self.save_bills(&username, &bills)
    }

    /// Cancels a bill. Only legal while it is still `Pending`.
    pub fn cancel_bill(&self, bill_id: i64) -> bool {
        self.update_bill_status(bill_id, BillStatus::Cancelled)
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    /// Number of bills the logged-in user has placed.
    pub fn total_order_count(&self) -> usize {
        self.bills_for_current_user().len()
    }

    /// Sum of the logged-in user's stored bill totals.
    pub fn total_spending(&self) -> Money {
        self.bills_for_current_user().iter().map(|b| b.total).sum()
    }

    /// Number of bills a given user has placed (owner views).
    pub fn bill_count_by_username(&self, username: &str) -> usize {
        self.bills_by_username(username).len()
    }

    /// Sum of a given user's stored bill totals (owner views).
    pub fn total_spent_by_username(&self, username: &str) -> Money {
        self.bills_by_username(username).iter().map(|b| b.total).sum()
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Debug-scope bulk wipe of one user's bill list.
    ///
    /// The id counter is deliberately untouched: ids stay monotonic across a
    /// wipe and are never reused.
    pub fn clear_bills_for(&self, username: &str) -> bool {
        match self.kv.remove(&StoreKey::bills(username)) {
            Ok(()) => {
                info!(username = %username, "Bills cleared (debug)");
                true
            }
            Err(err) => {
                warn!(username = %username, error = %err, "clear_bills_for failed");
                false
            }
        }
    }

    // =========================================================================
    // Persistence Helpers
    // =========================================================================

    fn scope(&self, op: &str) -> Option<String> {
        match self.session.current_username() {
            Some(username) => Some(username),
            None => {
                warn!(operation = op, "No active session; bill operation ignored");
                None
            }
        }
    }

    /// Reserves the next sequential id for a user. The counter is persisted
    /// before the bill, so a failure later burns the id rather than risking
    /// a reuse.
    fn next_bill_id(&self, username: &str) -> Option<i64> {
        let current: i64 = match self.kv.get(&StoreKey::bill_counter(username)) {
            Ok(counter) => counter.unwrap_or(0),
            Err(err) => {
                warn!(username = %username, error = %err, "Bill counter unreadable");
                return None;
            }
        };

        let next = current + 1;
        if let Err(err) = self.kv.put(&StoreKey::bill_counter(username), &next) {
            warn!(username = %username, error = %err, "Bill counter persist failed");
            return None;
        }
        Some(next)
    }

    fn load_bills(&self, username: &str) -> Vec<Bill> {
        match self.kv.get(&StoreKey::bills(username)) {
            Ok(bills) => bills.unwrap_or_default(),
            Err(err) => {
                warn!(username = %username, error = %err, "Bills unreadable; treating as empty");
                Vec::new()
            }
        }
    }

    fn save_bills(&self, username: &str, bills: &[Bill]) -> bool {
        match self.kv.put(&StoreKey::bills(username), &bills) {
            Ok(()) => true,
            Err(err) => {
                warn!(username = %username, error = %err, "Bills persist failed");
                false
            }
        }
    }

    /// Loads a user's bills and applies the auto-delivery checkpoint,
    /// persisting any promotions before returning.
    fn refreshed(&self, username: &str) -> Vec<Bill> {
        let mut bills = self.load_bills(username);
        let now = Utc::now();
        let mut changed = false;
        for bill in bills.iter_mut() {
            if bill.apply_auto_delivery(now) {
                debug!(username = %username, bill_id = bill.bill_id, "Auto-delivered");
                changed = true;
            }
        }
        if changed && !self.save_bills(username, &bills) {
            warn!(username = %username, "Auto-delivery promotions not persisted");
        }
        bills
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::kv::MemoryKvStore;
    use bistro_core::FoodItem;
    use chrono::Duration;

    struct Fixture {
        kv: Arc<MemoryKvStore>,
        session: Session,
        bills: BillStore,
    }

    fn fixture() -> Fixture {
        let kv = Arc::new(MemoryKvStore::new());
        let session = Session::new();
        let catalog = Arc::new(StaticCatalog::with_items([
            FoodItem {
                id: 1,
                name: "Beef Pho".to_string(),
                price: Money::from_units(85_000),
                category: "noodles".to_string(),
                image_ref: None,
            },
            FoodItem {
                id: 3,
                name: "Spring Rolls".to_string(),
                price: Money::from_units(75_000),
                category: "starters".to_string(),
                image_ref: None,
            },
        ]));
        let users = UserStore::new(kv.clone(), session.clone());
        let bills = BillStore::new(kv.clone(), catalog, session.clone(), users);
        Fixture { kv, session, bills }
    }

    fn place(f: &Fixture, lines: &[CartLine]) -> Option<Bill> {
        f.bills.create_bill(
            "alice",
            lines,
            Money::from_units(260_000),
            "12 Hang Bong",
            "0912345678",
            "Alice",
            None,
        )
    }

    #[test]
    fn test_create_requires_session_and_lines() {
        let f = fixture();
        let lines = vec![CartLine::new(1, 2)];

        assert!(place(&f, &lines).is_none()); // not logged in

        f.session.establish("alice");
        assert!(place(&f, &[]).is_none()); // empty snapshot
        assert!(place(&f, &lines).is_some());
    }

    #[test]
    fn test_create_snapshots_catalog() {
        let f = fixture();
        f.session.establish("alice");

        let bill = place(&f, &[CartLine::new(1, 2), CartLine::new(3, 1)]).unwrap();
        assert_eq!(bill.bill_id, 1);
        assert_eq!(bill.status, BillStatus::Pending);
        assert_eq!(bill.items.len(), 2);
        assert_eq!(bill.items[0].food_name, "Beef Pho");
        assert_eq!(bill.items[0].unit_price.units(), 85_000);
        assert_eq!(bill.items_total().units(), 245_000);
        assert_eq!(bill.total.units(), 260_000); // as passed, incl. fee
    }

    #[test]
    fn test_unknown_items_are_skipped() {
        let f = fixture();
        f.session.establish("alice");

        let bill = place(&f, &[CartLine::new(1, 1), CartLine::new(99, 4)]).unwrap();
        assert_eq!(bill.items.len(), 1);

        // All lines unknown → no bill
        assert!(place(&f, &[CartLine::new(99, 1)]).is_none());
    }

    #[test]
    fn test_ids_monotonic_across_clear() {
        let f = fixture();
        f.session.establish("alice");
        let lines = vec![CartLine::new(1, 1)];

        assert_eq!(place(&f, &lines).unwrap().bill_id, 1);
        assert_eq!(place(&f, &lines).unwrap().bill_id, 2);

        assert!(f.bills.clear_bills_for("alice"));
        assert!(f.bills.bills_for_current_user().is_empty());

        // Counter survives the wipe
        assert_eq!(place(&f, &lines).unwrap().bill_id, 3);
    }

    #[test]
    fn test_status_progression_and_guards() {
        let f = fixture();
        f.session.establish("alice");
        let bill = place(&f, &[CartLine::new(1, 1)]).unwrap();

        assert!(f.bills.update_bill_status(bill.bill_id, BillStatus::Confirmed));
        assert!(f.bills.update_bill_status(bill.bill_id, BillStatus::Preparing));

        // Backwards and late cancellation are refused
        assert!(!f.bills.update_bill_status(bill.bill_id, BillStatus::Confirmed));
        assert!(!f.bills.cancel_bill(bill.bill_id));

        let stored = f.bills.bill_by_id(bill.bill_id).unwrap();
        assert_eq!(stored.status, BillStatus::Preparing);
        assert!(stored.last_updated > bill.last_updated);
    }

    #[test]
    fn test_cancel_while_pending() {
        let f = fixture();
        f.session.establish("alice");
        let bill = place(&f, &[CartLine::new(1, 1)]).unwrap();

        assert!(bill.can_cancel());
        assert!(f.bills.cancel_bill(bill.bill_id));
        assert_eq!(
            f.bills.bill_by_id(bill.bill_id).unwrap().status,
            BillStatus::Cancelled
        );

        // Unknown id is a warning no-op
        assert!(!f.bills.update_bill_status(999, BillStatus::Confirmed));
    }

    #[test]
    fn test_query_checkpoint_promotes_overdue_bills() {
        let f = fixture();
        f.session.establish("alice");
        let bill = place(&f, &[CartLine::new(1, 1)]).unwrap();

        // Backdate the stored order past the threshold
        let key = StoreKey::bills("alice");
        let mut stored: Vec<Bill> = f.kv.get(&key).unwrap().unwrap();
        stored[0].order_date = Utc::now() - Duration::minutes(46);
        f.kv.put(&key, &stored).unwrap();

        let listed = f.bills.bills_for_current_user();
        assert_eq!(listed[0].status, BillStatus::Delivered);
        assert!(listed[0].last_updated > bill.last_updated);

        // The promotion was persisted, not just reported
        let persisted: Vec<Bill> = f.kv.get(&key).unwrap().unwrap();
        assert_eq!(persisted[0].status, BillStatus::Delivered);
    }

    #[test]
    fn test_aggregates() {
        let f = fixture();
        f.session.establish("alice");
        place(&f, &[CartLine::new(1, 1)]).unwrap();
        place(&f, &[CartLine::new(3, 2)]).unwrap();

        assert_eq!(f.bills.total_order_count(), 2);
        assert_eq!(f.bills.total_spending().units(), 520_000);
        assert_eq!(f.bills.bill_count_by_username("alice"), 2);
        assert_eq!(f.bills.total_spent_by_username("alice").units(), 520_000);
        assert_eq!(f.bills.bill_count_by_username("nobody"), 0);
    }

    #[test]
    fn test_filter_by_status() {
        let f = fixture();
        f.session.establish("alice");
        let first = place(&f, &[CartLine::new(1, 1)]).unwrap();
        place(&f, &[CartLine::new(3, 1)]).unwrap();
        f.bills.update_bill_status(first.bill_id, BillStatus::Confirmed);

        let pending = f
            .bills
            .bills_by_username_and_status("alice", BillStatus::Pending);
        assert_eq!(pending.len(), 1);
        assert_ne!(pending[0].bill_id, first.bill_id);
    }
}
