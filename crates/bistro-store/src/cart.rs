//! # Cart Store
//!
//! The active user's in-progress selection, with strict per-user isolation.
//!
//! ## Scoping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Scoping                                       │
//! │                                                                         │
//! │  every operation:                                                       │
//! │    1. resolve current username from the session handle                  │
//! │         └── none? warn + no-op (the cart is never "anonymous")          │
//! │    2. load that user's lines from persistence                           │
//! │    3. mutate / read                                                     │
//! │    4. persist (mutations only)                                          │
//! │                                                                         │
//! │  Lines are re-loaded on every call, so a login switch between calls     │
//! │  always lands on the correct user's cart. Costs one storage read per    │
//! │  operation; correctness over micro-optimization.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pricing
//! Cart lines carry no prices. Totals are computed against the *current*
//! catalog on every call; prices freeze only when a bill is created.

use std::sync::Arc;

use tracing::{debug, warn};

use bistro_core::validation::validate_quantity;
use bistro_core::{CartLine, CoreError, Money, MAX_CART_LINES, MAX_ITEM_QUANTITY};

use crate::catalog::Catalog;
use crate::kv::{KvStore, KvStoreExt, StoreKey};
use crate::session::Session;

// =============================================================================
// Cart Store
// =============================================================================

/// Per-user cart over key-value persistence.
///
/// Cheap to clone: all fields are shared handles.
#[derive(Clone)]
pub struct CartStore {
    kv: Arc<dyn KvStore>,
    catalog: Arc<dyn Catalog>,
    session: Session,
}

impl CartStore {
    /// Creates a store over the given backend, catalog and session handle.
    pub fn new(kv: Arc<dyn KvStore>, catalog: Arc<dyn Catalog>, session: Session) -> Self {
        CartStore {
            kv,
            catalog,
            session,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds `quantity` of a food item to the active cart.
    ///
    /// An existing line for the item has its quantity incremented; otherwise
    /// a new line is appended. Unknown catalog ids and missing sessions are
    /// warning no-ops.
    pub fn add_to_cart(&self, food_item_id: i64, quantity: i64) -> bool {
        let Some(username) = self.scope("add_to_cart") else {
            return false;
        };

        if let Err(err) = validate_quantity(quantity) {
            warn!(food_id = food_item_id, error = %err, "add_to_cart rejected");
            return false;
        }

        if self.catalog.food_by_id(food_item_id).is_none() {
            warn!(error = %CoreError::FoodNotFound(food_item_id), "add_to_cart rejected");
            return false;
        }

        let mut lines = self.load_lines(&username);

        if let Some(line) = lines.iter_mut().find(|l| l.food_item_id == food_item_id) {
            let combined = line.quantity.saturating_add(quantity);
            if combined > MAX_ITEM_QUANTITY {
                warn!(
                    food_id = food_item_id,
                    requested = combined,
                    max = MAX_ITEM_QUANTITY,
                    "add_to_cart: quantity cap reached"
                );
                return false;
            }
            line.quantity = combined;
        } else {
            if lines.len() >= MAX_CART_LINES {
                warn!(max = MAX_CART_LINES, "add_to_cart: cart is full");
                return false;
            }
            lines.push(CartLine::new(food_item_id, quantity));
        }

        debug!(username = %username, food_id = food_item_id, quantity, "Added to cart");
        self.save_lines(&username, &lines)
    }

    /// Removes the line for a food item. Idempotent: removing an absent line
    /// leaves the cart unchanged and succeeds.
    pub fn remove_from_cart(&self, food_item_id: i64) -> bool {
        let Some(username) = self.scope("remove_from_cart") else {
            return false;
        };

        let mut lines = self.load_lines(&username);
        let before = lines.len();
        lines.retain(|l| l.food_item_id != food_item_id);

        if lines.len() == before {
            return true; // nothing to do
        }

        debug!(username = %username, food_id = food_item_id, "Removed from cart");
        self.save_lines(&username, &lines)
    }

    /// Sets a line's quantity directly (not additive).
    ///
    /// A quantity of zero or less removes the line; a quantity for a line
    /// that does not exist is a warning no-op.
    pub fn update_quantity(&self, food_item_id: i64, new_quantity: i64) -> bool {
        if new_quantity <= 0 {
            return self.remove_from_cart(food_item_id);
        }

        let Some(username) = self.scope("update_quantity") else {
            return false;
        };

        if let Err(err) = validate_quantity(new_quantity) {
            warn!(food_id = food_item_id, error = %err, "update_quantity rejected");
            return false;
        }

        let mut lines = self.load_lines(&username);
        let Some(line) = lines.iter_mut().find(|l| l.food_item_id == food_item_id) else {
            warn!(food_id = food_item_id, "update_quantity: no such line");
            return false;
        };

        line.quantity = new_quantity;
        debug!(username = %username, food_id = food_item_id, new_quantity, "Quantity updated");
        self.save_lines(&username, &lines)
    }

    /// Empties the active user's cart. Used after a successful checkout.
    pub fn clear_cart(&self) -> bool {
        let Some(username) = self.scope("clear_cart") else {
            return false;
        };

        match self.kv.remove(&StoreKey::cart(&username)) {
            Ok(()) => {
                debug!(username = %username, "Cart cleared");
                true
            }
            Err(err) => {
                warn!(error = %err, "clear_cart: persist failed");
                false
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Snapshot copy of the active user's lines; safe for the caller to hold
    /// across further mutations.
    pub fn cart_lines(&self) -> Vec<CartLine> {
        let Some(username) = self.scope("cart_lines") else {
            return Vec::new();
        };
        self.load_lines(&username)
    }

    /// Sum of all line quantities (not the number of distinct lines).
    pub fn item_count(&self) -> i64 {
        self.cart_lines().iter().map(|l| l.quantity).sum()
    }

    /// Cart total at *current* catalog prices.
    ///
    /// Lines whose item has left the menu contribute nothing (with a
    /// warning); they still show in `cart_lines` so the UI can surface them.
    pub fn total_price(&self) -> Money {
        self.cart_lines()
            .iter()
            .filter_map(|line| match self.catalog.food_by_id(line.food_item_id) {
                Some(food) => Some(line.line_total(food.price)),
                None => {
                    warn!(food_id = line.food_item_id, "total_price: item left the menu");
                    None
                }
            })
            .sum()
    }

    /// The line for a food item, if present.
    pub fn line(&self, food_item_id: i64) -> Option<CartLine> {
        self.cart_lines()
            .into_iter()
            .find(|l| l.food_item_id == food_item_id)
    }

    /// Whether the active cart has a line for the item.
    pub fn contains(&self, food_item_id: i64) -> bool {
        self.line(food_item_id).is_some()
    }

    // =========================================================================
    // Persistence Helpers
    // =========================================================================

    /// Resolves the current scope, warning when nobody is logged in.
    fn scope(&self, op: &str) -> Option<String> {
        match self.session.current_username() {
            Some(username) => Some(username),
            None => {
                warn!(operation = op, "No active session; cart operation ignored");
                None
            }
        }
    }

    fn load_lines(&self, username: &str) -> Vec<CartLine> {
        match self.kv.get(&StoreKey::cart(username)) {
            Ok(lines) => lines.unwrap_or_default(),
            Err(err) => {
                warn!(username = %username, error = %err, "Cart unreadable; treating as empty");
                Vec::new()
            }
        }
    }

    fn save_lines(&self, username: &str, lines: &[CartLine]) -> bool {
        match self.kv.put(&StoreKey::cart(username), &lines) {
            Ok(()) => true,
            Err(err) => {
                warn!(username = %username, error = %err, "Cart persist failed");
                false
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
