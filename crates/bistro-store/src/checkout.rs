//! # Checkout
//!
//! The composite operation behind the "Place order" button.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Flow                                     │
//! │                                                                         │
//! │  current user ──► profile supplies delivery address / phone / name     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cart snapshot ──► priced at current catalog ──► + flat delivery fee   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BillStore.create_bill ──► success? ──► clear the cart                 │
//! │                                │                                        │
//! │                                └── failure? cart stays intact          │
//! │                                                                         │
//! │  Every step's result is checked explicitly; nothing throws across      │
//! │  this boundary.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{info, warn};

use bistro_core::{Bill, DELIVERY_FEE};

use crate::bill::BillStore;
use crate::cart::CartStore;
use crate::user::UserStore;

/// Places an order for the logged-in user from their current cart.
///
/// Delivery details come from the user's profile; the stored bill total is
/// the priced cart plus the flat [`DELIVERY_FEE`]. The cart is cleared only
/// after the bill persists, so a failed checkout loses nothing.
pub fn place_order(
    users: &UserStore,
    cart: &CartStore,
    bills: &BillStore,
    notes: Option<String>,
) -> Option<Bill> {
    let Some(user) = users.current_user() else {
        warn!("place_order without an active session; ignoring");
        return None;
    };

    let lines = cart.cart_lines();
    if lines.is_empty() {
        warn!(username = %user.username, "place_order: cart is empty");
        return None;
    }

    let total = cart.total_price() + DELIVERY_FEE;
    let bill = bills.create_bill(
        &user.username,
        &lines,
        total,
        &user.address,
        &user.phone,
        &user.full_name,
        notes,
    )?;

    if !cart.clear_cart() {
        // The order exists; a stale cart is recoverable by the user
        warn!(username = %user.username, "place_order: cart not cleared after checkout");
    }

    info!(username = %user.username, bill_id = bill.bill_id, total = %bill.total, "Order placed");
    Some(bill)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::kv::MemoryKvStore;
    use crate::session::Session;
    use crate::user::SignUpRequest;
    use bistro_core::{BillStatus, FoodItem, Money};
    use std::sync::Arc;

    fn services() -> (UserStore, CartStore, BillStore) {
        let kv: Arc<MemoryKvStore> = Arc::new(MemoryKvStore::new());
        let session = Session::new();
        let catalog = Arc::new(StaticCatalog::with_items([FoodItem {
            id: 1,
            name: "Beef Pho".to_string(),
            price: Money::from_units(85_000),
            category: "noodles".to_string(),
            image_ref: None,
        }]));
        let users = UserStore::new(kv.clone(), session.clone());
        let cart = CartStore::new(kv.clone(), catalog.clone(), session.clone());
        let bills = BillStore::new(kv, catalog, session, users.clone());
        (users, cart, bills)
    }

    fn sign_up_alice(users: &UserStore) {
        users
            .sign_up(SignUpRequest {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "secret1".to_string(),
                full_name: "Alice Nguyen".to_string(),
                phone: "0912345678".to_string(),
            })
            .unwrap();
        users.update_user_info("Alice Nguyen", "12 Hang Bong, Hanoi", "0912345678");
    }

    #[test]
    fn test_place_order_creates_bill_and_clears_cart() {
        let (users, cart, bills) = services();
        sign_up_alice(&users);
        cart.add_to_cart(1, 2);

        let bill = place_order(&users, &cart, &bills, Some("extra chili".to_string())).unwrap();

        assert_eq!(bill.status, BillStatus::Pending);
        assert_eq!(bill.total.units(), 170_000 + DELIVERY_FEE.units());
        assert_eq!(bill.delivery_address, "12 Hang Bong, Hanoi");
        assert_eq!(bill.notes.as_deref(), Some("extra chili"));
        assert!(cart.cart_lines().is_empty());
    }

    #[test]
    fn test_place_order_rejects_empty_cart() {
        let (users, cart, bills) = services();
        sign_up_alice(&users);

        assert!(place_order(&users, &cart, &bills, None).is_none());
        assert_eq!(bills.total_order_count(), 0);
    }

    #[test]
    fn test_place_order_requires_session() {
        let (users, cart, bills) = services();
        assert!(place_order(&users, &cart, &bills, None).is_none());
    }
}
