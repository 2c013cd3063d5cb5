//! # Domain Types
//!
//! Core domain types used throughout Bistro.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │    CartLine     │   │      Bill       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  username (key) │   │  food_item_id   │   │  bill_id        │       │
//! │  │  password_hash  │   │  quantity       │   │  owner_username │       │
//! │  │  role           │   │  (no price!)    │   │  items (frozen) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    FoodItem     │   │    BillItem     │   │   BillStatus    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, name       │   │  price snapshot │   │  Pending → ...  │       │
//! │  │  price, category│   │  at order time  │   │  → Delivered    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Price Flow
//! A `CartLine` deliberately carries **no price**: line totals are computed
//! against the live catalog. A `BillItem` carries a **frozen price**: the
//! catalog value is snapshotted exactly once at checkout and never touched
//! again, so historical bills survive menu price changes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::{ADDRESS_NOT_SET, AUTO_DELIVER_AFTER_MINS};

// =============================================================================
// Role
// =============================================================================

/// Account role. Owners get access to cross-customer order views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular customer placing orders.
    Customer,
    /// Restaurant owner managing incoming orders.
    Owner,
}

impl Default for Role {
    fn default() -> Self {
        Role::Customer
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered account.
///
/// `username` is the registry key and is immutable after creation, as are
/// `email` and `password_hash` in this core. Profile updates may touch only
/// `full_name`, `address` and `phone`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique, case-sensitive account key.
    pub username: String,

    /// Contact email. Compared case-insensitively for duplicate detection.
    pub email: String,

    /// One-way password hash (PHC string). Plaintext is never stored.
    pub password_hash: String,

    /// Display name.
    pub full_name: String,

    /// Delivery address; starts as the `ADDRESS_NOT_SET` sentinel.
    pub address: String,

    /// Contact phone number.
    pub phone: String,

    /// When the account was created. Set once.
    pub created_at: DateTime<Utc>,

    /// Carried for forward compatibility; no business logic reads it.
    pub verified: bool,

    /// Account role.
    pub role: Role,
}

impl User {
    /// True until the customer replaces the address placeholder.
    pub fn has_address(&self) -> bool {
        self.address != ADDRESS_NOT_SET && !self.address.trim().is_empty()
    }
}

// =============================================================================
// Food Item (catalog record)
// =============================================================================

/// A menu item supplied by the catalog collaborator.
///
/// The stores treat the catalog as a read-only lookup keyed by `id`; prices
/// are re-queried on every cart computation and snapshotted into bills only
/// at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    /// Catalog identifier.
    pub id: i64,

    /// Display name shown in menus and on bills.
    pub name: String,

    /// Current menu price.
    pub price: Money,

    /// Menu category ("noodles", "drinks", ...).
    pub category: String,

    /// Optional reference to an image asset. Opaque to this core.
    pub image_ref: Option<String>,
}

// =============================================================================
// Cart Line
// =============================================================================

/// One row of a user's active cart: a food item and how many of it.
///
/// ## Invariants
/// - At most one line per `food_item_id` within a user's cart
/// - `quantity >= 1`; a line reaching 0 is removed, never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog id of the selected item.
    pub food_item_id: i64,

    /// How many of the item. Always positive.
    pub quantity: i64,
}

impl CartLine {
    /// Creates a line for a food item.
    pub fn new(food_item_id: i64, quantity: i64) -> Self {
        CartLine {
            food_item_id,
            quantity,
        }
    }

    /// Line total at the given unit price (read from the catalog by the
    /// caller; cart lines do not store prices).
    pub fn line_total(&self, unit_price: Money) -> Money {
        unit_price * self.quantity
    }
}

// =============================================================================
// Bill Status
// =============================================================================

/// The lifecycle of a placed order.
///
/// ## State Machine
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Pending ──► Confirmed ──► Preparing ──► Ready ──► Delivering          │
/// │     │                                                    │              │
/// │     │              (any active state, 45 min elapsed)    │              │
/// │     ├──────────────────────┬─────────────────────────────┘              │
/// │     ▼                      ▼                                            │
/// │  Cancelled             Delivered                                        │
/// │  (terminal)            (terminal)                                       │
/// │                                                                         │
/// │  Manual transitions only move forward along the progression.           │
/// │  Cancellation is only possible while still Pending.                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    /// Order placed, awaiting restaurant confirmation.
    Pending,
    /// Restaurant accepted the order.
    Confirmed,
    /// Kitchen is working on it.
    Preparing,
    /// Packed and waiting for a courier.
    Ready,
    /// On the way to the customer.
    Delivering,
    /// Order completed.
    Delivered,
    /// Order cancelled by the customer while still pending.
    Cancelled,
}

impl Default for BillStatus {
    fn default() -> Self {
        BillStatus::Pending
    }
}

impl BillStatus {
    /// Position in the forward progression. Terminal states sort last.
    fn stage(self) -> u8 {
        match self {
            BillStatus::Pending => 0,
            BillStatus::Confirmed => 1,
            BillStatus::Preparing => 2,
            BillStatus::Ready => 3,
            BillStatus::Delivering => 4,
            BillStatus::Delivered => 5,
            BillStatus::Cancelled => 6,
        }
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, BillStatus::Delivered | BillStatus::Cancelled)
    }

    /// Whether the order is still in flight (eligible for auto-delivery).
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Whether a manual transition from `self` to `next` is legal.
    ///
    /// Forward moves along the progression (including skips, e.g. an owner
    /// jumping Pending → Ready) are allowed; moving backwards or out of a
    /// terminal state is not. Cancellation is only legal from `Pending`.
    pub fn can_transition_to(self, next: BillStatus) -> bool {
        if self.is_terminal() || next == self {
            return false;
        }
        match next {
            BillStatus::Cancelled => self == BillStatus::Pending,
            _ => next.stage() > self.stage(),
        }
    }
}

// =============================================================================
// Bill Item
// =============================================================================

/// A line item on a bill.
/// Uses the snapshot pattern to freeze catalog data at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillItem {
    /// Catalog id the snapshot was taken from.
    pub food_id: i64,

    /// Name at time of order (frozen).
    pub food_name: String,

    /// Unit price at time of order (frozen).
    pub unit_price: Money,

    /// Quantity ordered.
    pub quantity: i64,
}

impl BillItem {
    /// Line total (frozen unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

// =============================================================================
// Bill
// =============================================================================

/// An order record: immutable after creation except for its status.
///
/// ## Invariants
/// - `bill_id` is unique and strictly increasing within its owner's scope
/// - `total` is computed once at creation and never recomputed, preserving
///   historical pricing even when catalog prices change later
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    /// Per-owner sequential id (monotonic, never reused).
    pub bill_id: i64,

    /// Username this bill belongs to.
    pub owner_username: String,

    /// Frozen line-item snapshot taken at checkout.
    pub items: Vec<BillItem>,

    /// Grand total stored at creation (items + any delivery fee).
    pub total: Money,

    /// Delivery address captured at checkout.
    pub delivery_address: String,

    /// Contact phone captured at checkout.
    pub phone: String,

    /// Recipient name captured at checkout.
    pub full_name: String,

    /// When the order was placed.
    pub order_date: DateTime<Utc>,

    /// When the status last changed.
    pub last_updated: DateTime<Utc>,

    /// Current lifecycle state.
    pub status: BillStatus,

    /// Optional free-text note to the kitchen/courier.
    pub notes: Option<String>,
}

impl Bill {
    /// Sum of the frozen line totals. Excludes any delivery fee folded into
    /// `total` by the caller at creation time.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(BillItem::line_total).sum()
    }

    /// Pure predicate: is this bill past the auto-delivery threshold?
    ///
    /// Does **not** mutate anything; the store applies the actual transition
    /// at its query checkpoints.
    pub fn auto_delivery_due(&self, now: DateTime<Utc>) -> bool {
        self.status.is_active()
            && now - self.order_date >= Duration::minutes(AUTO_DELIVER_AFTER_MINS)
    }

    /// Applies the auto-delivery transition if due. Returns whether the bill
    /// changed.
    pub fn apply_auto_delivery(&mut self, now: DateTime<Utc>) -> bool {
        if !self.auto_delivery_due(now) {
            return false;
        }
        self.status = BillStatus::Delivered;
        self.last_updated = now;
        true
    }

    /// Whether the customer may still cancel.
    pub fn can_cancel(&self) -> bool {
        self.status == BillStatus::Pending
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
