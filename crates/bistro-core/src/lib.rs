//! # bistro-core: Pure Business Logic for Bistro
//!
//! This crate is the **heart** of the Bistro ordering system. It contains the
//! domain model and business rules as pure code with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bistro Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  UI Layer (external callers)                    │   │
//! │  │    Menu Screen ──► Cart Screen ──► Checkout ──► Order History  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ plain method calls                     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  bistro-store (stateful layer)                  │   │
//! │  │    UserStore ── CartStore ── BillStore ── key-value backend    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bistro-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │validation │  │   error   │  │   │
//! │  │   │ User/Bill │  │   Money   │  │   rules   │  │  typed    │  │   │
//! │  │   │ CartLine  │  │ (integer) │  │  checks   │  │  errors   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO PERSISTENCE • NO SESSION • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, FoodItem, CartLine, Bill, BillStatus)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation (email, password, phone, quantity)
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Persistence, session state and logging live in bistro-store
//! 3. **Integer Money**: All monetary values are integer minor units (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use bistro_core::Money` instead of
// `use bistro_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Placeholder stored in `User::address` until the customer fills one in.
///
/// Checkout treats this sentinel the same as any other address; the UI is
/// expected to prompt for a real one before placing an order.
pub const ADDRESS_NOT_SET: &str = "Address not set";

/// Minutes after which a still-active bill is considered delivered.
///
/// There is no courier integration: delivery completion is inferred from
/// elapsed time. The promotion is applied at query checkpoints, never inside
/// a plain getter.
pub const AUTO_DELIVER_AFTER_MINS: i64 = 45;

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Maximum quantity of a single food item in a cart line.
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum number of distinct lines in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Flat per-order delivery fee, in minor currency units.
pub const DELIVERY_FEE: Money = Money::from_units(15_000);

/// Fixed non-secret password assigned to accounts auto-provisioned through
/// the legacy username-only login path. Holders of such accounts can never
/// authenticate through the password path until a real password is set.
pub const LEGACY_LOGIN_PASSWORD: &str = "bistro1legacy";
