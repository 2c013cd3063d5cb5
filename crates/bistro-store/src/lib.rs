//! # bistro-store: User / Cart / Bill Stores for Bistro
//!
//! The stateful layer of the Bistro ordering system: session tracking,
//! per-user carts, durable bills, all over a flat key-value persistence
//! abstraction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bistro Data Flow                                 │
//! │                                                                         │
//! │  UI callers (menu, cart screen, checkout, owner dashboard)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   bistro-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐   ┌───────────┐   ┌───────────┐                │   │
//! │  │   │ UserStore │   │ CartStore │   │ BillStore │                │   │
//! │  │   │  identity │   │ per-user  │   │  orders + │                │   │
//! │  │   │  session  │   │ isolation │   │  statuses │                │   │
//! │  │   └─────┬─────┘   └─────┬─────┘   └─────┬─────┘                │   │
//! │  │         │               │               │                       │   │
//! │  │         └───────────────┼───────────────┘                       │   │
//! │  │                         ▼                                       │   │
//! │  │              KvStore (memory / JSON file)                       │   │
//! │  │                                                                 │   │
//! │  │   Catalog trait ◄── external menu provider (read-only)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  bistro-core (pure domain types and rules)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`kv`] - Key-value persistence trait and backends
//! - [`session`] - The shared "who is logged in" handle
//! - [`catalog`] - Read-only menu collaborator trait
//! - [`user`] - Identity, authentication, profile mutation
//! - [`cart`] - The active user's selection
//! - [`bill`] - Order records, id counters, status lifecycle
//! - [`checkout`] - The place-order composite
//! - [`hub`] - One-call wiring of the whole layer
//! - [`error`] - Auth and persistence error types
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use bistro_store::{MemoryKvStore, StaticCatalog, Stores};
//!
//! let stores = Stores::open(
//!     Arc::new(MemoryKvStore::new()),
//!     Arc::new(StaticCatalog::new()),
//! );
//!
//! assert!(stores.users().login_simple("alice"));
//! assert!(stores.cart().cart_lines().is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bill;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod hub;
pub mod kv;
pub mod session;
pub mod user;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{AuthError, KvError, KvResult};
pub use hub::Stores;
pub use kv::{JsonFileStore, KvStore, KvStoreExt, MemoryKvStore, StoreKey};
pub use session::{Session, SessionSnapshot};

// Store re-exports for convenience
pub use bill::BillStore;
pub use cart::CartStore;
pub use catalog::{Catalog, StaticCatalog};
pub use checkout::place_order;
pub use user::{SignUpRequest, UserStore};
