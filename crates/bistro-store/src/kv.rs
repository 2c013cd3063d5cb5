//! # Key-Value Persistence
//!
//! The flat string-keyed store behind every Bistro store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Key-Value Persistence                                │
//! │                                                                         │
//! │  UserStore / CartStore / BillStore                                     │
//! │       │                                                                 │
//! │       ▼  typed get/put (JSON documents)                                │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            KvStore trait                │                           │
//! │  │                                         │                           │
//! │  │  StoreKey ──► "cart:alice"              │                           │
//! │  │  (structured, per-user namespacing)     │                           │
//! │  └───────┬─────────────────────┬───────────┘                           │
//! │          ▼                     ▼                                        │
//! │   MemoryKvStore          JsonFileStore                                 │
//! │   (tests, embedding)     (one JSON document on disk,                   │
//! │                           rewritten on every put)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Design
//! Keys are a structured enum, not formatted strings: the owning username is
//! a typed field, so two users' data cannot collide through a formatting
//! mistake. The string rendering exists only for the on-disk document.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::KvResult;

// =============================================================================
// Store Key
// =============================================================================

/// Composite key addressing one persisted record.
///
/// Per-user resources carry the owning username as data; global resources
/// carry none.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// The whole user registry (username → User).
    Users,
    /// The persisted session snapshot.
    Session,
    /// A user's active cart lines.
    Cart(String),
    /// A user's bill list.
    Bills(String),
    /// A user's bill id counter (monotonic, never reset).
    BillCounter(String),
}

impl StoreKey {
    /// Convenience constructor for a user's cart key.
    pub fn cart(username: &str) -> Self {
        StoreKey::Cart(username.to_string())
    }

    /// Convenience constructor for a user's bills key.
    pub fn bills(username: &str) -> Self {
        StoreKey::Bills(username.to_string())
    }

    /// Convenience constructor for a user's bill counter key.
    pub fn bill_counter(username: &str) -> Self {
        StoreKey::BillCounter(username.to_string())
    }

    /// Renders the key for the on-disk document.
    ///
    /// Only `JsonFileStore` uses this; in-memory lookups hash the enum
    /// directly.
    pub fn render(&self) -> String {
        match self {
            StoreKey::Users => "users".to_string(),
            StoreKey::Session => "session".to_string(),
            StoreKey::Cart(user) => format!("cart:{user}"),
            StoreKey::Bills(user) => format!("bills:{user}"),
            StoreKey::BillCounter(user) => format!("bill_counter:{user}"),
        }
    }
}

// =============================================================================
// KvStore Trait
// =============================================================================

/// A flat string-keyed store: `get`, `put`, `remove`.
///
/// Values are JSON documents. Implementations must be safe to share across
/// threads behind an `Arc`.
pub trait KvStore: Send + Sync {
    /// Returns the raw JSON document at `key`, if any.
    fn get_raw(&self, key: &StoreKey) -> KvResult<Option<String>>;

    /// Stores the raw JSON document at `key`, replacing any previous value.
    fn put_raw(&self, key: &StoreKey, value: String) -> KvResult<()>;

    /// Removes the record at `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &StoreKey) -> KvResult<()>;
}

/// Typed JSON helpers layered over any [`KvStore`].
///
/// Blanket-implemented, so `Arc<dyn KvStore>` gets them too.
pub trait KvStoreExt: KvStore {
    /// Reads and deserializes the value at `key`.
    fn get<T: DeserializeOwned>(&self, key: &StoreKey) -> KvResult<Option<T>> {
        match self.get_raw(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serializes and stores `value` at `key`.
    fn put<T: Serialize>(&self, key: &StoreKey, value: &T) -> KvResult<()> {
        self.put_raw(key, serde_json::to_string(value)?)
    }
}

impl<S: KvStore + ?Sized> KvStoreExt for S {}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Mutex-guarded map. The default backend for tests and embedders that
/// persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<StoreKey, String>>,
}

impl MemoryKvStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get_raw(&self, key: &StoreKey) -> KvResult<Option<String>> {
        let entries = self.entries.lock().expect("kv mutex poisoned");
        Ok(entries.get(key).cloned())
    }

    fn put_raw(&self, key: &StoreKey, value: String) -> KvResult<()> {
        let mut entries = self.entries.lock().expect("kv mutex poisoned");
        entries.insert(key.clone(), value);
        Ok(())
    }

    fn remove(&self, key: &StoreKey) -> KvResult<()> {
        let mut entries = self.entries.lock().expect("kv mutex poisoned");
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// JSON File Store
// =============================================================================

/// A single JSON document on disk, loaded at open and rewritten on every put.
///
/// ## Durability Model
/// Every mutation rewrites the whole document synchronously before the
/// operation returns. Fine for one process and the data volumes of a single
/// restaurant; not a concurrent database.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // BTreeMap keeps the on-disk document stably ordered across rewrites
    entries: Mutex<BTreeMap<String, serde_json::Value>>,
}

impl JsonFileStore {
    /// Opens the store at `path`, creating an empty document if the file
    /// does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> KvResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            BTreeMap::new()
        };

        Ok(JsonFileStore {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, serde_json::Value>) -> KvResult<()> {
        let raw = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl KvStore for JsonFileStore {
    fn get_raw(&self, key: &StoreKey) -> KvResult<Option<String>> {
        let entries = self.entries.lock().expect("kv mutex poisoned");
        match entries.get(&key.render()) {
            Some(value) => Ok(Some(serde_json::to_string(value)?)),
            None => Ok(None),
        }
    }

    fn put_raw(&self, key: &StoreKey, value: String) -> KvResult<()> {
        let parsed: serde_json::Value = serde_json::from_str(&value)?;
        let mut entries = self.entries.lock().expect("kv mutex poisoned");
        entries.insert(key.render(), parsed);
        self.persist(&entries)
    }

    fn remove(&self, key: &StoreKey) -> KvResult<()> {
        let mut entries = self.entries.lock().expect("kv mutex poisoned");
        if entries.remove(&key.render()).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bistro_core::CartLine;

    #[test]
    fn test_store_key_rendering() {
        assert_eq!(StoreKey::Users.render(), "users");
        assert_eq!(StoreKey::cart("alice").render(), "cart:alice");
        assert_eq!(StoreKey::bills("bob").render(), "bills:bob");
        assert_eq!(StoreKey::bill_counter("bob").render(), "bill_counter:bob");
    }

    #[test]
    fn test_keys_namespace_by_user() {
        assert_ne!(StoreKey::cart("alice"), StoreKey::cart("bob"));
        assert_ne!(StoreKey::cart("alice"), StoreKey::bills("alice"));
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryKvStore::new();
        let key = StoreKey::cart("alice");
        let lines = vec![CartLine::new(1, 2), CartLine::new(3, 1)];

        store.put(&key, &lines).unwrap();
        let loaded: Option<Vec<CartLine>> = store.get(&key).unwrap();
        assert_eq!(loaded.unwrap(), lines);

        store.remove(&key).unwrap();
        let gone: Option<Vec<CartLine>> = store.get(&key).unwrap();
        assert!(gone.is_none());
    }

    #[test]
    fn test_memory_store_remove_absent_is_noop() {
        let store = MemoryKvStore::new();
        store.remove(&StoreKey::cart("ghost")).unwrap();
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bistro.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store
                .put(&StoreKey::cart("alice"), &vec![CartLine::new(1, 2)])
                .unwrap();
            store.put(&StoreKey::bill_counter("alice"), &7i64).unwrap();
        }

        let store = JsonFileStore::open(&path).unwrap();
        let lines: Option<Vec<CartLine>> = store.get(&StoreKey::cart("alice")).unwrap();
        assert_eq!(lines.unwrap(), vec![CartLine::new(1, 2)]);
        let counter: Option<i64> = store.get(&StoreKey::bill_counter("alice")).unwrap();
        assert_eq!(counter, Some(7));
    }

    #[test]
    fn test_file_store_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bistro.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.put(&StoreKey::bill_counter("bob"), &1i64).unwrap();
        store.remove(&StoreKey::bill_counter("bob")).unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        let counter: Option<i64> = reopened.get(&StoreKey::bill_counter("bob")).unwrap();
        assert!(counter.is_none());
    }
}
