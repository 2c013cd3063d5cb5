//! # Catalog Collaborator
//!
//! Read-only menu lookup, keyed by food item id.
//!
//! The stores never cache catalog prices: the cart re-queries on every total
//! computation, and the bill store snapshots name/price exactly once at
//! checkout. That makes the catalog the single source of current prices and
//! bills the single source of historical ones.

use std::collections::BTreeMap;
use std::sync::Mutex;

use bistro_core::FoodItem;

// =============================================================================
// Catalog Trait
// =============================================================================

/// The menu as the stores see it.
///
/// The real menu lives outside this core (content management is a
/// presentation concern); this trait is the seam it plugs into.
pub trait Catalog: Send + Sync {
    /// Looks up one item by id.
    fn food_by_id(&self, id: i64) -> Option<FoodItem>;

    /// Lists items in a category, ordered by id.
    fn foods_by_category(&self, category: &str) -> Vec<FoodItem>;

    /// Lists the whole menu, ordered by id.
    fn all_foods(&self) -> Vec<FoodItem>;
}

// =============================================================================
// Static Catalog
// =============================================================================

/// An in-memory catalog for tests and embedders without a menu backend.
///
/// Mutable through `upsert` so tests can change a price after checkout and
/// assert that existing bills keep their snapshot.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    // BTreeMap keeps category/menu listings ordered by id
    items: Mutex<BTreeMap<i64, FoodItem>>,
}

impl StaticCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog seeded with `items`.
    pub fn with_items(items: impl IntoIterator<Item = FoodItem>) -> Self {
        let catalog = Self::new();
        for item in items {
            catalog.upsert(item);
        }
        catalog
    }

    /// Inserts or replaces an item (keyed by `item.id`).
    pub fn upsert(&self, item: FoodItem) {
        let mut items = self.items.lock().expect("catalog mutex poisoned");
        items.insert(item.id, item);
    }

    /// Removes an item from the menu.
    pub fn retire(&self, id: i64) {
        let mut items = self.items.lock().expect("catalog mutex poisoned");
        items.remove(&id);
    }
}

impl Catalog for StaticCatalog {
    fn food_by_id(&self, id: i64) -> Option<FoodItem> {
        let items = self.items.lock().expect("catalog mutex poisoned");
        items.get(&id).cloned()
    }

    fn foods_by_category(&self, category: &str) -> Vec<FoodItem> {
        let items = self.items.lock().expect("catalog mutex poisoned");
        items
            .values()
            .filter(|f| f.category == category)
            .cloned()
            .collect()
    }

    fn all_foods(&self) -> Vec<FoodItem> {
        let items = self.items.lock().expect("catalog mutex poisoned");
        items.values().cloned().collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bistro_core::Money;

    fn item(id: i64, name: &str, price: i64, category: &str) -> FoodItem {
        FoodItem {
            id,
            name: name.to_string(),
            price: Money::from_units(price),
            category: category.to_string(),
            image_ref: None,
        }
    }

    #[test]
    fn test_lookup_by_id() {
        let catalog = StaticCatalog::with_items([
            item(1, "Beef Pho", 85_000, "noodles"),
            item(3, "Spring Rolls", 75_000, "starters"),
        ]);

        assert_eq!(catalog.food_by_id(1).unwrap().name, "Beef Pho");
        assert!(catalog.food_by_id(99).is_none());
    }

    #[test]
    fn test_category_listing_ordered_by_id() {
        let catalog = StaticCatalog::with_items([
            item(5, "Iced Coffee", 30_000, "drinks"),
            item(2, "Lemon Tea", 25_000, "drinks"),
            item(1, "Beef Pho", 85_000, "noodles"),
        ]);

        let drinks = catalog.foods_by_category("drinks");
        let ids: Vec<i64> = drinks.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![2, 5]);
    }

    #[test]
    fn test_upsert_replaces_price() {
        let catalog = StaticCatalog::with_items([item(1, "Beef Pho", 85_000, "noodles")]);

        catalog.upsert(item(1, "Beef Pho", 95_000, "noodles"));
        assert_eq!(catalog.food_by_id(1).unwrap().price.units(), 95_000);
        assert_eq!(catalog.all_foods().len(), 1);
    }

    #[test]
    fn test_retire_removes_item() {
        let catalog = StaticCatalog::with_items([item(1, "Beef Pho", 85_000, "noodles")]);
        catalog.retire(1);
        assert!(catalog.food_by_id(1).is_none());
    }
}
