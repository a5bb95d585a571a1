//! Favorites list with write-through persistence.
//!
//! Favorites are a set of product ids kept in insertion order. The store is
//! loaded once from a [`KeyValueStore`] and writes the whole set back on
//! every toggle, before the toggle returns.
//!
//! Stored value: a JSON array of id strings, e.g. `["1","7"]`. A missing,
//! unreadable or malformed value loads as the empty set.

use metafora_core::{Product, ProductId};
use tracing::{debug, instrument, warn};

use crate::catalog::Catalog;
use crate::storage::KeyValueStore;

/// Storage key of the persisted favorites.
pub const FAVORITES_KEY: &str = "metafora_favorites";

/// The shopper's favorites.
#[derive(Debug)]
pub struct FavoritesStore<S> {
    ids: Vec<ProductId>,
    storage: S,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    /// Load favorites from storage.
    ///
    /// Never fails: storage errors and malformed values are logged and
    /// treated as an empty list. Duplicate ids in the stored value are
    /// collapsed, keeping the first occurrence.
    #[instrument(skip(storage))]
    pub fn load(storage: S) -> Self {
        let ids = match storage.get(FAVORITES_KEY) {
            Ok(Some(raw)) => parse_ids(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read favorites, starting empty");
                Vec::new()
            }
        };

        debug!(count = ids.len(), "favorites loaded");
        Self { ids, storage }
    }

    /// Add the id if absent, remove it if present.
    ///
    /// Returns whether the product is a favorite afterwards.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub fn toggle(&mut self, id: &ProductId) -> bool {
        let now_favorite = if let Some(index) = self.ids.iter().position(|f| f == id) {
            self.ids.remove(index);
            false
        } else {
            self.ids.push(id.clone());
            true
        };

        self.persist();
        now_favorite
    }

    /// Whether a product is a favorite.
    #[must_use]
    pub fn is_favorite(&self, id: &ProductId) -> bool {
        self.ids.contains(id)
    }

    /// Favorite ids in the order they were added.
    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    /// Number of favorites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether there are no favorites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Favorite products in catalog order. Ids missing from the catalog are
    /// skipped.
    #[must_use]
    pub fn products(&self, catalog: &Catalog) -> Vec<Product> {
        catalog.products_for(&self.ids)
    }

    /// The backing storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Write the full set to storage.
    fn persist(&self) {
        let value = match serde_json::to_string(&self.ids) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "failed to encode favorites");
                return;
            }
        };

        if let Err(e) = self.storage.set(FAVORITES_KEY, &value) {
            warn!(error = %e, "failed to persist favorites");
        }
    }
}

/// Decode a stored favorites value, deduplicating in order.
fn parse_ids(raw: &str) -> Vec<ProductId> {
    match serde_json::from_str::<Vec<ProductId>>(raw) {
        Ok(stored) => {
            let mut ids: Vec<ProductId> = Vec::with_capacity(stored.len());
            for id in stored {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            ids
        }
        Err(e) => {
            warn!(error = %e, "malformed favorites value, starting empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};

    /// Storage whose every operation fails.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Poisoned)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    fn id(s: &str) -> ProductId {
        ProductId::new(s)
    }

    #[test]
    fn test_missing_value_loads_empty() {
        let favorites = FavoritesStore::load(MemoryStore::new());
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_malformed_values_load_empty() {
        for raw in ["not json", "{\"1\":true}", "[1,7]", ""] {
            let favorites = FavoritesStore::load(MemoryStore::with_entry(FAVORITES_KEY, raw));
            assert!(favorites.is_empty(), "value {raw:?} should load empty");
        }
    }

    #[test]
    fn test_stored_duplicates_collapse() {
        let favorites =
            FavoritesStore::load(MemoryStore::with_entry(FAVORITES_KEY, r#"["7","1","7"]"#));
        assert_eq!(favorites.ids(), &[id("7"), id("1")]);
    }

    #[test]
    fn test_toggle_writes_through() {
        let storage = MemoryStore::new();
        let mut favorites = FavoritesStore::load(storage.clone());

        assert!(favorites.toggle(&id("1")));
        assert!(favorites.toggle(&id("7")));
        assert_eq!(
            storage.get(FAVORITES_KEY).expect("get").as_deref(),
            Some(r#"["1","7"]"#)
        );

        assert!(!favorites.toggle(&id("1")));
        assert_eq!(
            storage.get(FAVORITES_KEY).expect("get").as_deref(),
            Some(r#"["7"]"#)
        );
    }

    #[test]
    fn test_even_toggles_restore_membership() {
        let mut favorites = FavoritesStore::load(MemoryStore::new());
        favorites.toggle(&id("3"));

        for rounds in 1..=4 {
            for _ in 0..rounds * 2 {
                favorites.toggle(&id("5"));
            }
            assert!(!favorites.is_favorite(&id("5")));
            assert!(favorites.is_favorite(&id("3")));
            assert_eq!(favorites.len(), 1);
        }
    }

    #[test]
    fn test_reload_reproduces_membership() {
        let storage = MemoryStore::new();
        let mut favorites = FavoritesStore::load(storage.clone());
        for raw in ["2", "9", "12", "9"] {
            favorites.toggle(&id(raw));
        }

        let reloaded = FavoritesStore::load(storage);
        assert_eq!(reloaded.ids(), favorites.ids());
        assert!(reloaded.is_favorite(&id("2")));
        assert!(!reloaded.is_favorite(&id("9")));
    }

    #[test]
    fn test_broken_storage_degrades_quietly() {
        let mut favorites = FavoritesStore::load(BrokenStore);
        assert!(favorites.is_empty());
        assert!(favorites.toggle(&id("1")));
        assert!(favorites.is_favorite(&id("1")));
    }

    #[test]
    fn test_products_follow_catalog_order() {
        let catalog = Catalog::builtin().expect("builtin catalog");
        let mut favorites = FavoritesStore::load(MemoryStore::new());
        for raw in ["7", "1", "ghost"] {
            favorites.toggle(&id(raw));
        }

        let names: Vec<_> = favorites
            .products(&catalog)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Niebla de Lavanda", "Difusor Zen Cerámica"]);
    }
}
