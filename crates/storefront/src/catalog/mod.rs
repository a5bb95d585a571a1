//! The product catalog.
//!
//! The catalog is loaded once at startup and is read-only afterwards. Every
//! other component queries it; nothing mutates it. Loading validates the
//! identity invariants the rest of the engine relies on, so a bad catalog
//! fails fast instead of surfacing as odd cart or favorites behavior later.

use std::collections::HashSet;
use std::sync::Arc;

use metafora_core::{Category, Product, ProductId};
use thiserror::Error;
use tracing::{info, instrument};

/// The catalog shipped with the storefront.
const BUILTIN_CATALOG: &str = include_str!("../../content/catalog.json");

/// Catalog integrity violations. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog data is not valid JSON or names an unknown category.
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A product has an empty id.
    #[error("product at position {0} has an empty id")]
    EmptyId(usize),

    /// Two products share an id.
    #[error("duplicate product id: {0}")]
    DuplicateId(ProductId),

    /// A product has a price below zero.
    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),
}

/// Immutable, validated list of products in display order.
///
/// Cheap to clone: clones share the same product slice.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Arc<[Product]>,
}

impl Catalog {
    /// Validate and wrap a list of products.
    ///
    /// # Errors
    ///
    /// Returns an error if any id is empty or duplicated, or if any price is
    /// negative.
    pub fn load(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());

        for (position, product) in products.iter().enumerate() {
            if product.id.is_empty() {
                return Err(CatalogError::EmptyId(position));
            }
            if !seen.insert(&product.id) {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
            if product.price.is_negative() {
                return Err(CatalogError::NegativePrice(product.id.clone()));
            }
        }

        Ok(Self {
            products: products.into(),
        })
    }

    /// Parse and validate a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, a category is not one of
    /// the known labels, or validation fails.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::load(products)
    }

    /// The catalog bundled with the storefront.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled data is invalid.
    #[instrument]
    pub fn builtin() -> Result<Self, CatalogError> {
        let catalog = Self::from_json(BUILTIN_CATALOG)?;
        info!(products = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// All products in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.products.iter()
    }

    /// Products in one category, in catalog order.
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(move |p| p.category == category)
    }

    /// Resolve ids to products, in catalog order. Unknown ids are skipped.
    #[must_use]
    pub fn products_for<'a>(&self, ids: impl IntoIterator<Item = &'a ProductId>) -> Vec<Product> {
        let wanted: HashSet<&ProductId> = ids.into_iter().collect();
        self.products
            .iter()
            .filter(|p| wanted.contains(&p.id))
            .cloned()
            .collect()
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
