//! Keyword search over the catalog.
//!
//! Matching is a case-insensitive substring test against each product's
//! name, description, category label and scent profile. Results keep
//! catalog order; there is no ranking.
//!
//! A blank query returns no products rather than the whole catalog, so the
//! view can tell "nothing typed yet" apart from "nothing matched" through
//! [`SearchResults::is_blank_query`].

use metafora_core::Product;
use tracing::instrument;

use crate::catalog::Catalog;

/// Outcome of a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    /// The query as typed.
    pub query: String,
    /// Matching products, in catalog order.
    pub products: Vec<Product>,
}

impl SearchResults {
    /// Whether the query was empty or whitespace only.
    #[must_use]
    pub fn is_blank_query(&self) -> bool {
        self.query.trim().is_empty()
    }

    /// Whether a real query matched nothing.
    #[must_use]
    pub fn no_matches(&self) -> bool {
        !self.is_blank_query() && self.products.is_empty()
    }

    /// Number of matching products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether there are no matching products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Stateless query front-end over a [`Catalog`].
#[derive(Debug, Clone)]
pub struct SearchIndex {
    catalog: Catalog,
}

impl SearchIndex {
    /// Create an index over a catalog.
    #[must_use]
    pub const fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Search the catalog.
    ///
    /// The query is lowercased but otherwise matched as typed, so inner and
    /// surrounding whitespace is significant once the query is non-blank.
    #[instrument(skip(self))]
    pub fn search(&self, query: &str) -> SearchResults {
        if query.trim().is_empty() {
            return SearchResults {
                query: query.to_string(),
                products: Vec::new(),
            };
        }

        let needle = query.to_lowercase();
        let products = self
            .catalog
            .iter()
            .filter(|p| p.matches_lowercase(&needle))
            .cloned()
            .collect();

        SearchResults {
            query: query.to_string(),
            products,
        }
    }
}
