//! Catalog product record.

use serde::{Deserialize, Serialize};

use super::{Category, Price, ProductId};

/// A purchasable product.
///
/// Products are immutable once the catalog is loaded; every other component
/// refers to them by [`ProductId`] or holds a clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: Category,
    /// Image URI, opaque to the engine.
    pub image: String,
    /// Comma-delimited scent notes, e.g. `"Floral, Herbal, Calmante"`.
    pub scent_profile: String,
    /// Accent color token used behind the product card.
    pub hex_color: String,
}

impl Product {
    /// The scent profile split into individual notes.
    ///
    /// Notes are trimmed and empty entries are dropped.
    pub fn scent_notes(&self) -> impl Iterator<Item = &str> {
        self.scent_profile
            .split(',')
            .map(str::trim)
            .filter(|note| !note.is_empty())
    }

    /// Whether an already-lowercased query occurs in any searchable field.
    ///
    /// Searchable fields are the name, description, category label and
    /// scent profile.
    #[must_use]
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        [
            self.name.as_str(),
            self.description.as_str(),
            self.category.label(),
            self.scent_profile.as_str(),
        ]
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}
