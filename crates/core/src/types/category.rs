//! Product categories.
//!
//! The catalog is partitioned into a closed set of categories. Each has a
//! storefront label (what shoppers read and what search matches against)
//! and a slug used for category page paths.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a label does not name a known category.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown product category: {0}")]
pub struct CategoryError(pub String);

/// Product category.
///
/// Serialized using the storefront label, which is how the catalog data
/// file spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Vela")]
    Candle,
    #[serde(rename = "Jabón")]
    Soap,
    #[serde(rename = "Aromatizante")]
    Diffuser,
}

impl Category {
    /// Every category, in storefront display order.
    pub const ALL: [Self; 3] = [Self::Candle, Self::Soap, Self::Diffuser];

    /// Storefront label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Candle => "Vela",
            Self::Soap => "Jabón",
            Self::Diffuser => "Aromatizante",
        }
    }

    /// Path slug of the category page.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Candle => "velas",
            Self::Soap => "jabones",
            Self::Diffuser => "aromatizantes",
        }
    }

    /// Look a category up by its page slug.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| CategoryError(s.to_string()))
    }
}
