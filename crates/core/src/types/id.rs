//! Product identity.
//!
//! Catalog ids are opaque strings (`"1"`, `"10"`, ...) and are compared
//! verbatim. Wrapping them keeps product ids from being mixed up with
//! free-form text such as search queries or postal codes.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a catalog product.
///
/// Serializes as a bare JSON string so persisted favorites stay in the
/// `["1","7"]` shape.
///
/// # Example
///
/// ```rust
/// # use metafora_core::ProductId;
/// let id = ProductId::new("7");
/// assert_eq!(id.as_str(), "7");
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new ID from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is empty (never valid inside a catalog).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
