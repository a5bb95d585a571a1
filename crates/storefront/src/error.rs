//! Unified startup errors and Sentry breadcrumbs.
//!
//! Only building a session can fail. Once a [`StorefrontSession`] exists its
//! operations are total, so `StorefrontError` covers catalog, configuration
//! and storage failures and nothing else.
//!
//! [`StorefrontSession`]: crate::session::StorefrontSession

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Errors that prevent a storefront session from starting.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Catalog data is invalid.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Environment configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Persistent storage could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "7")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use metafora_core::ProductId;

    use super::*;

    #[test]
    fn test_storefront_error_display() {
        let err = StorefrontError::from(CatalogError::DuplicateId(ProductId::new("7")));
        assert_eq!(err.to_string(), "Catalog error: duplicate product id: 7");

        let err = StorefrontError::from(StorageError::InvalidKey("../x".to_string()));
        assert!(err.to_string().starts_with("Storage error: "));
    }

    #[test]
    fn test_add_breadcrumb_without_client() {
        // No Sentry client is bound in tests; this must be a silent no-op.
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "7")]));
        add_breadcrumb("favorites", "Toggled favorite", None);
    }
}
