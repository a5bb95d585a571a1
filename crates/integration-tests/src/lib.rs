//! Integration tests for the Metáfora storefront engine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p metafora-integration-tests
//!
//! # Include the live concierge test
//! GEMINI_API_KEY=... cargo test -p metafora-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_session` - Cart, favorites, search and shipping through the session facade
//! - `concierge` - Transcript behavior with scripted and live providers

use std::sync::Arc;
use std::time::Duration;

use metafora_storefront::catalog::Catalog;
use metafora_storefront::concierge::Concierge;
use metafora_storefront::error::Result;
use metafora_storefront::storage::FileStore;
use metafora_storefront::{StorefrontConfig, StorefrontSession};
use tempfile::TempDir;
use url::Url;

/// Origin used for share links in tests.
pub const TEST_BASE_URL: &str = "https://metafora.test";

/// A data directory and configuration shared by the sessions of one test.
///
/// Sessions opened from the same context see the same persisted state, which
/// is how a returning shopper is simulated.
pub struct TestContext {
    dir: TempDir,
    pub config: StorefrontConfig,
}

impl TestContext {
    /// Create a context with a fresh temporary data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let base_url = Url::parse(TEST_BASE_URL)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let mut config = StorefrontConfig::with_base_url(base_url);
        config.data_dir = dir.path().join("data");
        config.shipping_delay = Duration::from_secs(1);

        Ok(Self { dir, config })
    }

    /// Root of the temporary directory.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Open a session the way a host would, with an offline concierge.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be opened.
    pub fn open(&self) -> Result<StorefrontSession<FileStore>> {
        StorefrontSession::open(&self.config)
    }

    /// Open a session with a specific concierge provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or storage cannot be opened.
    pub fn open_with(&self, provider: Arc<dyn Concierge>) -> Result<StorefrontSession<FileStore>> {
        let catalog = Catalog::builtin()?;
        let storage = FileStore::open(&self.config.data_dir)?;
        Ok(StorefrontSession::new(catalog, storage, provider, &self.config))
    }
}
