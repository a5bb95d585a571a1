//! One shopper's browsing session.
//!
//! [`StorefrontSession`] wires the read-only catalog to the mutable stores
//! (cart, favorites, shipping estimator, concierge transcript) and is the
//! single entry point a view layer talks to. Every cart and favorites
//! mutation is followed by a [`StoreEvent`] so views can refresh badges and
//! totals without polling.
//!
//! Operations are total. An id that is not in the catalog leaves every store
//! untouched, emits nothing and is logged at DEBUG.

use std::sync::Arc;

use metafora_core::{ChatMessage, PostalCodeError, Price, Product, ProductId};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument};
use url::Url;

use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::concierge::{self, Concierge, ConciergeChat};
use crate::config::StorefrontConfig;
use crate::error::{Result, add_breadcrumb};
use crate::favorites::FavoritesStore;
use crate::search::{SearchIndex, SearchResults};
use crate::shipping::{ShippingEstimator, ShippingStatus, ShippingUpdates};
use crate::storage::{FileStore, KeyValueStore};

const EVENT_CAPACITY: usize = 32;

/// Change notifications for views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A product was added; the cart panel should open.
    CartOpened,
    /// Cart contents changed.
    CartChanged { item_count: u64, total: Price },
    /// Favorites changed.
    FavoritesChanged { count: usize },
}

/// State of one browsing session.
pub struct StorefrontSession<S> {
    catalog: Catalog,
    search: SearchIndex,
    cart: CartStore,
    favorites: FavoritesStore<S>,
    shipping: ShippingEstimator,
    concierge: ConciergeChat,
    base_url: Url,
    events: broadcast::Sender<StoreEvent>,
}

impl StorefrontSession<FileStore> {
    /// Open a session backed by the data directory in `config`.
    ///
    /// Uses the built-in catalog, and the configured concierge provider or
    /// an offline one.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in catalog is invalid or the data
    /// directory cannot be created.
    #[instrument(skip(config), fields(data_dir = %config.data_dir.display()))]
    pub fn open(config: &StorefrontConfig) -> Result<Self> {
        let catalog = Catalog::builtin()?;
        let storage = FileStore::open(&config.data_dir)?;
        let provider = concierge::connect(config.concierge.as_ref());
        Ok(Self::new(catalog, storage, provider, config))
    }
}

impl<S: KeyValueStore> StorefrontSession<S> {
    /// Assemble a session from its parts.
    ///
    /// Favorites are loaded from `storage` immediately; the cart starts
    /// empty.
    #[must_use]
    pub fn new(
        catalog: Catalog,
        storage: S,
        provider: Arc<dyn Concierge>,
        config: &StorefrontConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let favorites = FavoritesStore::load(storage);
        info!(
            products = catalog.len(),
            favorites = favorites.len(),
            "storefront session started"
        );

        Self {
            search: SearchIndex::new(catalog.clone()),
            concierge: ConciergeChat::new(provider, &catalog),
            catalog,
            cart: CartStore::new(),
            favorites,
            shipping: ShippingEstimator::new(config.shipping_delay),
            base_url: config.base_url.clone(),
            events,
        }
    }

    /// Subscribe to store events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// The catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add one unit of a product to the cart.
    ///
    /// Returns the line's new quantity, or `None` for an unknown id.
    pub fn add_to_cart(&mut self, id: &ProductId) -> Option<u32> {
        self.add_to_cart_quantity(id, 1)
    }

    /// Add `units` of a product to the cart in one step.
    ///
    /// Adding zero units changes nothing and emits nothing.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub fn add_to_cart_quantity(&mut self, id: &ProductId, units: u32) -> Option<u32> {
        let product = self.known(id)?;

        if units == 0 {
            return self.cart.line(id).map(|l| l.quantity());
        }

        let quantity = self.cart.add_quantity(&product, units);
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));
        self.emit(StoreEvent::CartOpened);
        self.emit_cart_changed();
        Some(quantity)
    }

    /// Change a line's quantity by `delta`, flooring at 1.
    ///
    /// Returns the new quantity, or `None` if the product is not in the cart.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub fn update_quantity(&mut self, id: &ProductId, delta: i64) -> Option<u32> {
        let Some(quantity) = self.cart.update_quantity(id, delta) else {
            debug!("quantity update for product not in cart");
            return None;
        };
        self.emit_cart_changed();
        Some(quantity)
    }

    /// Remove a product's line from the cart.
    ///
    /// Returns whether a line was removed.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub fn remove_from_cart(&mut self, id: &ProductId) -> bool {
        if self.cart.remove(id).is_none() {
            debug!("remove for product not in cart");
            return false;
        }
        add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", id.as_str())]));
        self.emit_cart_changed();
        true
    }

    /// The cart.
    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Units across all cart lines.
    #[must_use]
    pub fn cart_count(&self) -> u64 {
        self.cart.count()
    }

    /// Cart total.
    #[must_use]
    pub fn cart_total(&self) -> Price {
        self.cart.total()
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Toggle a product's favorite status.
    ///
    /// Returns whether the product is a favorite afterwards, or `None` for
    /// an unknown id.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub fn toggle_favorite(&mut self, id: &ProductId) -> Option<bool> {
        self.known(id)?;
        let now_favorite = self.favorites.toggle(id);
        add_breadcrumb(
            "favorites",
            if now_favorite { "Added favorite" } else { "Removed favorite" },
            Some(&[("product_id", id.as_str())]),
        );
        self.emit(StoreEvent::FavoritesChanged {
            count: self.favorites.len(),
        });
        Some(now_favorite)
    }

    /// Add a favorite to the cart. The product stays a favorite.
    ///
    /// Returns the cart line's new quantity, or `None` if the product is not
    /// a favorite.
    pub fn move_favorite_to_cart(&mut self, id: &ProductId) -> Option<u32> {
        if !self.favorites.is_favorite(id) {
            debug!(product_id = %id, "move to cart for product not in favorites");
            return None;
        }
        self.add_to_cart(id)
    }

    /// Whether a product is a favorite.
    #[must_use]
    pub fn is_favorite(&self, id: &ProductId) -> bool {
        self.favorites.is_favorite(id)
    }

    /// Favorite products, in catalog order.
    #[must_use]
    pub fn favorite_products(&self) -> Vec<Product> {
        self.favorites.products(&self.catalog)
    }

    /// Number of favorites.
    #[must_use]
    pub fn favorites_count(&self) -> usize {
        self.favorites.len()
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    /// Search the catalog.
    #[must_use]
    pub fn search(&self, query: &str) -> SearchResults {
        self.search.search(query)
    }

    /// Absolute link to a product page on the configured origin.
    ///
    /// Any path, query or fragment on the base URL is replaced.
    #[must_use]
    pub fn share_link(&self, id: &ProductId) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);

        if url.cannot_be_a_base() {
            url.set_path(&format!("/product/{id}"));
        } else if let Ok(mut segments) = url.path_segments_mut() {
            segments.clear().push("product").push(id.as_str());
        }
        url
    }

    // =========================================================================
    // Shipping
    // =========================================================================

    /// Start a shipping estimate for free-form postal input.
    ///
    /// # Errors
    ///
    /// Returns the parse error for input with fewer than four digits. Nothing
    /// is started in that case.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn estimate_shipping(&mut self, input: &str) -> std::result::Result<(), PostalCodeError> {
        self.shipping.request(input)
    }

    /// Discard the shipping quote, e.g. after the postal input changed.
    pub fn clear_shipping(&mut self) {
        self.shipping.clear();
    }

    /// Current shipping status.
    #[must_use]
    pub fn shipping(&self) -> ShippingStatus {
        self.shipping.status()
    }

    /// Subscribe to shipping status changes.
    #[must_use]
    pub fn shipping_updates(&self) -> ShippingUpdates {
        self.shipping.subscribe()
    }

    // =========================================================================
    // Concierge
    // =========================================================================

    /// Ask the concierge. Blank input is ignored and returns `None`.
    pub async fn ask_concierge(&mut self, query: &str) -> Option<ChatMessage> {
        self.concierge.send(query).await.cloned()
    }

    /// The concierge transcript, oldest first.
    #[must_use]
    pub fn concierge_messages(&self) -> &[ChatMessage] {
        self.concierge.messages()
    }

    fn known(&self, id: &ProductId) -> Option<Product> {
        let product = self.catalog.get(id).cloned();
        if product.is_none() {
            debug!(product_id = %id, "unknown product id");
        }
        product
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn emit_cart_changed(&self) {
        self.emit(StoreEvent::CartChanged {
            item_count: self.cart.count(),
            total: self.cart.total(),
        });
    }
}

impl<S> std::fmt::Debug for StorefrontSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontSession")
            .field("products", &self.catalog.len())
            .field("cart_lines", &self.cart.len())
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
