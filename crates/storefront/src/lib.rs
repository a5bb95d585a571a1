//! Metáfora storefront engine.
//!
//! Client-side commerce state for the Metáfora boutique: a fixed product
//! catalog, keyword search, a session cart, persisted favorites, a simulated
//! shipping estimator and a conversational scent concierge. The engine has
//! no UI and no HTTP surface; a view layer drives it through
//! [`StorefrontSession`] and listens for [`StoreEvent`]s.
//!
//! # Example
//!
//! ```no_run
//! use metafora_core::ProductId;
//! use metafora_storefront::{StorefrontConfig, StorefrontSession};
//!
//! # fn main() -> metafora_storefront::error::Result<()> {
//! let config = StorefrontConfig::from_env()?;
//! let _guard = metafora_storefront::telemetry::init(&config);
//!
//! let mut session = StorefrontSession::open(&config)?;
//! session.add_to_cart(&ProductId::new("1"));
//! println!("{}", session.cart_total());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod concierge;
pub mod config;
pub mod error;
pub mod favorites;
pub mod search;
pub mod session;
pub mod shipping;
pub mod storage;
pub mod telemetry;

pub use catalog::Catalog;
pub use config::StorefrontConfig;
pub use error::StorefrontError;
pub use session::{StoreEvent, StorefrontSession};
