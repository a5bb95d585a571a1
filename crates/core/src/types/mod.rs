//! Core types for Metáfora.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod chat;
pub mod id;
pub mod postal;
pub mod price;
pub mod product;

pub use category::{Category, CategoryError};
pub use chat::{ChatMessage, ChatRole};
pub use id::ProductId;
pub use postal::{PostalCode, PostalCodeError};
pub use price::{Price, PriceError};
pub use product::Product;
