//! Metáfora Core - Shared domain types.
//!
//! This crate provides the types every other Metáfora component speaks:
//! - `storefront` - The client-side commerce state engine (cart, favorites,
//!   search, shipping estimator, concierge boundary)
//! - `integration-tests` - End-to-end tests over the engine
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product identity, prices, categories, postal codes, and chat messages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
