//! Ferremas Core - Shared cart types.
//!
//! This crate provides the types the cart client and its tools share:
//! - `storefront` - Cart client library (HTTP calls, view-model, rendering)
//! - `cli` - Command-line driver for the cart client
//!
//! # Architecture
//!
//! The core crate contains only types and pure arithmetic - no I/O, no HTTP
//! clients, no rendering. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, quantities, prices, line items and totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
