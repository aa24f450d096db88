//! Core types for the Ferremas cart.
//!
//! This module provides type-safe wrappers for the cart's domain concepts.

pub mod id;
pub mod line_item;
pub mod price;
pub mod quantity;
pub mod totals;

pub use id::*;
pub use line_item::{LineItem, LineItemError, Product};
pub use price::{CurrencyCode, Price};
pub use quantity::Quantity;
pub use totals::{CartTotals, TaxModel, TotalsError};
