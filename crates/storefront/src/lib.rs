//! Ferremas storefront cart client.
//!
//! Everything the storefront pages do with the shopping cart: the quantity
//! stepper, adding products, editing and removing line items, the cart badge
//! and handing checkout over to the payment gateway.
//!
//! # Architecture
//!
//! - [`api`]: the [`api::CartApi`] seam and its `reqwest` implementation
//! - [`view`]: the page view-model and its pure render into DOM patches
//! - [`controller`]: user actions, dispatched through the [`bindings`] table
//! - [`config`] and [`error`]: ambient configuration and error reporting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod bindings;
pub mod config;
pub mod controller;
pub mod error;
pub mod stepper;
pub mod view;

pub use controller::{AssumeYes, CartController, Outcome, Prompt};
