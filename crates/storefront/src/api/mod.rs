//! Cart server API.
//!
//! # Architecture
//!
//! - [`CartApi`] is the seam between the controller and the server; the
//!   controller is generic over it so tests can substitute an in-memory fake
//! - [`HttpCartApi`] is the production implementation over `reqwest`
//! - The server owns pricing, stock, persistence and payment sessions; the
//!   client only issues requests and decodes the JSON responses
//!
//! # Endpoints
//!
//! | Method | Path | Body |
//! |---|---|---|
//! | GET | `/api/cart` | - |
//! | POST | `/api/cart/add` | `{product_id, quantity}` |
//! | PUT | `/api/cart/update/{id}` | `{quantity}` |
//! | DELETE | `/api/cart/remove/{id}` | - |
//! | DELETE | `/api/cart/clear` | - |
//! | POST | `/iniciar-pago` | - |

mod client;
pub mod types;

use std::future::Future;

use ferremas_core::{LineItem, LineItemId, ProductId, Quantity};

use crate::error::CartError;

pub use client::HttpCartApi;
pub use types::{AddedItem, PaymentSession};

/// Operations the cart server exposes.
///
/// Every call is a single round trip with no retries.
pub trait CartApi: Send + Sync {
    /// Fetch the current cart.
    fn fetch_cart(&self) -> impl Future<Output = Result<Vec<LineItem>, CartError>> + Send;

    /// Add a product to the cart.
    fn add_item(
        &self,
        product_id: ProductId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<AddedItem, CartError>> + Send;

    /// Set the quantity of a line item.
    fn update_quantity(
        &self,
        item_id: LineItemId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<(), CartError>> + Send;

    /// Remove a line item.
    fn remove_item(&self, item_id: LineItemId)
    -> impl Future<Output = Result<(), CartError>> + Send;

    /// Remove every line item.
    fn clear_cart(&self) -> impl Future<Output = Result<(), CartError>> + Send;

    /// Ask the server for a payment gateway session.
    fn start_payment(&self) -> impl Future<Output = Result<PaymentSession, CartError>> + Send;
}
