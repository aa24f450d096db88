//! Cart controller.
//!
//! Drives every user action: reads the [`Page`], talks to the server through
//! a [`CartApi`], and writes the outcome back into the page. The page lock is
//! only held between awaits, never across one, so concurrent actions are
//! independent round trips.
//!
//! Cart contents shown on the page only ever come from a server response:
//! mutations are followed by a full reload instead of patching rows locally.

use ferremas_core::{LineItemId, ProductId, Quantity};
use ferremas_core::types::quantity::parse_leading_int;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::api::{CartApi, PaymentSession};
use crate::bindings::{self, ActionKind, UiEvent};
use crate::error::{self, CartError, Operation};
use crate::stepper::QuantityStepper;
use crate::view::{self, Badge, Notice, Page, RenderError, Rendered};

/// Asked before removing items from the cart.
pub const CONFIRM_REMOVE_MESSAGE: &str = "¿Estás seguro de eliminar este producto del carrito?";

/// Asked before emptying the cart.
pub const CONFIRM_CLEAR_MESSAGE: &str = "¿Estás seguro de vaciar el carrito?";

/// Asks the user to confirm a destructive action.
pub trait Prompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Prompt for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Confirms everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Prompt for AssumeYes {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// What a user action ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The server confirmed the change.
    Applied,
    /// Nothing to send: the requested state is already current.
    Unchanged,
    /// The user declined the confirmation.
    Cancelled,
    /// The action isn't available on this page right now.
    Ignored,
}

/// Runs cart actions against a page.
pub struct CartController<A, P = AssumeYes> {
    api: A,
    prompt: P,
    page: Mutex<Page>,
}

impl<A: CartApi, P: Prompt> CartController<A, P> {
    /// Create a controller for `page`.
    pub fn new(api: A, prompt: P, page: Page) -> Self {
        Self {
            api,
            prompt,
            page: Mutex::new(page),
        }
    }

    /// The underlying API client.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Copy of the current page state.
    pub async fn snapshot(&self) -> Page {
        self.page.lock().await.clone()
    }

    /// Render the current page state.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` if a template fails to render.
    pub async fn render(&self) -> Result<Rendered, RenderError> {
        view::render(&*self.page.lock().await)
    }

    /// Drain alerts raised since the last call.
    pub async fn take_alerts(&self) -> Vec<String> {
        self.page.lock().await.take_alerts()
    }

    /// Initial load: the cart listing on the cart page, then the badge.
    #[instrument(skip(self))]
    pub async fn page_loaded(&self) {
        self.load_cart().await;
        self.refresh_badge().await;
    }

    /// Run the action bound to `event`.
    ///
    /// Events with no binding are ignored.
    #[instrument(skip(self), fields(action_id = %Uuid::new_v4()))]
    pub async fn dispatch(&self, event: UiEvent) -> Result<Outcome, CartError> {
        let Some(action) = bindings::resolve(event.role, event.trigger) else {
            debug!(role = event.role.key(), trigger = ?event.trigger, "Unbound event");
            return Ok(Outcome::Ignored);
        };

        match action {
            ActionKind::DecrementStepper
            | ActionKind::IncrementStepper
            | ActionKind::NormalizeStepper => Ok(self.step(action, event.value.as_deref()).await),
            ActionKind::AddToCart => self.add_to_cart(event.product).await,
            ActionKind::DecrementItem | ActionKind::IncrementItem => {
                let Some(id) = event.item else {
                    return Ok(Outcome::Ignored);
                };
                let current = {
                    let page = self.page.lock().await;
                    page.cart
                        .as_ref()
                        .and_then(|cart| cart.item(id))
                        .map(|item| i64::from(item.quantity))
                };
                let Some(current) = current else {
                    debug!(item_id = %id, "Row control for unknown item");
                    return Ok(Outcome::Ignored);
                };
                let requested = if action == ActionKind::DecrementItem {
                    current - 1
                } else {
                    current + 1
                };
                self.update_quantity(id, requested).await
            }
            ActionKind::SetItemQuantity => {
                let Some(id) = event.item else {
                    return Ok(Outcome::Ignored);
                };
                let requested = event
                    .value
                    .as_deref()
                    .and_then(parse_leading_int)
                    .unwrap_or_else(|| i64::from(Quantity::MIN));
                self.update_quantity(id, requested).await
            }
            ActionKind::RemoveItem => match event.item {
                Some(id) => self.remove_item(id).await,
                None => Ok(Outcome::Ignored),
            },
            ActionKind::ClearCart => self.clear_cart().await,
            ActionKind::Checkout => Ok(self
                .start_checkout()
                .await?
                .map_or(Outcome::Ignored, |_| Outcome::Applied)),
        }
    }

    async fn step(&self, action: ActionKind, value: Option<&str>) -> Outcome {
        let mut page = self.page.lock().await;
        let Some(stepper) = page.stepper.as_mut() else {
            return Outcome::Ignored;
        };
        match action {
            ActionKind::DecrementStepper => stepper.decrement(),
            ActionKind::IncrementStepper => stepper.increment(),
            _ => stepper.edit(value.unwrap_or_default()),
        }
        Outcome::Applied
    }

    /// Fetch the cart and show it.
    ///
    /// A failed fetch shows an empty cart. A response that arrives after a
    /// newer one was applied is discarded. Returns whether the response was
    /// applied; always `false` off the cart page.
    #[instrument(skip(self))]
    pub async fn load_cart(&self) -> bool {
        let Some(ticket) = self.page.lock().await.begin_cart_load() else {
            return false;
        };

        let items = match self.api.fetch_cart().await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Failed to load cart; showing it empty");
                Vec::new()
            }
        };

        let applied = self.page.lock().await.apply_cart(ticket, items);
        if !applied {
            debug!(?ticket, "Discarded stale cart response");
        }
        applied
    }

    /// Update the cart badge from the server.
    #[instrument(skip(self))]
    pub async fn refresh_badge(&self) {
        let (ticket, authenticated) = {
            let mut page = self.page.lock().await;
            if !page.has_badge() {
                return;
            }
            (page.begin_badge_load(), page.user_authenticated)
        };

        let badge = if authenticated {
            match self.api.fetch_cart().await {
                Ok(items) => Badge::from_count(items.len()),
                Err(e) => {
                    debug!(error = %e, "Failed to fetch cart for badge");
                    Badge::Hidden
                }
            }
        } else {
            Badge::Hidden
        };

        self.page.lock().await.apply_badge(ticket, badge);
    }

    /// Add a product to the cart with the stepper's quantity.
    ///
    /// `product` overrides the page's `product-id` field. Anonymous users get
    /// a login prompt and nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns the failure after it has been shown on the page.
    #[instrument(skip(self), fields(action_id = %Uuid::new_v4()))]
    pub async fn add_to_cart(&self, product: Option<ProductId>) -> Result<Outcome, CartError> {
        let (product_id, quantity) = {
            let mut page = self.page.lock().await;
            if !page.user_authenticated {
                page.show_add_result(Notice::login_required());
                return Err(CartError::Unauthenticated);
            }
            let Some(product_id) = product.or(page.product_id) else {
                debug!("Add to cart without a product id");
                return Ok(Outcome::Ignored);
            };
            let quantity = page
                .stepper
                .as_ref()
                .map_or(Quantity::MIN, QuantityStepper::quantity);
            (product_id, quantity)
        };

        let product = product_id.to_string();
        let qty = quantity.to_string();
        error::add_breadcrumb(
            "cart",
            "Add to cart",
            Some(&[("product_id", product.as_str()), ("quantity", qty.as_str())]),
        );

        match self.api.add_item(product_id, quantity).await {
            Ok(added) => {
                info!(%product_id, %quantity, ?added, "Added to cart");
                self.page.lock().await.show_add_result(Notice::added());
                self.refresh_badge().await;
                Ok(Outcome::Applied)
            }
            Err(e) => {
                error::report(&e, Operation::AddToCart);
                let notice = match e {
                    CartError::Unauthenticated => Notice::login_required(),
                    _ => Notice::error(e.user_message(Operation::AddToCart)),
                };
                self.page.lock().await.show_add_result(notice);
                Err(e)
            }
        }
    }

    /// Set a line item's quantity.
    ///
    /// Below 1 becomes a removal (with confirmation); above 99 is clamped.
    /// Nothing is sent when the quantity wouldn't change.
    ///
    /// # Errors
    ///
    /// Returns the failure after it has been shown on the page.
    #[instrument(skip(self), fields(action_id = %Uuid::new_v4()))]
    pub async fn update_quantity(
        &self,
        item_id: LineItemId,
        requested: i64,
    ) -> Result<Outcome, CartError> {
        if requested < i64::from(Quantity::MIN) {
            return self.remove_item(item_id).await;
        }

        let quantity = Quantity::clamp(requested);
        let current = {
            let page = self.page.lock().await;
            page.cart
                .as_ref()
                .and_then(|cart| cart.item(item_id))
                .map(|item| item.quantity)
        };
        if current == Some(quantity) {
            debug!(%item_id, %quantity, "Quantity unchanged");
            return Ok(Outcome::Unchanged);
        }

        let id = item_id.to_string();
        let qty = quantity.to_string();
        error::add_breadcrumb(
            "cart",
            "Update quantity",
            Some(&[("item_id", id.as_str()), ("quantity", qty.as_str())]),
        );

        let result = self.api.update_quantity(item_id, quantity).await;
        let outcome = match result {
            Ok(()) => {
                info!(%item_id, %quantity, "Updated quantity");
                self.load_cart().await;
                Ok(Outcome::Applied)
            }
            Err(e) => {
                error::report(&e, Operation::UpdateQuantity);
                self.page
                    .lock()
                    .await
                    .alert(e.user_message(Operation::UpdateQuantity));
                Err(e)
            }
        };
        self.refresh_badge().await;
        outcome
    }

    /// Remove a line item after confirmation.
    ///
    /// The row shows as pending until the server answers; on success the
    /// cart is reloaded, on failure the row is restored.
    ///
    /// # Errors
    ///
    /// Returns the failure after it has been shown on the page.
    #[instrument(skip(self), fields(action_id = %Uuid::new_v4()))]
    pub async fn remove_item(&self, item_id: LineItemId) -> Result<Outcome, CartError> {
        if !self.prompt.confirm(CONFIRM_REMOVE_MESSAGE) {
            return Ok(Outcome::Cancelled);
        }

        self.set_removing(Some(item_id), true).await;
        let id = item_id.to_string();
        error::add_breadcrumb("cart", "Remove item", Some(&[("item_id", id.as_str())]));

        let outcome = match self.api.remove_item(item_id).await {
            Ok(()) => {
                info!(%item_id, "Removed from cart");
                self.load_cart().await;
                Ok(Outcome::Applied)
            }
            Err(e) => {
                error::report(&e, Operation::RemoveItem);
                self.set_removing(Some(item_id), false).await;
                self.page
                    .lock()
                    .await
                    .alert(e.user_message(Operation::RemoveItem));
                Err(e)
            }
        };
        self.refresh_badge().await;
        outcome
    }

    /// Empty the cart after confirmation.
    ///
    /// # Errors
    ///
    /// Returns the failure after it has been shown on the page.
    #[instrument(skip(self), fields(action_id = %Uuid::new_v4()))]
    pub async fn clear_cart(&self) -> Result<Outcome, CartError> {
        if !self.prompt.confirm(CONFIRM_CLEAR_MESSAGE) {
            return Ok(Outcome::Cancelled);
        }

        self.set_removing(None, true).await;
        error::add_breadcrumb("cart", "Clear cart", None);

        let outcome = match self.api.clear_cart().await {
            Ok(()) => {
                info!("Cleared cart");
                self.load_cart().await;
                Ok(Outcome::Applied)
            }
            Err(e) => {
                error::report(&e, Operation::ClearCart);
                self.set_removing(None, false).await;
                self.page
                    .lock()
                    .await
                    .alert(e.user_message(Operation::ClearCart));
                Err(e)
            }
        };
        self.refresh_badge().await;
        outcome
    }

    /// Mark one row, or every row when `item_id` is `None`.
    async fn set_removing(&self, item_id: Option<LineItemId>, removing: bool) {
        let mut page = self.page.lock().await;
        let Some(cart) = page.cart.as_mut() else {
            return;
        };
        match item_id {
            Some(id) => {
                cart.set_removing(id, removing);
            }
            None => cart.set_all_removing(removing),
        }
    }

    /// Request a payment session and hand the page the gateway form.
    ///
    /// Ignored (`Ok(None)`) off the cart page, with an empty cart, or while a
    /// checkout is already in progress. The loading overlay stays up on
    /// success, until the browser leaves for the gateway.
    ///
    /// # Errors
    ///
    /// Returns the failure after it has been shown on the page.
    #[instrument(skip(self), fields(action_id = %Uuid::new_v4()))]
    pub async fn start_checkout(&self) -> Result<Option<PaymentSession>, CartError> {
        {
            let mut page = self.page.lock().await;
            let enabled = page.cart.as_ref().is_some_and(view::CartView::checkout_enabled);
            if !enabled || page.overlay {
                debug!("Checkout unavailable");
                return Ok(None);
            }
            page.overlay = true;
            page.gateway = None;
        }
        error::add_breadcrumb("checkout", "Start payment", None);

        match self.api.start_payment().await {
            Ok(session) => {
                info!(gateway = %session.url, "Payment session created");
                self.page.lock().await.gateway = Some(session.clone());
                Ok(Some(session))
            }
            Err(e) => {
                error::report(&e, Operation::Checkout);
                let mut page = self.page.lock().await;
                page.overlay = false;
                page.alert(e.user_message(Operation::Checkout));
                Err(e)
            }
        }
    }
}
