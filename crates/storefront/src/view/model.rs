//! The page view-model.
//!
//! [`Page`] is the single source of truth for everything the cart client
//! shows. Controller actions mutate it; [`super::render`] turns it into DOM
//! patches. Cart contents only ever come from a server response.

use ferremas_core::{CartTotals, LineItem, LineItemId, ProductId};
use tracing::warn;

use crate::api::PaymentSession;
use crate::config::DisplayConfig;
use crate::stepper::QuantityStepper;

/// Orders loads of the same resource so an older response can't overwrite a
/// newer one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSequence {
    issued: u64,
    applied: u64,
}

/// Handle for one in-flight load, taken before the request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadSequence {
    /// Take a ticket for a load about to be issued.
    pub const fn begin(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket(self.issued)
    }

    /// Whether the response for `ticket` may be applied; marks it applied if so.
    ///
    /// A response is stale once a later-issued load has been applied.
    pub const fn accept(&mut self, ticket: LoadTicket) -> bool {
        if ticket.0 <= self.applied {
            return false;
        }
        self.applied = ticket.0;
        true
    }
}

/// One rendered cart row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRow {
    pub item: LineItem,
    /// Removal requested and awaiting the server.
    pub removing: bool,
}

/// Cart contents and derived totals, as last confirmed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartView {
    rows: Vec<CartRow>,
    totals: CartTotals,
    loads: LoadSequence,
}

impl CartView {
    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the contents with `items` and recompute totals.
    ///
    /// Items whose totals can't be computed leave the cart empty, the same
    /// as a failed fetch.
    pub fn replace(&mut self, items: Vec<LineItem>, display: &DisplayConfig) {
        match CartTotals::compute(&items, display.tax_model) {
            Ok(totals) => {
                self.totals = totals;
                self.rows = items
                    .into_iter()
                    .map(|item| CartRow {
                        item,
                        removing: false,
                    })
                    .collect();
            }
            Err(e) => {
                warn!(error = %e, items = items.len(), "Cart totals out of range; showing it empty");
                self.totals = CartTotals::ZERO;
                self.rows = Vec::new();
            }
        }
    }

    /// Take a ticket for a cart fetch about to be issued.
    pub const fn begin_load(&mut self) -> LoadTicket {
        self.loads.begin()
    }

    /// Apply a fetched cart unless a newer fetch was applied first.
    ///
    /// Returns whether the contents changed hands.
    pub fn apply(
        &mut self,
        ticket: LoadTicket,
        items: Vec<LineItem>,
        display: &DisplayConfig,
    ) -> bool {
        if !self.loads.accept(ticket) {
            return false;
        }
        self.replace(items, display);
        true
    }

    /// Rows in server order.
    #[must_use]
    pub fn rows(&self) -> &[CartRow] {
        &self.rows
    }

    /// Totals derived from the current rows.
    #[must_use]
    pub const fn totals(&self) -> CartTotals {
        self.totals
    }

    /// Number of line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Checkout is only possible with something in the cart.
    #[must_use]
    pub fn checkout_enabled(&self) -> bool {
        !self.is_empty()
    }

    /// Find a line item by id.
    #[must_use]
    pub fn item(&self, id: LineItemId) -> Option<&LineItem> {
        self.rows.iter().map(|row| &row.item).find(|item| item.id == id)
    }

    /// Mark or unmark a row as awaiting removal. Returns whether the row exists.
    pub fn set_removing(&mut self, id: LineItemId, removing: bool) -> bool {
        let Some(row) = self.rows.iter_mut().find(|row| row.item.id == id) else {
            return false;
        };
        row.removing = removing;
        true
    }

    /// Mark or unmark every row as awaiting removal.
    pub fn set_all_removing(&mut self, removing: bool) {
        for row in &mut self.rows {
            row.removing = removing;
        }
    }
}

/// Cart badge state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Badge {
    /// Not shown: anonymous user, failed fetch, or empty cart.
    #[default]
    Hidden,
    /// Shown with the number of line items (always > 0).
    Count(usize),
}

impl Badge {
    /// Badge for a cart with `count` line items.
    #[must_use]
    pub const fn from_count(count: usize) -> Self {
        if count == 0 {
            Self::Hidden
        } else {
            Self::Count(count)
        }
    }

    /// Text to show, capped at `cap` (e.g. "9+"), or `None` when hidden.
    #[must_use]
    pub fn display(self, cap: usize) -> Option<String> {
        match self {
            Self::Hidden => None,
            Self::Count(count) if count > cap => Some(format!("{cap}+")),
            Self::Count(count) => Some(count.to_string()),
        }
    }
}

/// Severity of a notice; maps onto the alert styles of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Danger,
}

impl NoticeLevel {
    /// CSS modifier class.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "alert-success",
            Self::Warning => "alert-warning",
            Self::Danger => "alert-danger",
        }
    }
}

/// A link inside a notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeLink {
    pub href: String,
    pub label: String,
}

/// Feedback shown in the add-result area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub link: Option<NoticeLink>,
}

impl Notice {
    /// Product added successfully.
    #[must_use]
    pub fn added() -> Self {
        Self {
            level: NoticeLevel::Success,
            message: "Producto añadido al carrito correctamente.".to_string(),
            link: Some(NoticeLink {
                href: "/carrito".to_string(),
                label: "Ver carrito".to_string(),
            }),
        }
    }

    /// The user must log in first.
    #[must_use]
    pub fn login_required() -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: crate::error::LOGIN_REQUIRED_MESSAGE.to_string(),
            link: Some(NoticeLink {
                href: "/login".to_string(),
                label: "Iniciar sesión".to_string(),
            }),
        }
    }

    /// An operation failed.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Danger,
            message: message.into(),
            link: None,
        }
    }
}

/// Which elements of the DOM contract a page carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageLayout {
    /// Quantity stepper (`quantity` and its buttons).
    pub stepper: bool,
    /// `add-result` feedback area.
    pub add_result: bool,
    /// Cart listing (`cart-items` and totals).
    pub cart: bool,
    /// `cart-count` badge.
    pub badge: bool,
}

/// Everything the cart client displays on one page.
#[derive(Debug, Clone)]
pub struct Page {
    pub display: DisplayConfig,
    /// Value of the `user-status` flag.
    pub user_authenticated: bool,
    /// Value of the `product-id` field.
    pub product_id: Option<ProductId>,
    pub stepper: Option<QuantityStepper>,
    has_add_result: bool,
    pub add_result: Option<Notice>,
    /// Present only on the cart page.
    pub cart: Option<CartView>,
    has_badge: bool,
    pub badge: Badge,
    badge_loads: LoadSequence,
    /// Loading overlay shown during checkout.
    pub overlay: bool,
    /// Set once the server handed out a payment session; the page then
    /// submits the gateway form.
    pub gateway: Option<PaymentSession>,
    alerts: Vec<String>,
}

impl Page {
    /// A page with the given layout.
    #[must_use]
    pub fn new(layout: PageLayout, display: DisplayConfig, user_authenticated: bool) -> Self {
        Self {
            display,
            user_authenticated,
            product_id: None,
            stepper: layout.stepper.then(QuantityStepper::default),
            has_add_result: layout.add_result,
            add_result: None,
            cart: layout.cart.then(CartView::empty),
            has_badge: layout.badge,
            badge: Badge::Hidden,
            badge_loads: LoadSequence::default(),
            overlay: false,
            gateway: None,
            alerts: Vec::new(),
        }
    }

    /// The cart page: listing, totals, checkout and badge.
    #[must_use]
    pub fn cart_page(display: DisplayConfig, user_authenticated: bool) -> Self {
        Self::new(
            PageLayout {
                cart: true,
                badge: true,
                ..PageLayout::default()
            },
            display,
            user_authenticated,
        )
    }

    /// A product page: stepper, add-to-cart and badge.
    #[must_use]
    pub fn product_page(
        display: DisplayConfig,
        product_id: ProductId,
        user_authenticated: bool,
    ) -> Self {
        let mut page = Self::new(
            PageLayout {
                stepper: true,
                add_result: true,
                badge: true,
                ..PageLayout::default()
            },
            display,
            user_authenticated,
        );
        page.product_id = Some(product_id);
        page
    }

    /// Any other page: only the badge.
    #[must_use]
    pub fn plain_page(display: DisplayConfig, user_authenticated: bool) -> Self {
        Self::new(
            PageLayout {
                badge: true,
                ..PageLayout::default()
            },
            display,
            user_authenticated,
        )
    }

    /// Whether this is the cart page.
    #[must_use]
    pub const fn is_cart_page(&self) -> bool {
        self.cart.is_some()
    }

    /// Whether the page carries the badge.
    #[must_use]
    pub const fn has_badge(&self) -> bool {
        self.has_badge
    }

    /// Replace the cart listing with `items` unconditionally.
    ///
    /// Does nothing off the cart page.
    pub fn update_cart_ui(&mut self, items: Vec<LineItem>) {
        let display = self.display;
        if let Some(cart) = self.cart.as_mut() {
            cart.replace(items, &display);
        }
    }

    /// Take a ticket for a cart fetch; `None` off the cart page.
    pub fn begin_cart_load(&mut self) -> Option<LoadTicket> {
        self.cart.as_mut().map(CartView::begin_load)
    }

    /// Apply a fetched cart unless a newer one was applied first.
    pub fn apply_cart(&mut self, ticket: LoadTicket, items: Vec<LineItem>) -> bool {
        let display = self.display;
        self.cart
            .as_mut()
            .is_some_and(|cart| cart.apply(ticket, items, &display))
    }

    /// Take a ticket for a badge fetch.
    pub const fn begin_badge_load(&mut self) -> LoadTicket {
        self.badge_loads.begin()
    }

    /// Apply a badge result unless a newer one was applied first.
    pub const fn apply_badge(&mut self, ticket: LoadTicket, badge: Badge) -> bool {
        if !self.badge_loads.accept(ticket) {
            return false;
        }
        self.badge = badge;
        true
    }

    /// Show feedback for an add-to-cart attempt.
    ///
    /// Pages without an `add-result` area fall back to an alert.
    pub fn show_add_result(&mut self, notice: Notice) {
        if self.has_add_result {
            self.add_result = Some(notice);
        } else {
            self.alerts.push(notice.message);
        }
    }

    /// Queue a blocking alert.
    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    /// Alerts not yet shown.
    #[must_use]
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Drain alerts once shown.
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }
}
