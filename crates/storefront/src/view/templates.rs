//! Askama templates for the fragments the cart client injects into pages.

use askama::Template;
use ferremas_core::types::line_item::FALLBACK_IMAGE;
use ferremas_core::{CurrencyCode, Price, Quantity};

use super::model::{CartRow, Notice};
use crate::api::PaymentSession;

/// Form field the payment gateway reads the token from.
pub const GATEWAY_TOKEN_FIELD: &str = "token_ws";

/// Cart row display data for templates.
#[derive(Debug, Clone)]
pub struct CartRowView {
    pub id: i32,
    pub name: String,
    pub image_src: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
    pub removing: bool,
}

impl CartRowView {
    /// Format a row for display.
    #[must_use]
    pub fn new(row: &CartRow, currency: CurrencyCode) -> Self {
        let item = &row.item;
        Self {
            id: item.id.as_i32(),
            name: item.product.name.clone(),
            image_src: item.product.image_src(),
            unit_price: Price::new(item.product.price, currency).display(),
            quantity: item.quantity.get(),
            line_total: item
                .line_total()
                .map(|total| Price::new(total, currency).display())
                .unwrap_or_default(),
            removing: row.removing,
        }
    }
}

/// Cart rows fragment, rendered into `cart-items`.
#[derive(Template)]
#[template(path = "cart/items.html")]
pub struct CartItemsTemplate {
    pub rows: Vec<CartRowView>,
    pub fallback_image: &'static str,
    pub min_quantity: u32,
    pub max_quantity: u32,
}

impl CartItemsTemplate {
    /// Template for the given rows.
    #[must_use]
    pub fn new(rows: &[CartRow], currency: CurrencyCode) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| CartRowView::new(row, currency))
                .collect(),
            fallback_image: FALLBACK_IMAGE,
            min_quantity: Quantity::MIN.get(),
            max_quantity: Quantity::MAX.get(),
        }
    }
}

/// Notice fragment, rendered into `add-result`.
#[derive(Template)]
#[template(path = "partials/notice.html")]
pub struct NoticeTemplate {
    pub level_class: &'static str,
    pub message: String,
    pub has_link: bool,
    pub link_href: String,
    pub link_label: String,
}

impl From<&Notice> for NoticeTemplate {
    fn from(notice: &Notice) -> Self {
        let (link_href, link_label) = notice
            .link
            .as_ref()
            .map(|link| (link.href.clone(), link.label.clone()))
            .unwrap_or_default();
        Self {
            level_class: notice.level.css_class(),
            message: notice.message.clone(),
            has_link: notice.link.is_some(),
            link_href,
            link_label,
        }
    }
}

/// Blocking overlay shown while checkout is in progress.
#[derive(Template)]
#[template(path = "partials/loading_overlay.html")]
pub struct LoadingOverlayTemplate {
    pub message: &'static str,
}

impl Default for LoadingOverlayTemplate {
    fn default() -> Self {
        Self {
            message: "Procesando pago...",
        }
    }
}

/// Hidden auto-submitting form that hands the token to the gateway.
#[derive(Template)]
#[template(path = "checkout/gateway_form.html")]
pub struct GatewayFormTemplate {
    pub action: String,
    pub token_field: &'static str,
    pub token: String,
}

impl From<&PaymentSession> for GatewayFormTemplate {
    fn from(session: &PaymentSession) -> Self {
        Self {
            action: session.url.to_string(),
            token_field: GATEWAY_TOKEN_FIELD,
            token: session.token.clone(),
        }
    }
}

/// Standalone page wrapping the gateway form, for clients without a DOM.
#[derive(Template)]
#[template(path = "checkout/redirect.html")]
pub struct RedirectPageTemplate {
    pub action: String,
    pub token_field: &'static str,
    pub token: String,
}

impl From<&PaymentSession> for RedirectPageTemplate {
    fn from(session: &PaymentSession) -> Self {
        let form = GatewayFormTemplate::from(session);
        Self {
            action: form.action,
            token_field: form.token_field,
            token: form.token,
        }
    }
}
