//! Turn a [`Page`] into DOM patches.
//!
//! Rendering is pure: the same page always yields the same patches, in the
//! same order. Whatever applies them (a browser shim, the CLI, a test) only
//! has to look elements up by [`ElementRole`].

use askama::Template;
use ferremas_core::{CartTotals, CurrencyCode, Price};

use super::RenderError;
use super::model::{CartView, Page};
use super::templates::{
    CartItemsTemplate, GatewayFormTemplate, LoadingOverlayTemplate, NoticeTemplate,
    RedirectPageTemplate,
};
use crate::api::PaymentSession;
use crate::bindings::ElementRole;

/// One change to apply to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Replace the inner HTML of an element.
    SetHtml { role: ElementRole, html: String },
    /// Replace the text content of an element.
    SetText { role: ElementRole, text: String },
    /// Set the value of an input.
    SetValue { role: ElementRole, value: String },
    SetVisible { role: ElementRole, visible: bool },
    SetDisabled { role: ElementRole, disabled: bool },
    /// Show a blocking alert.
    Alert(String),
}

/// Patches produced by one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub patches: Vec<Patch>,
}

impl Rendered {
    fn push(&mut self, patch: Patch) {
        self.patches.push(patch);
    }

    /// Last text set on `role`.
    #[must_use]
    pub fn text(&self, role: ElementRole) -> Option<&str> {
        self.patches.iter().rev().find_map(|patch| match patch {
            Patch::SetText { role: r, text } if *r == role => Some(text.as_str()),
            _ => None,
        })
    }

    /// Last HTML set on `role`.
    #[must_use]
    pub fn html(&self, role: ElementRole) -> Option<&str> {
        self.patches.iter().rev().find_map(|patch| match patch {
            Patch::SetHtml { role: r, html } if *r == role => Some(html.as_str()),
            _ => None,
        })
    }

    /// Last value set on `role`.
    #[must_use]
    pub fn value(&self, role: ElementRole) -> Option<&str> {
        self.patches.iter().rev().find_map(|patch| match patch {
            Patch::SetValue { role: r, value } if *r == role => Some(value.as_str()),
            _ => None,
        })
    }

    /// Last visibility set on `role`.
    #[must_use]
    pub fn visible(&self, role: ElementRole) -> Option<bool> {
        self.patches.iter().rev().find_map(|patch| match patch {
            Patch::SetVisible { role: r, visible } if *r == role => Some(*visible),
            _ => None,
        })
    }

    /// Last disabled state set on `role`.
    #[must_use]
    pub fn disabled(&self, role: ElementRole) -> Option<bool> {
        self.patches.iter().rev().find_map(|patch| match patch {
            Patch::SetDisabled { role: r, disabled } if *r == role => Some(*disabled),
            _ => None,
        })
    }

    /// Alerts in the order they were raised.
    pub fn alerts(&self) -> impl Iterator<Item = &str> {
        self.patches.iter().filter_map(|patch| match patch {
            Patch::Alert(message) => Some(message.as_str()),
            _ => None,
        })
    }
}

/// Render every element the page carries.
///
/// # Errors
///
/// Returns `RenderError::Template` if a template fails to render.
pub fn render(page: &Page) -> Result<Rendered, RenderError> {
    let mut out = Rendered::default();

    if let Some(stepper) = &page.stepper {
        out.push(Patch::SetValue {
            role: ElementRole::Quantity,
            value: stepper.value().to_string(),
        });
    }

    if let Some(notice) = &page.add_result {
        out.push(Patch::SetHtml {
            role: ElementRole::AddResult,
            html: NoticeTemplate::from(notice).render()?,
        });
    }

    if let Some(cart) = &page.cart {
        render_cart(&mut out, cart, page.display.currency, page.overlay)?;
    }

    if page.has_badge() {
        let text = page.badge.display(page.display.badge_cap);
        out.push(Patch::SetVisible {
            role: ElementRole::CartCount,
            visible: text.is_some(),
        });
        if let Some(text) = text {
            out.push(Patch::SetText {
                role: ElementRole::CartCount,
                text,
            });
        }
    }

    if page.is_cart_page() {
        if page.overlay {
            out.push(Patch::SetHtml {
                role: ElementRole::LoadingOverlay,
                html: LoadingOverlayTemplate::default().render()?,
            });
        }
        out.push(Patch::SetVisible {
            role: ElementRole::LoadingOverlay,
            visible: page.overlay,
        });
    }

    if let Some(session) = &page.gateway {
        out.push(Patch::SetHtml {
            role: ElementRole::GatewayForm,
            html: GatewayFormTemplate::from(session).render()?,
        });
    }

    for alert in page.alerts() {
        out.push(Patch::Alert(alert.clone()));
    }

    Ok(out)
}

fn render_cart(
    out: &mut Rendered,
    cart: &CartView,
    currency: CurrencyCode,
    overlay: bool,
) -> Result<(), RenderError> {
    let (html, totals) = if cart.is_empty() {
        (String::new(), CartTotals::ZERO)
    } else {
        (render_cart_items(cart, currency)?, cart.totals())
    };

    out.push(Patch::SetHtml {
        role: ElementRole::CartItems,
        html,
    });
    out.push(Patch::SetVisible {
        role: ElementRole::EmptyCartMessage,
        visible: cart.is_empty(),
    });
    out.push(Patch::SetDisabled {
        role: ElementRole::CheckoutButton,
        disabled: !cart.checkout_enabled() || overlay,
    });
    out.push(Patch::SetDisabled {
        role: ElementRole::ClearCartButton,
        disabled: cart.is_empty(),
    });

    for (role, amount) in [
        (ElementRole::CartSubtotal, totals.subtotal),
        (ElementRole::CartTax, totals.tax),
        (ElementRole::CartTotal, totals.total),
    ] {
        out.push(Patch::SetText {
            role,
            text: Price::new(amount, currency).display(),
        });
    }
    Ok(())
}

/// Render the cart rows fragment.
///
/// # Errors
///
/// Returns `RenderError::Template` if the template fails to render.
pub fn render_cart_items(cart: &CartView, currency: CurrencyCode) -> Result<String, RenderError> {
    Ok(CartItemsTemplate::new(cart.rows(), currency).render()?)
}

/// Render a standalone page that posts the payment token to the gateway.
///
/// # Errors
///
/// Returns `RenderError::Template` if the template fails to render.
pub fn render_redirect_page(session: &PaymentSession) -> Result<String, RenderError> {
    Ok(RedirectPageTemplate::from(session).render()?)
}
