//! Page state and rendering.
//!
//! - `model` holds the view-model the controller mutates
//! - `render` turns it into [`Patch`]es, using the askama templates in
//!   `templates/` for HTML fragments

mod model;
mod render;
mod templates;

use thiserror::Error;

pub use model::{
    Badge, CartRow, CartView, LoadSequence, LoadTicket, Notice, NoticeLevel, NoticeLink, Page,
    PageLayout,
};
pub use render::{Patch, Rendered, render, render_cart_items, render_redirect_page};
pub use templates::GATEWAY_TOKEN_FIELD;

/// Errors from rendering the page.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}
