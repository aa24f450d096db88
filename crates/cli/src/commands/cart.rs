//! Cart commands.

use std::io::Write;

use ferremas_core::{LineItemId, Price, ProductId};
use ferremas_storefront::api::HttpCartApi;
use ferremas_storefront::bindings::{ElementRole, UiEvent};
use ferremas_storefront::config::ClientConfig;
use ferremas_storefront::error::CartError;
use ferremas_storefront::view::{self, CartView, Page};
use ferremas_storefront::{CartController, Outcome};

use super::{CliPrompt, CommandError, controller, print_alerts};

fn cart_page(config: &ClientConfig) -> Page {
    Page::cart_page(config.display, config.is_authenticated())
}

/// Print the cart rows and totals.
pub async fn show(config: &ClientConfig, html: bool) -> Result<(), CommandError> {
    let controller = controller(config, CliPrompt::AssumeYes, cart_page(config))?;
    controller.page_loaded().await;
    let page = controller.snapshot().await;
    let Some(cart) = page.cart.as_ref() else {
        return Ok(());
    };

    if html {
        let rows = view::render_cart_items(cart, config.display.currency)?;
        writeln!(std::io::stdout().lock(), "{rows}")?;
        return Ok(());
    }
    write_summary(cart, config)
}

fn write_summary(cart: &CartView, config: &ClientConfig) -> Result<(), CommandError> {
    let currency = config.display.currency;
    let mut out = std::io::stdout().lock();

    if cart.is_empty() {
        writeln!(out, "Tu carrito está vacío.")?;
    }
    for row in cart.rows() {
        let item = &row.item;
        writeln!(
            out,
            "{:>6}  {:<36} {:>2} x {:>12} = {:>12}",
            item.id,
            item.product.name,
            item.quantity,
            Price::new(item.product.price, currency).display(),
            item.line_total()
                .map(|total| Price::new(total, currency).display())
                .unwrap_or_default(),
        )?;
    }

    let totals = cart.totals();
    writeln!(out)?;
    writeln!(out, "Subtotal: {}", Price::new(totals.subtotal, currency).display())?;
    writeln!(out, "IVA:      {}", Price::new(totals.tax, currency).display())?;
    writeln!(out, "Total:    {}", Price::new(totals.total, currency).display())?;
    Ok(())
}

/// Add a product with the given quantity text, as the product page would.
pub async fn add(
    config: &ClientConfig,
    product_id: ProductId,
    quantity: &str,
) -> Result<(), CommandError> {
    let page = Page::product_page(config.display, product_id, config.is_authenticated());
    let controller = controller(config, CliPrompt::AssumeYes, page)?;

    controller
        .dispatch(UiEvent::change(ElementRole::Quantity, quantity))
        .await?;
    let result = controller.add_to_cart(None).await;

    let page = controller.snapshot().await;
    let mut out = std::io::stdout().lock();
    if let Some(notice) = &page.add_result {
        writeln!(out, "{}", notice.message)?;
    }
    if let Some(badge) = page.badge.display(config.display.badge_cap) {
        writeln!(out, "Productos en el carrito: {badge}")?;
    }
    drop(out);

    result?;
    Ok(())
}

/// Set a line item's quantity; 0 or less removes it.
pub async fn update(
    config: &ClientConfig,
    item_id: LineItemId,
    quantity: i64,
    yes: bool,
) -> Result<(), CommandError> {
    let controller = controller(config, CliPrompt::new(yes), cart_page(config))?;
    controller.page_loaded().await;
    let result = controller.update_quantity(item_id, quantity).await;
    finish(&controller, config, result).await
}

/// Remove a line item.
pub async fn remove(config: &ClientConfig, item_id: LineItemId, yes: bool) -> Result<(), CommandError> {
    let controller = controller(config, CliPrompt::new(yes), cart_page(config))?;
    controller.page_loaded().await;
    let result = controller.remove_item(item_id).await;
    finish(&controller, config, result).await
}

/// Empty the cart.
pub async fn clear(config: &ClientConfig, yes: bool) -> Result<(), CommandError> {
    let controller = controller(config, CliPrompt::new(yes), cart_page(config))?;
    controller.page_loaded().await;
    let result = controller.clear_cart().await;
    finish(&controller, config, result).await
}

/// Print the badge as the page header would show it.
pub async fn badge(config: &ClientConfig) -> Result<(), CommandError> {
    let page = Page::plain_page(config.display, config.is_authenticated());
    let controller = controller(config, CliPrompt::AssumeYes, page)?;
    controller.refresh_badge().await;

    let badge = controller.snapshot().await.badge;
    let text = badge
        .display(config.display.badge_cap)
        .unwrap_or_else(|| "oculto".to_string());
    writeln!(std::io::stdout().lock(), "{text}")?;
    Ok(())
}

async fn finish(
    controller: &CartController<HttpCartApi, CliPrompt>,
    config: &ClientConfig,
    result: Result<Outcome, CartError>,
) -> Result<(), CommandError> {
    print_alerts(&controller.take_alerts().await)?;
    let outcome = result?;

    match outcome {
        Outcome::Applied => {
            let page = controller.snapshot().await;
            if let Some(cart) = page.cart.as_ref() {
                write_summary(cart, config)?;
            }
        }
        Outcome::Unchanged => writeln!(std::io::stdout().lock(), "Cantidad sin cambios.")?,
        Outcome::Cancelled => writeln!(std::io::stdout().lock(), "Cancelado.")?,
        Outcome::Ignored => writeln!(std::io::stdout().lock(), "Nada que hacer.")?,
    }
    Ok(())
}
