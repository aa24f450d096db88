//! Checkout command.
//!
//! A terminal can't follow the gateway's form post, so the auto-submitting
//! redirect page is written out instead; opening it in a browser continues
//! the payment.

use std::io::Write;
use std::path::PathBuf;

use ferremas_storefront::config::ClientConfig;
use ferremas_storefront::view::{self, Page};

use super::{CliPrompt, CommandError, controller, print_alerts};

/// Start a payment session and write the gateway redirect page.
pub async fn checkout(config: &ClientConfig, output: Option<PathBuf>) -> Result<(), CommandError> {
    let page = Page::cart_page(config.display, config.is_authenticated());
    let controller = controller(config, CliPrompt::AssumeYes, page)?;
    controller.page_loaded().await;

    let result = controller.start_checkout().await;
    print_alerts(&controller.take_alerts().await)?;
    let session = result?.ok_or(CommandError::EmptyCart)?;

    let html = view::render_redirect_page(&session)?;
    match output {
        Some(path) => {
            std::fs::write(&path, html)?;
            tracing::info!(path = %path.display(), "Wrote payment redirect page");
        }
        None => writeln!(std::io::stdout().lock(), "{html}")?,
    }
    Ok(())
}
