//! Subcommand implementations.
//!
//! Each command builds the page it acts on, runs the same controller actions
//! a browser would, and prints the outcome.

pub mod cart;
pub mod checkout;

use std::io::{BufRead, Write};

use ferremas_storefront::api::HttpCartApi;
use ferremas_storefront::config::ClientConfig;
use ferremas_storefront::error::CartError;
use ferremas_storefront::view::{Page, RenderError};
use ferremas_storefront::{CartController, Prompt};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Cart server call failed.
    #[error("{0}")]
    Cart(#[from] CartError),

    /// Rendering failed.
    #[error("{0}")]
    Render(#[from] RenderError),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Checkout needs something in the cart.
    #[error("El carrito está vacío")]
    EmptyCart,
}

/// Confirmation for destructive commands.
#[derive(Debug, Clone, Copy)]
pub enum CliPrompt {
    /// `--yes` was given.
    AssumeYes,
    /// Ask on the terminal.
    Interactive,
}

impl CliPrompt {
    pub const fn new(yes: bool) -> Self {
        if yes { Self::AssumeYes } else { Self::Interactive }
    }
}

impl Prompt for CliPrompt {
    fn confirm(&self, message: &str) -> bool {
        match self {
            Self::AssumeYes => true,
            Self::Interactive => {
                let mut stderr = std::io::stderr().lock();
                if write!(stderr, "{message} [s/N] ").and_then(|()| stderr.flush()).is_err() {
                    return false;
                }
                let mut answer = String::new();
                if std::io::stdin().lock().read_line(&mut answer).is_err() {
                    return false;
                }
                matches!(answer.trim().to_lowercase().as_str(), "s" | "si" | "sí" | "y" | "yes")
            }
        }
    }
}

/// Controller talking to the configured server.
pub fn controller(
    config: &ClientConfig,
    prompt: CliPrompt,
    page: Page,
) -> Result<CartController<HttpCartApi, CliPrompt>, CommandError> {
    let api = HttpCartApi::new(config)?;
    Ok(CartController::new(api, prompt, page))
}

/// Print alerts the controller raised.
pub fn print_alerts(alerts: &[String]) -> std::io::Result<()> {
    let mut stderr = std::io::stderr().lock();
    for alert in alerts {
        writeln!(stderr, "{alert}")?;
    }
    Ok(())
}
