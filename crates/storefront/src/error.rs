//! Unified error handling with Sentry integration.
//!
//! Every failed cart operation ends up as a [`CartError`]. Transport and
//! decode failures are captured to Sentry; business errors reported by the
//! server are only logged, since they are expected outcomes of user input.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors from talking to the cart server.
#[derive(Debug, Error)]
pub enum CartError {
    /// The user has no session, or the server rejected it.
    #[error("Authentication required")]
    Unauthenticated,

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Server {
        status: StatusCode,
        /// Message from the response body's `error` or `message` field.
        message: Option<String>,
    },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Payment session response lacked a usable token or URL.
    #[error("Invalid payment session: {0}")]
    InvalidPaymentSession(String),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Coarse classification of a [`CartError`], used to pick user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Login required; never retried automatically.
    AuthenticationRequired,
    /// Network, transport or decode failure.
    Transport,
    /// The server refused the operation (invalid quantity, no stock, ...).
    Business,
    /// Checkout can't continue with the session the server returned.
    PaymentSession,
}

/// The user action an error interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AddToCart,
    UpdateQuantity,
    RemoveItem,
    ClearCart,
    Checkout,
}

impl Operation {
    /// Generic message shown when the server gave no details.
    #[must_use]
    pub const fn fallback_message(self) -> &'static str {
        match self {
            Self::AddToCart => "Error al añadir al carrito",
            Self::UpdateQuantity => "Error al actualizar la cantidad",
            Self::RemoveItem => "Error al eliminar el producto",
            Self::ClearCart => "Error al vaciar el carrito",
            Self::Checkout => {
                "Ha ocurrido un error al procesar el pago. Por favor, intente nuevamente."
            }
        }
    }
}

impl CartError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::AuthenticationRequired,
            Self::Http(_) | Self::Parse(_) | Self::InvalidUrl(_) => ErrorKind::Transport,
            Self::Server { .. } => ErrorKind::Business,
            Self::InvalidPaymentSession(_) => ErrorKind::PaymentSession,
        }
    }

    /// Message to show the user for a failed operation.
    ///
    /// Server-reported messages are shown verbatim. Checkout failures always
    /// use the generic retry message.
    #[must_use]
    pub fn user_message(&self, operation: Operation) -> String {
        if operation == Operation::Checkout {
            return operation.fallback_message().to_string();
        }
        match self {
            Self::Unauthenticated if operation == Operation::AddToCart => {
                LOGIN_REQUIRED_MESSAGE.to_string()
            }
            Self::Unauthenticated => SESSION_EXPIRED_MESSAGE.to_string(),
            Self::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => operation.fallback_message().to_string(),
        }
    }
}

/// Shown when adding to the cart needs a logged-in user.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Debes iniciar sesión para añadir productos al carrito.";

/// Shown when any other cart change is rejected for lack of a session.
pub const SESSION_EXPIRED_MESSAGE: &str =
    "Tu sesión ha expirado. Por favor, inicia sesión nuevamente.";

/// Log an error and capture unexpected ones to Sentry.
///
/// Transport failures are unexpected; business and auth errors are outcomes
/// of user input and are only logged.
pub fn report(error: &CartError, operation: Operation) {
    match error.kind() {
        ErrorKind::Transport | ErrorKind::PaymentSession => {
            let event_id = sentry::capture_error(error);
            tracing::error!(
                error = %error,
                operation = ?operation,
                sentry_event_id = %event_id,
                "Cart operation failed"
            );
        }
        ErrorKind::AuthenticationRequired | ErrorKind::Business => {
            tracing::warn!(error = %error, operation = ?operation, "Cart operation rejected");
        }
    }
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// actions leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
