//! Request and response bodies for the cart server.

use ferremas_core::{LineItemId, ProductId, Quantity};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CartError;

/// Body of `POST /api/cart/add`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// Body of `PUT /api/cart/update/{id}`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UpdateQuantityRequest {
    pub quantity: Quantity,
}

/// Response of a successful add.
///
/// The server echoes the line item it created or bumped; only the quantity is
/// guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct AddedItem {
    #[serde(default)]
    pub id: Option<LineItemId>,
    #[serde(default)]
    pub quantity: Option<Quantity>,
}

/// Error body the server sends with non-success statuses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// The most specific message available.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message)
    }
}

/// Raw body of `POST /iniciar-pago`; both fields are validated before use.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentSessionBody {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A validated payment gateway session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    /// Gateway transaction token, posted as `token_ws`.
    pub token: String,
    /// Gateway endpoint the form posts to.
    pub url: Url,
}

impl TryFrom<PaymentSessionBody> for PaymentSession {
    type Error = CartError;

    fn try_from(body: PaymentSessionBody) -> Result<Self, Self::Error> {
        let token = body
            .token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| CartError::InvalidPaymentSession("missing token".to_string()))?;
        let url = body
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| CartError::InvalidPaymentSession("missing url".to_string()))?;
        let url = Url::parse(&url)
            .map_err(|e| CartError::InvalidPaymentSession(format!("bad url: {e}")))?;

        Ok(Self { token, url })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_bodies() {
        let body = AddToCartRequest {
            product_id: ProductId::new(12),
            quantity: Quantity::clamp(3),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"product_id":12,"quantity":3}"#
        );
        let body = UpdateQuantityRequest {
            quantity: Quantity::clamp(120),
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"quantity":99}"#);
    }

    #[test]
    fn test_error_body_prefers_error_field() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error": "Producto no encontrado", "message": "x"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Producto no encontrado"));

        let body: ErrorBody = serde_json::from_str(r#"{"message": "Datos inválidos"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Datos inválidos"));

        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.into_message(), None);
    }

    #[test]
    fn test_added_item_tolerates_partial_body() {
        let added: AddedItem = serde_json::from_str(r#"{"quantity": 2}"#).unwrap();
        assert_eq!(added.quantity, Some(Quantity::clamp(2)));
        assert_eq!(added.id, None);
    }

    #[test]
    fn test_payment_session_validation() {
        let session = PaymentSession::try_from(PaymentSessionBody {
            token: Some("01ab".to_string()),
            url: Some("https://webpay3gint.transbank.cl/webpayserver/initTransaction".to_string()),
        })
        .unwrap();
        assert_eq!(session.token, "01ab");
        assert_eq!(session.url.host_str(), Some("webpay3gint.transbank.cl"));

        let missing_token = PaymentSession::try_from(PaymentSessionBody {
            token: None,
            url: Some("https://gateway.example/pay".to_string()),
        });
        assert!(matches!(missing_token, Err(CartError::InvalidPaymentSession(_))));

        let missing_url = PaymentSession::try_from(PaymentSessionBody {
            token: Some("01ab".to_string()),
            url: Some(String::new()),
        });
        assert!(matches!(missing_url, Err(CartError::InvalidPaymentSession(_))));

        let bad_url = PaymentSession::try_from(PaymentSessionBody {
            token: Some("01ab".to_string()),
            url: Some("not a url".to_string()),
        });
        assert!(matches!(bad_url, Err(CartError::InvalidPaymentSession(_))));
    }
}
