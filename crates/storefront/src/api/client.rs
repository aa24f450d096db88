//! HTTP implementation of [`CartApi`].
//!
//! Uses `reqwest` with JSON bodies. Requests carry the configured session
//! cookie; the server answers 401 when it is missing or expired.

use std::sync::Arc;

use ferremas_core::{LineItem, LineItemId, ProductId, Quantity};
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::{Method, RequestBuilder, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use super::CartApi;
use super::types::{
    AddToCartRequest, AddedItem, ErrorBody, PaymentSession, PaymentSessionBody,
    UpdateQuantityRequest,
};
use crate::config::{ClientConfig, SessionCookie};
use crate::error::CartError;

/// Longest slice of a response body kept in logs.
const LOG_BODY_LIMIT: usize = 500;

/// Client for the Ferremas cart API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct HttpCartApi {
    inner: Arc<HttpCartApiInner>,
}

struct HttpCartApiInner {
    client: reqwest::Client,
    base_url: Url,
    session: Option<SessionCookie>,
}

impl HttpCartApi {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Http` if the HTTP client can't be built.
    pub fn new(config: &ClientConfig) -> Result<Self, CartError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        // Endpoint paths are joined relative to the base, so it must end in '/'
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(HttpCartApiInner {
                client,
                base_url,
                session: config.session.clone(),
            }),
        })
    }

    /// Resolve an endpoint path against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, CartError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self
            .inner
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");
        match &self.inner.session {
            Some(session) => request.header(COOKIE, session.header_value()),
            None => request,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, CartError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(CartError::Unauthenticated);
        }

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                "Cart server returned non-success status"
            );
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message);
            return Err(CartError::Server { status, message });
        }

        Ok(body)
    }

    /// Decode a JSON body, logging it when it doesn't match.
    fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, CartError> {
        serde_json::from_str(body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                "Failed to parse cart server response"
            );
            CartError::Parse(e)
        })
    }
}

impl CartApi for HttpCartApi {
    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<Vec<LineItem>, CartError> {
        let url = self.endpoint("api/cart")?;
        let body = self.send(self.request(Method::GET, url)).await?;
        let items: Vec<LineItem> = Self::decode(&body)?;
        debug!(items = items.len(), "Fetched cart");
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn add_item(
        &self,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<AddedItem, CartError> {
        let url = self.endpoint("api/cart/add")?;
        let request = self
            .request(Method::POST, url)
            .json(&AddToCartRequest {
                product_id,
                quantity,
            });
        let body = self.send(request).await?;
        // Older servers answer with an empty body
        if body.trim().is_empty() {
            return Ok(AddedItem::default());
        }
        Self::decode(&body)
    }

    #[instrument(skip(self))]
    async fn update_quantity(
        &self,
        item_id: LineItemId,
        quantity: Quantity,
    ) -> Result<(), CartError> {
        let url = self.endpoint(&format!("api/cart/update/{item_id}"))?;
        let request = self
            .request(Method::PUT, url)
            .json(&UpdateQuantityRequest { quantity });
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_item(&self, item_id: LineItemId) -> Result<(), CartError> {
        let url = self.endpoint(&format!("api/cart/remove/{item_id}"))?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<(), CartError> {
        let url = self.endpoint("api/cart/clear")?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn start_payment(&self) -> Result<PaymentSession, CartError> {
        let url = self.endpoint("iniciar-pago")?;
        let body = self.send(self.request(Method::POST, url)).await?;
        let session: PaymentSessionBody = Self::decode(&body)?;
        PaymentSession::try_from(session)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpCartApi {
        let config = ClientConfig::from_lookup(|key| {
            (key == "FERREMAS_BASE_URL").then(|| base.to_string())
        })
        .unwrap();
        HttpCartApi::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_joins_onto_origin() {
        let api = api("http://127.0.0.1:5000");
        assert_eq!(
            api.endpoint("api/cart").unwrap().as_str(),
            "http://127.0.0.1:5000/api/cart"
        );
        assert_eq!(
            api.endpoint("api/cart/remove/7").unwrap().as_str(),
            "http://127.0.0.1:5000/api/cart/remove/7"
        );
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let api = api("https://ferremas.cl/tienda");
        assert_eq!(
            api.endpoint("iniciar-pago").unwrap().as_str(),
            "https://ferremas.cl/tienda/iniciar-pago"
        );
    }
}
