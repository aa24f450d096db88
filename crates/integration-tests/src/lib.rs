//! Integration tests for the Ferremas cart client.
//!
//! [`MockServer`] is an in-process axum stand-in for the Ferremas cart
//! server. It binds an ephemeral port on 127.0.0.1, keeps the cart in memory,
//! and checks the session cookie the way the real server does. Tests drive
//! the real `HttpCartApi` and `CartController` against it.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ferremas-integration-tests
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, State};
use axum::http::header::COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use ferremas_core::LineItemId;
use ferremas_storefront::config::ClientConfig;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// Name of the session cookie the mock server checks.
pub const SESSION_COOKIE: &str = "session";

/// The only session value the mock server accepts.
pub const VALID_SESSION: &str = "sesion-valida-123";

/// Gateway URL handed out by `/iniciar-pago`.
pub const GATEWAY_URL: &str = "https://webpay3gint.transbank.cl/webpayserver/initTransaction";

/// Token handed out by `/iniciar-pago`.
pub const GATEWAY_TOKEN: &str = "01ab5f2c7d9e";

/// What `/iniciar-pago` answers with a non-empty cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentReply {
    /// A complete `{token, url}` session.
    #[default]
    Session,
    /// `{url}` only.
    MissingToken,
    /// `{token}` only.
    MissingUrl,
    /// 500 with an error body.
    ServerError,
}

#[derive(Debug, Clone)]
struct CatalogProduct {
    name: String,
    price: Decimal,
    image: Option<String>,
    stock: u32,
}

#[derive(Debug, Clone, Copy)]
struct StoredItem {
    id: i32,
    product_id: i32,
    quantity: u32,
}

#[derive(Debug, Default)]
struct MockState {
    catalog: BTreeMap<i32, CatalogProduct>,
    items: Vec<StoredItem>,
    next_id: i32,
    flat_items: bool,
    fail_cart: bool,
    payment: PaymentReply,
    requests: Vec<String>,
}

type Shared = Arc<Mutex<MockState>>;

fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process cart server.
pub struct MockServer {
    base_url: String,
    state: Shared,
    task: JoinHandle<()>,
}

impl MockServer {
    /// Start a server on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let state = Shared::default();
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Mock server has no address");
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            task,
        }
    }

    /// Server origin, e.g. `http://127.0.0.1:40123`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client configuration pointing at this server.
    ///
    /// `session` is the cookie value to send, if any.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is rejected.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn config(&self, session: Option<&str>) -> ClientConfig {
        ClientConfig::from_lookup(|key| match key {
            "FERREMAS_BASE_URL" => Some(self.base_url.clone()),
            "FERREMAS_SESSION_COOKIE" => session.map(str::to_string),
            _ => None,
        })
        .expect("Mock server config is valid")
    }

    /// Configuration carrying the valid session cookie.
    #[must_use]
    pub fn logged_in_config(&self) -> ClientConfig {
        self.config(Some(VALID_SESSION))
    }

    /// Put a product in the catalog.
    pub fn add_product(&self, id: i32, name: &str, price: i64, image: Option<&str>, stock: u32) {
        lock(&self.state).catalog.insert(
            id,
            CatalogProduct {
                name: name.to_string(),
                price: Decimal::from(price),
                image: image.map(str::to_string),
                stock,
            },
        );
    }

    /// Put a line item straight into the cart.
    pub fn seed_item(&self, product_id: i32, quantity: u32) -> LineItemId {
        let mut state = lock(&self.state);
        state.next_id += 1;
        let id = state.next_id;
        state.items.push(StoredItem {
            id,
            product_id,
            quantity,
        });
        LineItemId::new(id)
    }

    /// Send line items with product fields flattened onto the item.
    pub fn set_flat_items(&self, flat: bool) {
        lock(&self.state).flat_items = flat;
    }

    /// Make `GET /api/cart` answer 500.
    pub fn fail_cart_fetch(&self, fail: bool) {
        lock(&self.state).fail_cart = fail;
    }

    /// Choose what `/iniciar-pago` answers.
    pub fn set_payment_reply(&self, reply: PaymentReply) {
        lock(&self.state).payment = reply;
    }

    /// Quantity of a line item, if it is in the cart.
    #[must_use]
    pub fn item_quantity(&self, id: LineItemId) -> Option<u32> {
        lock(&self.state)
            .items
            .iter()
            .find(|item| item.id == id.as_i32())
            .map(|item| item.quantity)
    }

    /// Number of line items in the cart.
    #[must_use]
    pub fn item_count(&self) -> usize {
        lock(&self.state).items.len()
    }

    /// Requests received so far, as `"METHOD /path"`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        lock(&self.state).requests.clone()
    }

    /// Requests received other than cart fetches.
    #[must_use]
    pub fn mutations(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|request| request != "GET /api/cart")
            .collect()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/cart", get(get_cart))
        .route("/api/cart/add", post(add_item))
        .route("/api/cart/update/{id}", put(update_item))
        .route("/api/cart/remove/{id}", delete(remove_item))
        .route("/api/cart/clear", delete(clear_cart))
        .route("/iniciar-pago", post(start_payment))
        .with_state(state)
}

fn authenticated(headers: &HeaderMap) -> bool {
    let expected = format!("{SESSION_COOKIE}={VALID_SESSION}");
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .any(|pair| pair.trim() == expected)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn unauthorized() -> Response {
    error(StatusCode::UNAUTHORIZED, "No autorizado")
}

/// Record the request and check the session. `Err` is the response to send.
fn begin(state: &Shared, headers: &HeaderMap, request: String) -> Result<(), Response> {
    lock(state).requests.push(request);
    if authenticated(headers) {
        Ok(())
    } else {
        Err(unauthorized())
    }
}

fn item_json(state: &MockState, item: &StoredItem) -> Value {
    let product = state.catalog.get(&item.product_id);
    let name = product.map_or("Producto", |p| p.name.as_str());
    let price = product.map_or(Decimal::ZERO, |p| p.price);
    let image = product.and_then(|p| p.image.clone());

    if state.flat_items {
        json!({
            "id": item.id,
            "quantity": item.quantity,
            "name": name,
            "price": price,
            "image": image,
        })
    } else {
        json!({
            "id": item.id,
            "quantity": item.quantity,
            "product": { "name": name, "price": price, "image": image },
        })
    }
}

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = begin(&state, &headers, "GET /api/cart".to_string()) {
        return response;
    }
    let state = lock(&state);
    if state.fail_cart {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Error al obtener el carrito");
    }
    let items: Vec<Value> = state.items.iter().map(|item| item_json(&state, item)).collect();
    Json(items).into_response()
}

#[derive(Deserialize)]
struct AddBody {
    product_id: i32,
    quantity: i64,
}

#[derive(Deserialize)]
struct UpdateBody {
    quantity: i64,
}

fn valid_quantity(quantity: i64) -> Option<u32> {
    u32::try_from(quantity).ok().filter(|q| (1..=99).contains(q))
}

async fn add_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddBody>,
) -> Response {
    if let Err(response) = begin(&state, &headers, "POST /api/cart/add".to_string()) {
        return response;
    }
    let Some(quantity) = valid_quantity(body.quantity) else {
        return error(StatusCode::BAD_REQUEST, "Cantidad inválida");
    };

    let mut state = lock(&state);
    let Some(stock) = state.catalog.get(&body.product_id).map(|p| p.stock) else {
        return error(StatusCode::NOT_FOUND, "Producto no encontrado");
    };

    let in_cart = state
        .items
        .iter()
        .find(|item| item.product_id == body.product_id)
        .map_or(0, |item| item.quantity);
    if in_cart + quantity > stock {
        return error(StatusCode::BAD_REQUEST, "No hay suficiente stock disponible");
    }

    let item = if let Some(item) = state
        .items
        .iter_mut()
        .find(|item| item.product_id == body.product_id)
    {
        item.quantity += quantity;
        *item
    } else {
        state.next_id += 1;
        let item = StoredItem {
            id: state.next_id,
            product_id: body.product_id,
            quantity,
        };
        state.items.push(item);
        item
    };
    Json(json!({ "id": item.id, "quantity": item.quantity })).into_response()
}

async fn update_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(body): Json<UpdateBody>,
) -> Response {
    if let Err(response) = begin(&state, &headers, format!("PUT /api/cart/update/{id}")) {
        return response;
    }
    let Some(quantity) = valid_quantity(body.quantity) else {
        return error(StatusCode::BAD_REQUEST, "Cantidad inválida");
    };

    let mut state = lock(&state);
    let state = &mut *state;
    let Some(item) = state.items.iter_mut().find(|item| item.id == id) else {
        return error(StatusCode::NOT_FOUND, "Item no encontrado");
    };
    let stock = state.catalog.get(&item.product_id).map_or(0, |p| p.stock);
    if quantity > stock {
        return error(StatusCode::BAD_REQUEST, "No hay suficiente stock disponible");
    }
    item.quantity = quantity;
    Json(json!({ "id": id, "quantity": quantity })).into_response()
}

async fn remove_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    if let Err(response) = begin(&state, &headers, format!("DELETE /api/cart/remove/{id}")) {
        return response;
    }
    let mut state = lock(&state);
    let before = state.items.len();
    state.items.retain(|item| item.id != id);
    if state.items.len() == before {
        return error(StatusCode::NOT_FOUND, "Item no encontrado");
    }
    Json(json!({ "message": "Producto eliminado del carrito" })).into_response()
}

async fn clear_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = begin(&state, &headers, "DELETE /api/cart/clear".to_string()) {
        return response;
    }
    lock(&state).items.clear();
    Json(json!({ "message": "Carrito vaciado" })).into_response()
}

async fn start_payment(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = begin(&state, &headers, "POST /iniciar-pago".to_string()) {
        return response;
    }
    let state = lock(&state);
    if state.items.is_empty() {
        return error(StatusCode::BAD_REQUEST, "El carrito está vacío");
    }
    match state.payment {
        PaymentReply::Session => Json(json!({ "token": GATEWAY_TOKEN, "url": GATEWAY_URL })),
        PaymentReply::MissingToken => Json(json!({ "url": GATEWAY_URL })),
        PaymentReply::MissingUrl => Json(json!({ "token": GATEWAY_TOKEN })),
        PaymentReply::ServerError => {
            return error(StatusCode::INTERNAL_SERVER_ERROR, "Error al iniciar el pago");
        }
    }
    .into_response()
}
