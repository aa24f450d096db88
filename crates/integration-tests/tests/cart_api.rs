//! `HttpCartApi` against the mock cart server.

#![allow(clippy::unwrap_used)]

use ferremas_core::{LineItemId, ProductId, Quantity};
use ferremas_integration_tests::{GATEWAY_TOKEN, MockServer, PaymentReply};
use ferremas_storefront::api::{CartApi, HttpCartApi};
use ferremas_storefront::error::{CartError, ErrorKind, Operation};
use rust_decimal::Decimal;

async fn server_with_catalog() -> MockServer {
    let server = MockServer::start().await;
    server.add_product(1, "Martillo Stanley", 1190, Some("martillo.jpg"), 10);
    server.add_product(2, "Taladro Bosch", 45990, None, 3);
    server
}

fn api(server: &MockServer) -> HttpCartApi {
    HttpCartApi::new(&server.logged_in_config()).unwrap()
}

#[tokio::test]
async fn test_fetch_cart_decodes_line_items() {
    let server = server_with_catalog().await;
    let id = server.seed_item(1, 2);

    let items = api(&server).fetch_cart().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, id);
    assert_eq!(items[0].quantity.get(), 2);
    assert_eq!(items[0].product.name, "Martillo Stanley");
    assert_eq!(items[0].product.price, Decimal::from(1190));
    assert_eq!(items[0].product.image_src(), "/static/images/martillo.jpg");
    assert_eq!(items[0].line_total(), Some(Decimal::from(2380)));
}

#[tokio::test]
async fn test_fetch_cart_accepts_flattened_items() {
    let server = server_with_catalog().await;
    server.seed_item(2, 1);
    server.set_flat_items(true);

    let items = api(&server).fetch_cart().await.unwrap();
    assert_eq!(items[0].product.name, "Taladro Bosch");
    assert_eq!(items[0].product.image_src(), "/static/images/no-image.jpg");
}

#[tokio::test]
async fn test_missing_session_is_unauthenticated() {
    let server = server_with_catalog().await;
    let api = HttpCartApi::new(&server.config(None)).unwrap();

    let err = api.fetch_cart().await.unwrap_err();
    assert!(matches!(err, CartError::Unauthenticated));

    let api = HttpCartApi::new(&server.config(Some("caducada"))).unwrap();
    let err = api.fetch_cart().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationRequired);
}

#[tokio::test]
async fn test_add_item() {
    let server = server_with_catalog().await;
    let api = api(&server);

    let added = api
        .add_item(ProductId::new(1), Quantity::clamp(3))
        .await
        .unwrap();
    assert_eq!(added.quantity, Some(Quantity::clamp(3)));
    let id = added.id.unwrap();
    assert_eq!(server.item_quantity(id), Some(3));

    // Adding again bumps the same line item
    let added = api
        .add_item(ProductId::new(1), Quantity::clamp(2))
        .await
        .unwrap();
    assert_eq!(added.id, Some(id));
    assert_eq!(server.item_quantity(id), Some(5));
}

#[tokio::test]
async fn test_add_item_surfaces_server_message() {
    let server = server_with_catalog().await;
    let err = api(&server)
        .add_item(ProductId::new(2), Quantity::clamp(4))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Business);
    assert_eq!(
        err.user_message(Operation::AddToCart),
        "No hay suficiente stock disponible"
    );
    assert_eq!(server.item_count(), 0);
}

#[tokio::test]
async fn test_update_and_remove() {
    let server = server_with_catalog().await;
    let id = server.seed_item(1, 1);
    let api = api(&server);

    api.update_quantity(id, Quantity::clamp(7)).await.unwrap();
    assert_eq!(server.item_quantity(id), Some(7));

    api.remove_item(id).await.unwrap();
    assert_eq!(server.item_quantity(id), None);

    let err = api.remove_item(id).await.unwrap_err();
    assert_eq!(err.user_message(Operation::RemoveItem), "Item no encontrado");
}

#[tokio::test]
async fn test_update_unknown_item() {
    let server = server_with_catalog().await;
    let err = api(&server)
        .update_quantity(LineItemId::new(99), Quantity::MIN)
        .await
        .unwrap_err();
    assert!(matches!(err, CartError::Server { .. }));
}

#[tokio::test]
async fn test_clear_cart() {
    let server = server_with_catalog().await;
    server.seed_item(1, 1);
    server.seed_item(2, 1);

    api(&server).clear_cart().await.unwrap();
    assert_eq!(server.item_count(), 0);
    assert_eq!(server.mutations(), ["DELETE /api/cart/clear"]);
}

#[tokio::test]
async fn test_start_payment() {
    let server = server_with_catalog().await;
    server.seed_item(1, 1);

    let session = api(&server).start_payment().await.unwrap();
    assert_eq!(session.token, GATEWAY_TOKEN);
    assert_eq!(session.url.host_str(), Some("webpay3gint.transbank.cl"));
}

#[tokio::test]
async fn test_start_payment_rejects_incomplete_session() {
    let server = server_with_catalog().await;
    server.seed_item(1, 1);
    let api = api(&server);

    server.set_payment_reply(PaymentReply::MissingToken);
    let err = api.start_payment().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PaymentSession);

    server.set_payment_reply(PaymentReply::MissingUrl);
    let err = api.start_payment().await.unwrap_err();
    assert!(matches!(err, CartError::InvalidPaymentSession(_)));
}
