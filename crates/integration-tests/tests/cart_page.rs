//! Cart controller flows over HTTP, as the storefront pages run them.

#![allow(clippy::unwrap_used)]

use ferremas_core::ProductId;
use ferremas_integration_tests::{GATEWAY_TOKEN, MockServer, PaymentReply};
use ferremas_storefront::api::HttpCartApi;
use ferremas_storefront::bindings::{ElementRole, UiEvent};
use ferremas_storefront::error::{LOGIN_REQUIRED_MESSAGE, Operation};
use ferremas_storefront::view::{self, Badge, Page};
use ferremas_storefront::{AssumeYes, CartController, Outcome};

async fn server() -> MockServer {
    let server = MockServer::start().await;
    server.add_product(1, "Martillo Stanley", 1190, Some("martillo.jpg"), 10);
    server.add_product(2, "Set de destornilladores", 8990, None, 50);
    server
}

fn cart_page(server: &MockServer) -> CartController<HttpCartApi> {
    let config = server.logged_in_config();
    let api = HttpCartApi::new(&config).unwrap();
    CartController::new(api, AssumeYes, Page::cart_page(config.display, true))
}

fn product_page(server: &MockServer, product: i32, logged_in: bool) -> CartController<HttpCartApi> {
    let config = if logged_in {
        server.logged_in_config()
    } else {
        server.config(None)
    };
    let api = HttpCartApi::new(&config).unwrap();
    let page = Page::product_page(config.display, ProductId::new(product), logged_in);
    CartController::new(api, AssumeYes, page)
}

#[tokio::test]
async fn test_cart_page_totals() {
    let server = server().await;
    server.seed_item(1, 2);
    let controller = cart_page(&server);
    controller.page_loaded().await;

    let out = controller.render().await.unwrap();
    let rows = out.html(ElementRole::CartItems).unwrap();
    assert!(rows.contains("Martillo Stanley"));
    assert!(rows.contains("/static/images/martillo.jpg"));
    assert_eq!(out.text(ElementRole::CartTotal), Some("$2380.00"));
    assert_eq!(out.text(ElementRole::CartSubtotal), Some("$2000.00"));
    assert_eq!(out.text(ElementRole::CartTax), Some("$380.00"));
    assert_eq!(out.disabled(ElementRole::CheckoutButton), Some(false));
    assert_eq!(out.text(ElementRole::CartCount), Some("1"));
}

#[tokio::test]
async fn test_failed_fetch_shows_empty_cart() {
    let server = server().await;
    server.seed_item(1, 2);
    server.fail_cart_fetch(true);
    let controller = cart_page(&server);
    controller.page_loaded().await;

    let out = controller.render().await.unwrap();
    assert_eq!(out.visible(ElementRole::EmptyCartMessage), Some(true));
    assert_eq!(out.disabled(ElementRole::CheckoutButton), Some(true));
    assert_eq!(out.text(ElementRole::CartTotal), Some("$0.00"));
    assert_eq!(out.visible(ElementRole::CartCount), Some(false));
}

#[tokio::test]
async fn test_add_from_product_page() {
    let server = server().await;
    let controller = product_page(&server, 2, true);

    controller
        .dispatch(UiEvent::change(ElementRole::Quantity, "3"))
        .await
        .unwrap();
    let outcome = controller
        .dispatch(UiEvent::click(ElementRole::AddToCartButton))
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Applied);

    let out = controller.render().await.unwrap();
    let notice = out.html(ElementRole::AddResult).unwrap();
    assert!(notice.contains("alert-success"));
    assert!(notice.contains(r#"href="/carrito""#));
    assert_eq!(out.text(ElementRole::CartCount), Some("1"));
    assert_eq!(server.item_count(), 1);
}

#[tokio::test]
async fn test_add_button_product_overrides_page_product() {
    let server = server().await;
    let controller = product_page(&server, 2, true);

    controller
        .dispatch(UiEvent::click(ElementRole::AddToCartButton).for_product(ProductId::new(1)))
        .await
        .unwrap();

    let requests = server.requests();
    assert!(requests.contains(&"POST /api/cart/add".to_string()));
    let controller = cart_page(&server);
    controller.load_cart().await;
    let page = controller.snapshot().await;
    let cart = page.cart.unwrap();
    assert_eq!(cart.rows()[0].item.product.name, "Martillo Stanley");
}

#[tokio::test]
async fn test_anonymous_add_sends_nothing() {
    let server = server().await;
    let controller = product_page(&server, 1, false);

    assert!(controller.add_to_cart(None).await.is_err());

    let out = controller.render().await.unwrap();
    let notice = out.html(ElementRole::AddResult).unwrap();
    assert!(notice.contains(LOGIN_REQUIRED_MESSAGE));
    assert!(notice.contains(r#"href="/login""#));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_failed_add_keeps_badge() {
    let server = server().await;
    server.seed_item(2, 1);
    let controller = product_page(&server, 1, true);
    controller.page_loaded().await;
    assert_eq!(controller.snapshot().await.badge, Badge::Count(1));

    controller
        .dispatch(UiEvent::change(ElementRole::Quantity, "11"))
        .await
        .unwrap();
    let fetches_before = server.requests().len();
    assert!(controller.add_to_cart(None).await.is_err());

    let page = controller.snapshot().await;
    assert_eq!(page.badge, Badge::Count(1));
    assert_eq!(
        page.add_result.unwrap().message,
        "No hay suficiente stock disponible"
    );
    // Only the add itself went out
    assert_eq!(server.requests().len(), fetches_before + 1);
}

#[tokio::test]
async fn test_row_controls_update_quantity() {
    let server = server().await;
    let id = server.seed_item(1, 2);
    let controller = cart_page(&server);
    controller.page_loaded().await;

    controller
        .dispatch(UiEvent::click(ElementRole::RowIncrease).for_item(id))
        .await
        .unwrap();
    assert_eq!(server.item_quantity(id), Some(3));

    controller
        .dispatch(UiEvent::change(ElementRole::RowQuantity, "5").for_item(id))
        .await
        .unwrap();
    assert_eq!(server.item_quantity(id), Some(5));

    let out = controller.render().await.unwrap();
    assert_eq!(out.text(ElementRole::CartTotal), Some("$5950.00"));
}

#[tokio::test]
async fn test_quantity_edit_clamps_and_skips_noop() {
    let server = server().await;
    server.add_product(3, "Tornillos", 50, None, 500);
    let id = server.seed_item(3, 99);
    let controller = cart_page(&server);
    controller.page_loaded().await;

    let outcome = controller
        .dispatch(UiEvent::change(ElementRole::RowQuantity, "150").for_item(id))
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
    assert!(server.mutations().is_empty());
}

#[tokio::test]
async fn test_update_rejected_by_server() {
    let server = server().await;
    let id = server.seed_item(1, 2);
    let controller = cart_page(&server);
    controller.page_loaded().await;

    let result = controller.update_quantity(id, 20).await;
    assert!(result.is_err());
    assert_eq!(server.item_quantity(id), Some(2));
    assert_eq!(
        controller.take_alerts().await,
        ["No hay suficiente stock disponible"]
    );
}

#[tokio::test]
async fn test_removing_last_item_empties_page() {
    let server = server().await;
    let id = server.seed_item(1, 2);
    let controller = cart_page(&server);
    controller.page_loaded().await;

    controller
        .dispatch(UiEvent::click(ElementRole::RowRemove).for_item(id))
        .await
        .unwrap();

    let out = controller.render().await.unwrap();
    let mut empty = Page::cart_page(server.logged_in_config().display, true);
    empty.update_cart_ui(Vec::new());
    let expected = view::render(&empty).unwrap();

    for role in [
        ElementRole::CartItems,
        ElementRole::EmptyCartMessage,
        ElementRole::CheckoutButton,
        ElementRole::ClearCartButton,
        ElementRole::CartSubtotal,
        ElementRole::CartTax,
        ElementRole::CartTotal,
    ] {
        assert_eq!(out.html(role), expected.html(role), "{role:?}");
        assert_eq!(out.text(role), expected.text(role), "{role:?}");
        assert_eq!(out.visible(role), expected.visible(role), "{role:?}");
        assert_eq!(out.disabled(role), expected.disabled(role), "{role:?}");
    }
    assert_eq!(out.visible(ElementRole::CartCount), Some(false));
}

#[tokio::test]
async fn test_decrement_at_one_removes_after_confirmation() {
    let server = server().await;
    let id = server.seed_item(1, 1);
    let config = server.logged_in_config();
    let api = HttpCartApi::new(&config).unwrap();
    let controller = CartController::new(
        api,
        |message: &str| message.contains("eliminar"),
        Page::cart_page(config.display, true),
    );
    controller.page_loaded().await;

    controller
        .dispatch(UiEvent::click(ElementRole::RowDecrease).for_item(id))
        .await
        .unwrap();
    assert_eq!(server.item_count(), 0);
    assert_eq!(server.mutations(), [format!("DELETE /api/cart/remove/{id}")]);
}

#[tokio::test]
async fn test_declined_clear_keeps_cart() {
    let server = server().await;
    server.seed_item(1, 1);
    let config = server.logged_in_config();
    let api = HttpCartApi::new(&config).unwrap();
    let controller = CartController::new(api, |_: &str| false, Page::cart_page(config.display, true));
    controller.page_loaded().await;

    let outcome = controller
        .dispatch(UiEvent::click(ElementRole::ClearCartButton))
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(server.item_count(), 1);
}

#[tokio::test]
async fn test_checkout_hands_over_to_gateway() {
    let server = server().await;
    server.seed_item(1, 1);
    let controller = cart_page(&server);
    controller.page_loaded().await;

    controller
        .dispatch(UiEvent::click(ElementRole::CheckoutButton))
        .await
        .unwrap();

    let out = controller.render().await.unwrap();
    assert_eq!(out.visible(ElementRole::LoadingOverlay), Some(true));
    let form = out.html(ElementRole::GatewayForm).unwrap();
    assert!(form.contains(r#"method="POST""#));
    assert!(form.contains(r#"name="token_ws""#));
    assert!(form.contains(GATEWAY_TOKEN));
}

#[tokio::test]
async fn test_checkout_failures_remove_overlay() {
    for reply in [
        PaymentReply::MissingToken,
        PaymentReply::MissingUrl,
        PaymentReply::ServerError,
    ] {
        let server = server().await;
        server.seed_item(1, 1);
        server.set_payment_reply(reply);
        let controller = cart_page(&server);
        controller.page_loaded().await;

        assert!(controller.start_checkout().await.is_err(), "{reply:?}");

        let out = controller.render().await.unwrap();
        assert_eq!(out.visible(ElementRole::LoadingOverlay), Some(false));
        assert_eq!(out.html(ElementRole::GatewayForm), None);
        assert_eq!(
            out.alerts().collect::<Vec<_>>(),
            [Operation::Checkout.fallback_message()]
        );
    }
}

#[tokio::test]
async fn test_checkout_with_empty_cart_is_ignored() {
    let server = server().await;
    let controller = cart_page(&server);
    controller.page_loaded().await;

    assert!(controller.start_checkout().await.unwrap().is_none());
    assert!(server.mutations().is_empty());
}
