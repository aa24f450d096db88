//! Declarative event bindings.
//!
//! Pages are server-rendered; the cart client binds to their elements by
//! role. [`BINDINGS`] is the single table mapping `(role, trigger)` to the
//! action the controller runs, so markup ids never leak into the logic.

use ferremas_core::{LineItemId, ProductId};

/// Every element the cart client reads from or writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementRole {
    /// Quantity input on the product page.
    Quantity,
    DecreaseQuantity,
    IncreaseQuantity,
    AddToCartButton,
    /// Feedback area under the add-to-cart button.
    AddResult,
    /// Hidden field holding `"true"` when the user is logged in.
    UserStatus,
    /// Hidden field holding the product page's product id.
    ProductId,
    /// Container the cart rows are rendered into.
    CartItems,
    EmptyCartMessage,
    CheckoutButton,
    ClearCartButton,
    CartSubtotal,
    CartTax,
    CartTotal,
    /// Badge with the number of line items, present on every page.
    CartCount,
    /// Blocking overlay shown while a payment session is requested.
    LoadingOverlay,
    /// Hidden form that posts the payment token to the gateway.
    GatewayForm,
    /// Per-row controls, rendered inside [`ElementRole::CartItems`].
    RowDecrease,
    RowIncrease,
    RowQuantity,
    RowRemove,
}

impl ElementRole {
    /// Every role, in render order.
    pub const ALL: [Self; 21] = [
        Self::Quantity,
        Self::DecreaseQuantity,
        Self::IncreaseQuantity,
        Self::AddToCartButton,
        Self::AddResult,
        Self::UserStatus,
        Self::ProductId,
        Self::CartItems,
        Self::EmptyCartMessage,
        Self::CheckoutButton,
        Self::ClearCartButton,
        Self::CartSubtotal,
        Self::CartTax,
        Self::CartTotal,
        Self::CartCount,
        Self::LoadingOverlay,
        Self::GatewayForm,
        Self::RowDecrease,
        Self::RowIncrease,
        Self::RowQuantity,
        Self::RowRemove,
    ];

    /// Identifier used in markup: the element id, or the `data-role` of a
    /// per-row control.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Quantity => "quantity",
            Self::DecreaseQuantity => "decrease-quantity",
            Self::IncreaseQuantity => "increase-quantity",
            Self::AddToCartButton => "add-to-cart-btn",
            Self::AddResult => "add-result",
            Self::UserStatus => "user-status",
            Self::ProductId => "product-id",
            Self::CartItems => "cart-items",
            Self::EmptyCartMessage => "empty-cart-message",
            Self::CheckoutButton => "checkout-btn",
            Self::ClearCartButton => "clear-cart-btn",
            Self::CartSubtotal => "cart-subtotal",
            Self::CartTax => "cart-tax",
            Self::CartTotal => "cart-total",
            Self::CartCount => "cart-count",
            Self::LoadingOverlay => "loading-overlay",
            Self::GatewayForm => "gateway-form",
            Self::RowDecrease => "row-decrease",
            Self::RowIncrease => "row-increase",
            Self::RowQuantity => "row-quantity",
            Self::RowRemove => "row-remove",
        }
    }

    /// Look a role up by its markup identifier.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.key() == key)
    }
}

/// DOM event kinds the client listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Click,
    Change,
}

/// What the controller does in response to a bound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    DecrementStepper,
    IncrementStepper,
    NormalizeStepper,
    AddToCart,
    DecrementItem,
    IncrementItem,
    SetItemQuantity,
    RemoveItem,
    ClearCart,
    Checkout,
}

/// One row of the binding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub role: ElementRole,
    pub trigger: Trigger,
    pub action: ActionKind,
}

const fn bind(role: ElementRole, trigger: Trigger, action: ActionKind) -> Binding {
    Binding {
        role,
        trigger,
        action,
    }
}

/// The event-binding table.
pub const BINDINGS: &[Binding] = &[
    bind(ElementRole::DecreaseQuantity, Trigger::Click, ActionKind::DecrementStepper),
    bind(ElementRole::IncreaseQuantity, Trigger::Click, ActionKind::IncrementStepper),
    bind(ElementRole::Quantity, Trigger::Change, ActionKind::NormalizeStepper),
    bind(ElementRole::AddToCartButton, Trigger::Click, ActionKind::AddToCart),
    bind(ElementRole::RowDecrease, Trigger::Click, ActionKind::DecrementItem),
    bind(ElementRole::RowIncrease, Trigger::Click, ActionKind::IncrementItem),
    bind(ElementRole::RowQuantity, Trigger::Change, ActionKind::SetItemQuantity),
    bind(ElementRole::RowRemove, Trigger::Click, ActionKind::RemoveItem),
    bind(ElementRole::ClearCartButton, Trigger::Click, ActionKind::ClearCart),
    bind(ElementRole::CheckoutButton, Trigger::Click, ActionKind::Checkout),
];

/// Find the action bound to `(role, trigger)`.
#[must_use]
pub fn resolve(role: ElementRole, trigger: Trigger) -> Option<ActionKind> {
    BINDINGS
        .iter()
        .find(|binding| binding.role == role && binding.trigger == trigger)
        .map(|binding| binding.action)
}

/// A user interaction on a bound element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiEvent {
    pub role: ElementRole,
    pub trigger: Trigger,
    /// `data-id` of the row the control belongs to.
    pub item: Option<LineItemId>,
    /// `data-product-id` of an add-to-cart button.
    pub product: Option<ProductId>,
    /// Input value at the time of a change event.
    pub value: Option<String>,
}

impl UiEvent {
    /// A click on `role`.
    #[must_use]
    pub const fn click(role: ElementRole) -> Self {
        Self {
            role,
            trigger: Trigger::Click,
            item: None,
            product: None,
            value: None,
        }
    }

    /// A change of `role`'s value.
    #[must_use]
    pub fn change(role: ElementRole, value: impl Into<String>) -> Self {
        Self {
            role,
            trigger: Trigger::Change,
            item: None,
            product: None,
            value: Some(value.into()),
        }
    }

    /// Attach the row the control belongs to.
    #[must_use]
    pub fn for_item(mut self, item: LineItemId) -> Self {
        self.item = Some(item);
        self
    }

    /// Attach the product a button adds.
    #[must_use]
    pub fn for_product(mut self, product: ProductId) -> Self {
        self.product = Some(product);
        self
    }
}
