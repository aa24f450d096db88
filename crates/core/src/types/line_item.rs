//! Cart line items as reported by the cart server.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::LineItemId;
use super::quantity::Quantity;

/// Path prefix for product images stored by file name only.
pub const IMAGE_BASE_PATH: &str = "/static/images/";

/// Image shown when a product has no image or the image fails to load.
pub const FALLBACK_IMAGE: &str = "/static/images/no-image.jpg";

/// Errors decoding a line item from the wire.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LineItemError {
    /// Neither an embedded product nor flattened product fields were present.
    #[error("line item {0} has no product")]
    MissingProduct(LineItemId),
    /// Flattened product fields were present but incomplete.
    #[error("line item {id} is missing product field `{field}`")]
    MissingField {
        /// Line item the field belongs to.
        id: LineItemId,
        /// Name of the missing field.
        field: &'static str,
    },
    /// The price times the largest quantity doesn't fit in a [`Decimal`].
    #[error("line item {0} has a price too large to total")]
    PriceOutOfRange(LineItemId),
}

/// Product data embedded in a line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Display name.
    pub name: String,
    /// Unit price, tax included.
    pub price: Decimal,
    /// Image path, relative file name or absolute URL.
    #[serde(default)]
    pub image: Option<String>,
}

impl Product {
    /// Resolve the image path to something an `<img src>` can load.
    ///
    /// Absolute URLs and `/static/` paths are kept, bare file names live under
    /// [`IMAGE_BASE_PATH`], and a missing image resolves to [`FALLBACK_IMAGE`].
    #[must_use]
    pub fn image_src(&self) -> String {
        match self.image.as_deref().map(str::trim) {
            None | Some("") => FALLBACK_IMAGE.to_string(),
            Some(src) if src.starts_with("http") || src.starts_with("/static/") => {
                src.to_string()
            }
            Some(src) => format!("{IMAGE_BASE_PATH}{src}"),
        }
    }
}

/// One product-quantity pairing in the cart.
///
/// Line items are owned by the server; the client only ever holds a transient
/// copy decoded from the latest cart response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLineItem")]
pub struct LineItem {
    /// Server-assigned identifier.
    pub id: LineItemId,
    /// Quantity, clamped to the valid range on decode.
    pub quantity: Quantity,
    /// The product this line refers to.
    pub product: Product,
}

impl LineItem {
    /// Unit price times quantity, or `None` if that overflows.
    ///
    /// Always `Some` for items decoded from the wire.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.product
            .price
            .checked_mul(Decimal::from(self.quantity.get()))
    }
}

/// Wire shape of a line item.
///
/// Some server versions embed the product under `product`, others flatten
/// `name`/`price`/`image` onto the item itself.
#[derive(Deserialize)]
struct RawLineItem {
    id: LineItemId,
    quantity: Quantity,
    #[serde(default)]
    product: Option<Product>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    image: Option<String>,
}

impl TryFrom<RawLineItem> for LineItem {
    type Error = LineItemError;

    fn try_from(raw: RawLineItem) -> Result<Self, Self::Error> {
        let product = match raw.product {
            Some(product) => product,
            None if raw.name.is_none() && raw.price.is_none() => {
                return Err(LineItemError::MissingProduct(raw.id));
            }
            None => Product {
                name: raw.name.ok_or(LineItemError::MissingField {
                    id: raw.id,
                    field: "name",
                })?,
                price: raw.price.ok_or(LineItemError::MissingField {
                    id: raw.id,
                    field: "price",
                })?,
                image: raw.image,
            },
        };

        if product
            .price
            .checked_mul(Decimal::from(Quantity::MAX.get()))
            .is_none()
        {
            return Err(LineItemError::PriceOutOfRange(raw.id));
        }

        Ok(Self {
            id: raw.id,
            quantity: raw.quantity,
            product,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(image: Option<&str>) -> Product {
        Product {
            name: "Martillo".to_string(),
            price: Decimal::from(1190),
            image: image.map(String::from),
        }
    }

    #[test]
    fn test_decode_embedded_product() {
        let json = r#"{"id": 3, "quantity": 2, "product": {"name": "Taladro", "price": 1190, "image": "taladro.jpg"}}"#;
        let item: LineItem = serde_json::from_str(json).expect("decode");
        assert_eq!(item.id, LineItemId::new(3));
        assert_eq!(item.quantity.get(), 2);
        assert_eq!(item.product.name, "Taladro");
        assert_eq!(item.line_total(), Some(Decimal::from(2380)));
    }

    #[test]
    fn test_decode_flattened_product() {
        let json = r#"{"id": 4, "quantity": 1, "name": "Sierra", "price": 4990.5}"#;
        let item: LineItem = serde_json::from_str(json).expect("decode");
        assert_eq!(item.product.name, "Sierra");
        assert_eq!(item.product.price, Decimal::new(49905, 1));
        assert_eq!(item.product.image, None);
    }

    #[test]
    fn test_decode_without_product_fails() {
        let json = r#"{"id": 5, "quantity": 1}"#;
        assert!(serde_json::from_str::<LineItem>(json).is_err());

        let json = r#"{"id": 5, "quantity": 1, "name": "Sierra"}"#;
        assert!(serde_json::from_str::<LineItem>(json).is_err());
    }

    #[test]
    fn test_decode_rejects_price_too_large_to_total() {
        let json = r#"{"id": 1, "quantity": 99, "product": {"name": "X", "price": "79228162514264337593543950335"}}"#;
        let err = serde_json::from_str::<LineItem>(json).expect_err("price overflows");
        assert!(err.to_string().contains("too large"));

        // Fits even at the largest quantity
        let json = r#"{"id": 2, "quantity": 99, "product": {"name": "Y", "price": "700000000000000000000000000"}}"#;
        let item: LineItem = serde_json::from_str(json).expect("decode");
        assert!(item.line_total().is_some());
    }

    #[test]
    fn test_line_total_overflow_is_none() {
        let item = LineItem {
            id: LineItemId::new(7),
            quantity: Quantity::clamp(2),
            product: Product {
                price: Decimal::MAX,
                ..product(None)
            },
        };
        assert_eq!(item.line_total(), None);
    }

    #[test]
    fn test_decode_clamps_quantity() {
        let json = r#"{"id": 6, "quantity": 500, "product": {"name": "Clavos", "price": 10}}"#;
        let item: LineItem = serde_json::from_str(json).expect("decode");
        assert_eq!(item.quantity.get(), 99);
    }

    #[test]
    fn test_image_src_resolution() {
        assert_eq!(product(None).image_src(), FALLBACK_IMAGE);
        assert_eq!(product(Some("")).image_src(), FALLBACK_IMAGE);
        assert_eq!(
            product(Some("martillo.jpg")).image_src(),
            "/static/images/martillo.jpg"
        );
        assert_eq!(
            product(Some("/static/uploads/a.png")).image_src(),
            "/static/uploads/a.png"
        );
        assert_eq!(
            product(Some("https://cdn.example.com/a.png")).image_src(),
            "https://cdn.example.com/a.png"
        );
    }
}
