//! Quantity stepper on the product page.
//!
//! Holds the raw text of the `quantity` input. The decrease/increase buttons
//! and manual edits only ever touch this value; nothing here talks to the
//! server.

use ferremas_core::Quantity;
use ferremas_core::types::quantity::parse_leading_int;

/// State of the quantity input and its two buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityStepper {
    raw: String,
}

impl QuantityStepper {
    /// A stepper showing `quantity`.
    #[must_use]
    pub fn new(quantity: Quantity) -> Self {
        Self {
            raw: quantity.to_string(),
        }
    }

    /// A stepper showing whatever text the input currently holds.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Text shown in the input.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.raw
    }

    /// Decrease button: one less, never below 1.
    ///
    /// A non-numeric value is left alone.
    pub fn decrement(&mut self) {
        if let Some(current) = parse_leading_int(&self.raw)
            && current > i64::from(Quantity::MIN)
        {
            self.raw = (current - 1).to_string();
        }
    }

    /// Increase button: one more, never above 99.
    ///
    /// A non-numeric value is left alone.
    pub fn increment(&mut self) {
        if let Some(current) = parse_leading_int(&self.raw)
            && current < i64::from(Quantity::MAX)
        {
            self.raw = (current + 1).to_string();
        }
    }

    /// Manual edit: store the typed text, then normalize it into range.
    pub fn edit(&mut self, raw: &str) {
        self.raw = Quantity::from_input(raw).to_string();
    }

    /// Quantity to send with an add-to-cart request.
    #[must_use]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_input(&self.raw)
    }
}

impl Default for QuantityStepper {
    fn default() -> Self {
        Self::new(Quantity::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrement_stops_at_one() {
        let mut stepper = QuantityStepper::from_raw("2");
        stepper.decrement();
        assert_eq!(stepper.value(), "1");
        stepper.decrement();
        assert_eq!(stepper.value(), "1");
    }

    #[test]
    fn test_increment_stops_at_ninety_nine() {
        let mut stepper = QuantityStepper::from_raw("98");
        stepper.increment();
        assert_eq!(stepper.value(), "99");
        stepper.increment();
        assert_eq!(stepper.value(), "99");
    }

    #[test]
    fn test_buttons_ignore_non_numeric_value() {
        let mut stepper = QuantityStepper::from_raw("abc");
        stepper.increment();
        assert_eq!(stepper.value(), "abc");
        stepper.decrement();
        assert_eq!(stepper.value(), "abc");
        assert_eq!(stepper.quantity(), Quantity::MIN);
    }

    #[test]
    fn test_edit_normalizes() {
        let mut stepper = QuantityStepper::default();
        stepper.edit("0");
        assert_eq!(stepper.value(), "1");
        stepper.edit("150");
        assert_eq!(stepper.value(), "99");
        stepper.edit("not a number");
        assert_eq!(stepper.value(), "1");
        stepper.edit("42");
        assert_eq!(stepper.value(), "42");
        assert_eq!(stepper.quantity().get(), 42);
    }

    #[test]
    fn test_out_of_range_raw_value_clamps_on_read() {
        let stepper = QuantityStepper::from_raw("500");
        assert_eq!(stepper.quantity(), Quantity::MAX);
    }
}
