//! Cart totals derived from line items.
//!
//! Totals are never persisted; they are recomputed from the current line items
//! every time the cart is rendered.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::line_item::LineItem;

/// Chilean IVA.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(19, 0, 0, false, 2);

/// How product prices relate to tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum TaxModel {
    /// Prices already include tax; the subtotal is derived by division and
    /// rounded to a whole unit.
    Inclusive { rate: Decimal },
    /// Prices exclude tax; tax is added on top, rounded to cents.
    Exclusive { rate: Decimal },
}

impl TaxModel {
    /// The tax rate, e.g. `0.19`.
    #[must_use]
    pub const fn rate(self) -> Decimal {
        match self {
            Self::Inclusive { rate } | Self::Exclusive { rate } => rate,
        }
    }
}

impl Default for TaxModel {
    fn default() -> Self {
        Self::Inclusive {
            rate: DEFAULT_TAX_RATE,
        }
    }
}

/// Errors computing cart totals.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsError {
    /// An intermediate amount doesn't fit in a [`Decimal`].
    #[error("cart totals overflow")]
    Overflow,
}

/// Subtotal, tax and total for a set of line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    /// All-zero totals, shown for an empty cart.
    pub const ZERO: Self = Self {
        subtotal: Decimal::ZERO,
        tax: Decimal::ZERO,
        total: Decimal::ZERO,
    };

    /// Compute totals from line items.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError::Overflow`] if any amount exceeds the range of
    /// [`Decimal`].
    pub fn compute(items: &[LineItem], model: TaxModel) -> Result<Self, TotalsError> {
        let sum = items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| {
                item.line_total().and_then(|line| sum.checked_add(line))
            })
            .ok_or(TotalsError::Overflow)?;
        Self::from_gross(sum, model)
    }

    /// Compute totals from Σ(quantity × price).
    ///
    /// ```
    /// use ferremas_core::{CartTotals, TaxModel};
    /// use rust_decimal::Decimal;
    ///
    /// let totals = CartTotals::from_gross(Decimal::from(2380), TaxModel::default())?;
    /// assert_eq!(totals.subtotal, Decimal::from(2000));
    /// assert_eq!(totals.tax, Decimal::from(380));
    /// # Ok::<(), ferremas_core::TotalsError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError::Overflow`] if the tax arithmetic overflows.
    pub fn from_gross(sum: Decimal, model: TaxModel) -> Result<Self, TotalsError> {
        if sum.is_zero() {
            return Ok(Self::ZERO);
        }

        match model {
            TaxModel::Inclusive { rate } => {
                let subtotal = Decimal::ONE
                    .checked_add(rate)
                    .and_then(|divisor| sum.checked_div(divisor))
                    .ok_or(TotalsError::Overflow)?
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
                Ok(Self {
                    subtotal,
                    tax: sum.checked_sub(subtotal).ok_or(TotalsError::Overflow)?,
                    total: sum,
                })
            }
            TaxModel::Exclusive { rate } => {
                let tax = sum
                    .checked_mul(rate)
                    .ok_or(TotalsError::Overflow)?
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                Ok(Self {
                    subtotal: sum,
                    tax,
                    total: sum.checked_add(tax).ok_or(TotalsError::Overflow)?,
                })
            }
        }
    }
}
