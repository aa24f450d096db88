//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
///
/// Displays as the currency symbol followed by the amount with exactly two
/// decimals, e.g. `$2380.00`.
///
/// ```
/// use ferremas_core::{CurrencyCode, Price};
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::from(1190), CurrencyCode::CLP);
/// assert_eq!(price.display(), "$1190.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (pesos, dollars).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}{}{:.2}", self.currency_code.symbol(), rounded.abs())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes the storefront can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// Chilean peso, the store's native currency.
    #[default]
    CLP,
    USD,
}

impl CurrencyCode {
    /// Display symbol used as the amount prefix.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::CLP | Self::USD => "$",
        }
    }
}

impl core::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CLP" => Ok(Self::CLP),
            "USD" => Ok(Self::USD),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clp(amount: Decimal) -> Price {
        Price::new(amount, CurrencyCode::CLP)
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(clp(Decimal::ZERO).display(), "$0.00");
        assert_eq!(clp(Decimal::from(2380)).display(), "$2380.00");
        assert_eq!(clp(Decimal::new(19_995, 3)).display(), "$20.00");
        assert_eq!(clp(Decimal::new(1234, 1)).display(), "$123.40");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(clp(Decimal::new(-150, 2)).display(), "-$1.50");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("clp".parse::<CurrencyCode>(), Ok(CurrencyCode::CLP));
        assert_eq!(" USD ".parse::<CurrencyCode>(), Ok(CurrencyCode::USD));
        assert!("EUR".parse::<CurrencyCode>().is_err());
    }
}
