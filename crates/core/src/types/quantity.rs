//! Bounded line-item quantity.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A cart quantity, always within `[Quantity::MIN, Quantity::MAX]`.
///
/// Every quantity the client sends to the server goes through this type, so
/// out-of-range values can't reach the wire.
///
/// ## Examples
///
/// ```
/// use ferremas_core::Quantity;
///
/// assert_eq!(Quantity::clamp(0).get(), 1);
/// assert_eq!(Quantity::clamp(150).get(), 99);
/// assert_eq!(Quantity::from_input("abc").get(), 1);
/// assert_eq!(Quantity::from_input("12 units").get(), 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Quantity(u8);

impl Quantity {
    /// Smallest quantity a line item can hold.
    pub const MIN: Self = Self(1);
    /// Largest quantity a line item can hold.
    pub const MAX: Self = Self(99);

    /// Clamp an arbitrary integer into range.
    #[must_use]
    pub fn clamp(value: i64) -> Self {
        let clamped = value.clamp(i64::from(Self::MIN.0), i64::from(Self::MAX.0));
        // In range after the clamp above.
        Self(u8::try_from(clamped).unwrap_or(Self::MIN.0))
    }

    /// Normalize a manually edited input value.
    ///
    /// Not a number or below 1 resets to 1, above 99 becomes 99.
    #[must_use]
    pub fn from_input(raw: &str) -> Self {
        parse_leading_int(raw).map_or(Self::MIN, Self::clamp)
    }

    /// Returns the quantity as a plain integer.
    #[must_use]
    pub fn get(self) -> u32 {
        u32::from(self.0)
    }

    /// One less, or `None` when already at the minimum.
    #[must_use]
    pub const fn decremented(self) -> Option<Self> {
        if self.0 > Self::MIN.0 {
            Some(Self(self.0 - 1))
        } else {
            None
        }
    }

    /// One more, or `None` when already at the maximum.
    #[must_use]
    pub const fn incremented(self) -> Option<Self> {
        if self.0 < Self::MAX.0 {
            Some(Self(self.0 + 1))
        } else {
            None
        }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Quantity> for i64 {
    fn from(quantity: Quantity) -> Self {
        Self::from(quantity.0)
    }
}

// Servers occasionally report quantities outside the range; clamp on the way in.
impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(Self::clamp(raw))
    }
}

/// Parse the leading integer of a string the way browsers read number inputs.
///
/// Leading whitespace and a single sign are accepted, parsing stops at the
/// first non-digit, and a string with no leading digits yields `None`.
#[must_use]
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let mut chars = raw.trim_start().chars().peekable();
    let negative = match chars.peek() {
        Some('-') => {
            chars.next();
            true
        }
        Some('+') => {
            chars.next();
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for c in chars {
        let Some(digit) = c.to_digit(10) else {
            break;
        };
        seen_digit = true;
        value = value.saturating_mul(10).saturating_add(i64::from(digit));
    }

    if !seen_digit {
        return None;
    }
    Some(if negative { -value } else { value })
}
