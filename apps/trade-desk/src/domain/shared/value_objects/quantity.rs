//! Share quantities of orders and fills.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A number of shares. Fractional shares are allowed.
///
/// Quantities received from the brokerage are taken as-is; whether a
/// quantity is acceptable for a new order is decided by order
/// validation, not here.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// No shares.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal share count.
    #[must_use]
    pub const fn new(shares: Decimal) -> Self {
        Self(shares)
    }

    /// A whole number of shares.
    #[must_use]
    pub fn from_i64(shares: i64) -> Self {
        Self(Decimal::from(shares))
    }

    /// Share count as a decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true for more than zero shares.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Returns true for zero shares.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Shares left after `filled`, never below zero.
    #[must_use]
    pub fn remaining_after(self, filled: Self) -> Self {
        if filled.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - filled.0)
        }
    }

    /// `filled` capped at this quantity.
    #[must_use]
    pub fn cap_fill(self, filled: Self) -> Self {
        self.min(filled)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<Decimal> for Quantity {
    fn from(shares: Decimal) -> Self {
        Self(shares)
    }
}

impl From<Quantity> for Decimal {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}
