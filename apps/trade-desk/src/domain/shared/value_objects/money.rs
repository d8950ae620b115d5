//! Money value object for currency amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// ISO 4217 currency of a monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    /// US dollar.
    #[default]
    Usd,
    /// Canadian dollar.
    Cad,
    /// Euro.
    Eur,
    /// Pound sterling.
    Gbp,
}

impl Currency {
    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Cad => "CAD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
        }
    }

    /// Parse an ISO code, case-insensitively.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "USD" => Some(Self::Usd),
            "CAD" => Some(Self::Cad),
            "EUR" => Some(Self::Eur),
            "GBP" => Some(Self::Gbp),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A monetary amount in a specific currency.
///
/// Represented as a Decimal for precise financial calculations.
/// Amounts in different currencies never combine implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Create a new Money value.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Create a USD amount.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, Currency::Usd)
    }

    /// Zero in the given currency.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Get the amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Get the currency.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if this amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Returns true if this amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Round to 2 decimal places.
    #[must_use]
    pub fn round(&self) -> Self {
        Self::new(self.amount.round_dp(2), self.currency)
    }

    /// Multiply by a scalar (price x quantity).
    #[must_use]
    pub fn times(&self, factor: Decimal) -> Self {
        Self::new(self.amount * factor, self.currency)
    }

    /// Add two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// Returns error if the currencies differ.
    pub fn checked_add(&self, other: Self) -> Result<Self, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch {
                left: self.currency.code().to_string(),
                right: other.currency.code().to_string(),
            });
        }
        Ok(Self::new(self.amount + other.amount, self.currency))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_display() {
        let m = Money::usd(dec!(1500));
        assert_eq!(format!("{m}"), "1500.00 USD");
    }

    #[test]
    fn money_round() {
        let m = Money::usd(dec!(150.555));
        assert_eq!(m.round().amount(), dec!(150.56));
    }

    #[test]
    fn money_times() {
        let price = Money::usd(dec!(150));
        assert_eq!(price.times(dec!(10)), Money::usd(dec!(1500)));
    }

    #[test]
    fn money_checked_add_same_currency() {
        let total = Money::usd(dec!(1500)).checked_add(Money::usd(dec!(1.25))).unwrap();
        assert_eq!(total.amount(), dec!(1501.25));
    }

    #[test]
    fn money_checked_add_rejects_mixed_currency() {
        let result = Money::usd(dec!(1)).checked_add(Money::new(dec!(1), Currency::Eur));
        assert!(matches!(result, Err(DomainError::CurrencyMismatch { .. })));
    }

    #[test]
    fn money_negative_and_zero() {
        assert!(Money::usd(dec!(-1)).is_negative());
        assert!(Money::zero(Currency::Cad).is_zero());
    }

    #[test]
    fn currency_codes() {
        assert_eq!(Currency::from_code("usd"), Some(Currency::Usd));
        assert_eq!(Currency::from_code("JPY"), None);
        assert_eq!(Currency::Gbp.to_string(), "GBP");
    }

    #[test]
    fn money_serde_shape() {
        let m = Money::usd(dec!(1500.00));
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["amount"], "1500.00");
    }
}
