//! Local, pre-network validation failures.

use rust_decimal::Decimal;
use thiserror::Error;

use super::OrderType;

/// Reasons an order form cannot be turned into an order intent.
///
/// Raised before any network call; correcting the input and
/// resubmitting is always safe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No account selected.
    #[error("select an account to trade in")]
    MissingAccount,

    /// Symbol is empty or malformed.
    #[error("'{symbol}' is not a valid symbol")]
    InvalidSymbol {
        /// Symbol as entered.
        symbol: String,
    },

    /// Quantity is zero or negative.
    #[error("quantity must be greater than zero (got {quantity})")]
    NonPositiveQuantity {
        /// Quantity as entered.
        quantity: Decimal,
    },

    /// Limit or stop-limit order without a limit price.
    #[error("{order_type} orders require a limit price")]
    MissingLimitPrice {
        /// The order type that needs it.
        order_type: OrderType,
    },

    /// Stop or stop-limit order without a stop price.
    #[error("{order_type} orders require a stop price")]
    MissingStopPrice {
        /// The order type that needs it.
        order_type: OrderType,
    },

    /// A price field is zero or negative.
    #[error("{field} must be greater than zero (got {price})")]
    NonPositivePrice {
        /// Which price field.
        field: &'static str,
        /// Price as entered.
        price: Decimal,
    },

    /// Sell quantity exceeds the holdings known to the caller.
    #[error("cannot sell {requested} shares, only {held} held")]
    InsufficientHoldings {
        /// Quantity requested.
        requested: Decimal,
        /// Quantity known to be held.
        held: Decimal,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn insufficient_holdings_message() {
        let err = ValidationError::InsufficientHoldings {
            requested: dec!(50),
            held: dec!(10),
        };
        assert_eq!(err.to_string(), "cannot sell 50 shares, only 10 held");
    }

    #[test]
    fn missing_limit_price_names_type() {
        let err = ValidationError::MissingLimitPrice {
            order_type: OrderType::StopLimit,
        };
        assert_eq!(err.to_string(), "STOP_LIMIT orders require a limit price");
    }
}
