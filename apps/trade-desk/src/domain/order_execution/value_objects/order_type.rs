//! Order type discriminant and the priced order kind.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order type as entered on a form or reported by the brokerage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Execute at best available price.
    #[default]
    Market,
    /// Execute at the limit price or better.
    Limit,
    /// Becomes a market order once the stop price trades.
    Stop,
    /// Becomes a limit order once the stop price trades.
    StopLimit,
}

impl OrderType {
    /// Returns true if this order type requires a limit price.
    #[must_use]
    pub const fn requires_limit_price(&self) -> bool {
        matches!(self, Self::Limit | Self::StopLimit)
    }

    /// Returns true if this order type requires a stop price.
    #[must_use]
    pub const fn requires_stop_price(&self) -> bool {
        matches!(self, Self::Stop | Self::StopLimit)
    }

    /// Lowercase wire spelling used by the brokerage gateway.
    #[must_use]
    pub const fn as_wire(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
            Self::Stop => "stop",
            Self::StopLimit => "stop_limit",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
            Self::Stop => write!(f, "STOP"),
            Self::StopLimit => write!(f, "STOP_LIMIT"),
        }
    }
}

/// A validated order type carrying exactly the prices it needs.
///
/// Construction goes through [`OrderDraft::validate`](super::OrderDraft::validate),
/// so a `Limit` without a limit price cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "order_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    /// Market order.
    Market,
    /// Limit order.
    Limit {
        /// Worst acceptable price.
        limit_price: Decimal,
    },
    /// Stop (market) order.
    Stop {
        /// Trigger price.
        stop_price: Decimal,
    },
    /// Stop-limit order.
    StopLimit {
        /// Trigger price.
        stop_price: Decimal,
        /// Worst acceptable price once triggered.
        limit_price: Decimal,
    },
}

impl OrderKind {
    /// The flat discriminant.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        match self {
            Self::Market => OrderType::Market,
            Self::Limit { .. } => OrderType::Limit,
            Self::Stop { .. } => OrderType::Stop,
            Self::StopLimit { .. } => OrderType::StopLimit,
        }
    }

    /// Limit price, if this kind has one.
    #[must_use]
    pub const fn limit_price(&self) -> Option<Decimal> {
        match self {
            Self::Limit { limit_price } | Self::StopLimit { limit_price, .. } => Some(*limit_price),
            Self::Market | Self::Stop { .. } => None,
        }
    }

    /// Stop price, if this kind has one.
    #[must_use]
    pub const fn stop_price(&self) -> Option<Decimal> {
        match self {
            Self::Stop { stop_price } | Self::StopLimit { stop_price, .. } => Some(*stop_price),
            Self::Market | Self::Limit { .. } => None,
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit { limit_price } => write!(f, "LIMIT @ {limit_price}"),
            Self::Stop { stop_price } => write!(f, "STOP @ {stop_price}"),
            Self::StopLimit {
                stop_price,
                limit_price,
            } => write!(f, "STOP_LIMIT {stop_price} / {limit_price}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_type_price_requirements() {
        assert!(!OrderType::Market.requires_limit_price());
        assert!(!OrderType::Market.requires_stop_price());
        assert!(OrderType::Limit.requires_limit_price());
        assert!(OrderType::Stop.requires_stop_price());
        assert!(OrderType::StopLimit.requires_limit_price());
        assert!(OrderType::StopLimit.requires_stop_price());
    }

    #[test]
    fn order_type_serde() {
        assert_eq!(
            serde_json::to_string(&OrderType::StopLimit).unwrap(),
            "\"STOP_LIMIT\""
        );
    }

    #[test]
    fn order_kind_exposes_only_its_prices() {
        let kind = OrderKind::StopLimit {
            stop_price: dec!(95),
            limit_price: dec!(94.5),
        };
        assert_eq!(kind.order_type(), OrderType::StopLimit);
        assert_eq!(kind.stop_price(), Some(dec!(95)));
        assert_eq!(kind.limit_price(), Some(dec!(94.5)));

        let market = OrderKind::Market;
        assert_eq!(market.limit_price(), None);
        assert_eq!(market.stop_price(), None);
    }

    #[test]
    fn order_kind_serializes_tagged() {
        let json = serde_json::to_value(OrderKind::Limit {
            limit_price: dec!(150.25),
        })
        .unwrap();
        assert_eq!(json["order_type"], "LIMIT");
        assert_eq!(json["limit_price"], "150.25");
    }
}
