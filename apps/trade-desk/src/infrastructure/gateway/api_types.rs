//! Gateway API request and response types.
//!
//! These types map directly to the brokerage gateway's JSON format.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::ports::{GatewayError, Quote};
use crate::domain::order_execution::{
    ImpactEstimate, ImpactQuote, ImpactVerdict, OrderIntent, OrderSide, OrderStatus, OrderType,
    PlacedOrder, PlacedOrderParams,
};
use crate::domain::shared::{
    AccountId, Currency, Money, OrderId, PreviewId, Quantity, Symbol, Timestamp,
};

// ============================================================================
// Quote Types
// ============================================================================

/// Quote response.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteResponse {
    /// Symbol.
    pub symbol: String,
    /// Last price.
    pub price: Decimal,
    /// Best bid.
    #[serde(default)]
    pub bid: Option<Decimal>,
    /// Best ask.
    #[serde(default)]
    pub ask: Option<Decimal>,
    /// Daily change in percent.
    #[serde(default)]
    pub change_percent: Option<Decimal>,
    /// Quote time (RFC 3339).
    #[serde(default)]
    pub as_of: Option<String>,
}

impl QuoteResponse {
    /// Convert to the port's `Quote`.
    #[must_use]
    pub fn into_quote(self) -> Quote {
        let as_of = self
            .as_of
            .as_deref()
            .and_then(|s| Timestamp::parse(s).ok())
            .unwrap_or_else(Timestamp::now);
        Quote {
            symbol: Symbol::new(self.symbol),
            price: self.price,
            bid: self.bid,
            ask: self.ask,
            change_percent: self.change_percent,
            as_of,
        }
    }
}

// ============================================================================
// Impact Types
// ============================================================================

/// Impact request.
#[derive(Debug, Clone, Serialize)]
pub struct ImpactRequest {
    /// Account.
    pub account_id: String,
    /// Symbol.
    pub symbol: String,
    /// `buy` or `sell`.
    pub side: &'static str,
    /// `market`, `limit`, `stop` or `stop_limit`.
    pub order_type: &'static str,
    /// Quantity (as string).
    pub quantity: String,
    /// Limit price (as string).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<String>,
    /// Stop price (as string).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<String>,
    /// Time in force.
    pub time_in_force: &'static str,
}

impl ImpactRequest {
    /// Build from a validated intent.
    #[must_use]
    pub fn from_intent(intent: &OrderIntent) -> Self {
        let kind = intent.kind();
        Self {
            account_id: intent.account_id().to_string(),
            symbol: intent.symbol().to_string(),
            side: intent.side().as_wire(),
            order_type: kind.order_type().as_wire(),
            quantity: intent.quantity().to_string(),
            limit_price: kind.limit_price().map(|p| p.to_string()),
            stop_price: kind.stop_price().map(|p| p.to_string()),
            time_in_force: intent.time_in_force().as_wire(),
        }
    }
}

/// Amount with currency.
#[derive(Debug, Clone, Deserialize)]
pub struct MoneyBody {
    /// Amount.
    pub amount: Decimal,
    /// ISO currency code.
    pub currency: String,
}

impl MoneyBody {
    fn into_money(self) -> Result<Money, GatewayError> {
        let currency = Currency::from_code(&self.currency).ok_or_else(|| GatewayError::Unknown {
            message: format!("unsupported currency {}", self.currency),
        })?;
        Ok(Money::new(self.amount, currency))
    }
}

/// Impact response.
#[derive(Debug, Clone, Deserialize)]
pub struct ImpactResponse {
    /// Preview handle.
    pub preview_id: String,
    /// Whether the order would be accepted.
    pub accepted: bool,
    /// Why not, if rejected.
    #[serde(default)]
    pub rejection_reason: Option<String>,
    /// Principal.
    pub estimated_cost: MoneyBody,
    /// Fees.
    pub estimated_fees: MoneyBody,
    /// Total.
    pub estimated_total: MoneyBody,
    /// Non-fatal warnings.
    #[serde(default)]
    pub warnings: Vec<String>,
    /// When the preview handle expires (RFC 3339).
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl ImpactResponse {
    /// Convert to a domain `ImpactQuote`.
    ///
    /// A rejection without a reason gets a generic one, so a rejected
    /// quote always explains itself.
    pub fn into_quote(self) -> Result<ImpactQuote, GatewayError> {
        let verdict = if self.accepted {
            ImpactVerdict::Accepted
        } else {
            ImpactVerdict::Rejected {
                reason: self
                    .rejection_reason
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| "Order would be rejected".to_string()),
            }
        };
        let estimate = ImpactEstimate {
            cost: self.estimated_cost.into_money()?,
            fees: self.estimated_fees.into_money()?,
            total: self.estimated_total.into_money()?,
        };
        let quote = ImpactQuote::new(
            PreviewId::new(self.preview_id),
            verdict,
            estimate,
            Timestamp::now(),
        )
        .with_warnings(self.warnings);
        Ok(match self.expires_at.as_deref().map(Timestamp::parse) {
            Some(Ok(expires_at)) => quote.with_expiry(expires_at),
            _ => quote,
        })
    }
}

// ============================================================================
// Order Types
// ============================================================================

/// Commit request.
#[derive(Debug, Clone, Serialize)]
pub struct CommitRequest {
    /// Preview handle being committed.
    pub preview_id: String,
}

/// Order response.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    /// Order ID.
    pub order_id: String,
    /// Account.
    pub account_id: String,
    /// Symbol.
    pub symbol: String,
    /// Side.
    pub side: String,
    /// Order type.
    pub order_type: String,
    /// Ordered quantity.
    pub quantity: Decimal,
    /// Filled quantity.
    #[serde(default)]
    pub filled_quantity: Decimal,
    /// Limit price.
    #[serde(default)]
    pub limit_price: Option<Decimal>,
    /// Stop price.
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    /// Brokerage status.
    pub status: String,
    /// Average fill price.
    #[serde(default)]
    pub avg_fill_price: Option<Decimal>,
    /// Placement time (RFC 3339).
    pub placed_at: String,
    /// Last change (RFC 3339).
    pub updated_at: String,
}

impl OrderResponse {
    /// Convert to a domain `PlacedOrder`.
    pub fn into_order(self) -> Result<PlacedOrder, GatewayError> {
        let placed_at = parse_time(&self.placed_at)?;
        let last_updated_at = parse_time(&self.updated_at)?;
        Ok(PlacedOrder::from_snapshot(PlacedOrderParams {
            order_id: OrderId::new(self.order_id),
            account_id: AccountId::new(self.account_id),
            symbol: Symbol::new(self.symbol),
            side: parse_side(&self.side)?,
            order_type: parse_order_type(&self.order_type)?,
            quantity: Quantity::new(self.quantity),
            filled_quantity: Quantity::new(self.filled_quantity),
            limit_price: self.limit_price,
            stop_price: self.stop_price,
            status: parse_order_status(&self.status)?,
            avg_fill_price: self.avg_fill_price,
            placed_at,
            last_updated_at,
        }))
    }
}

/// Order list response.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderListResponse {
    /// Orders.
    pub orders: Vec<OrderResponse>,
}

// ============================================================================
// Error Types
// ============================================================================

/// Error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayErrorResponse {
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Error message.
    pub message: String,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a gateway order status.
///
/// Statuses outside the six-state lifecycle fold into it: `expired` is
/// treated as cancelled and `done_for_day` as still open.
pub fn parse_order_status(status: &str) -> Result<OrderStatus, GatewayError> {
    match status.to_lowercase().as_str() {
        "submitted" | "new" | "pending_new" | "accepted" => Ok(OrderStatus::Submitted),
        "open" | "done_for_day" | "pending_cancel" => Ok(OrderStatus::Open),
        "partially_filled" => Ok(OrderStatus::PartiallyFilled),
        "filled" => Ok(OrderStatus::Filled),
        "cancelled" | "canceled" | "expired" => Ok(OrderStatus::Cancelled),
        "rejected" => Ok(OrderStatus::Rejected),
        other => Err(GatewayError::Unknown {
            message: format!("unknown order status {other}"),
        }),
    }
}

fn parse_side(side: &str) -> Result<OrderSide, GatewayError> {
    match side.to_lowercase().as_str() {
        "buy" => Ok(OrderSide::Buy),
        "sell" => Ok(OrderSide::Sell),
        other => Err(GatewayError::Unknown {
            message: format!("unknown order side {other}"),
        }),
    }
}

fn parse_order_type(order_type: &str) -> Result<OrderType, GatewayError> {
    match order_type.to_lowercase().as_str() {
        "market" => Ok(OrderType::Market),
        "limit" => Ok(OrderType::Limit),
        "stop" => Ok(OrderType::Stop),
        "stop_limit" => Ok(OrderType::StopLimit),
        other => Err(GatewayError::Unknown {
            message: format!("unknown order type {other}"),
        }),
    }
}

fn parse_time(value: &str) -> Result<Timestamp, GatewayError> {
    Timestamp::parse(value).map_err(|e| GatewayError::Unknown {
        message: format!("invalid timestamp {value}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    use crate::domain::order_execution::OrderDraft;

    #[test_case("new", OrderStatus::Submitted ; "new")]
    #[test_case("open", OrderStatus::Open ; "open")]
    #[test_case("partially_filled", OrderStatus::PartiallyFilled ; "partial")]
    #[test_case("FILLED", OrderStatus::Filled ; "filled upper case")]
    #[test_case("canceled", OrderStatus::Cancelled ; "us spelling")]
    #[test_case("expired", OrderStatus::Cancelled ; "expired")]
    #[test_case("done_for_day", OrderStatus::Open ; "done for day")]
    #[test_case("rejected", OrderStatus::Rejected ; "rejected")]
    fn parse_status(wire: &str, expected: OrderStatus) {
        assert_eq!(parse_order_status(wire).unwrap(), expected);
    }

    #[test]
    fn unknown_status_is_error() {
        assert!(parse_order_status("teleported").is_err());
    }

    #[test]
    fn impact_request_carries_only_needed_prices() {
        let intent = OrderDraft::market("acct-1", "AAPL", OrderSide::Buy, dec!(10))
            .with_limit_price(dec!(150))
            .validate()
            .unwrap();
        let request = ImpactRequest::from_intent(&intent);
        assert_eq!(request.order_type, "limit");
        assert_eq!(request.limit_price.as_deref(), Some("150"));
        assert!(request.stop_price.is_none());

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("stop_price").is_none());
    }

    #[test]
    fn impact_response_to_quote() {
        let response: ImpactResponse = serde_json::from_value(serde_json::json!({
            "preview_id": "p1",
            "accepted": true,
            "estimated_cost": {"amount": "1500.00", "currency": "USD"},
            "estimated_fees": {"amount": "0", "currency": "USD"},
            "estimated_total": {"amount": "1500.00", "currency": "USD"},
            "expires_at": "2026-03-02T15:01:00Z"
        }))
        .unwrap();

        let quote = response.into_quote().unwrap();
        assert!(quote.is_accepted());
        assert_eq!(quote.estimate().total, Money::usd(dec!(1500.00)));
        assert!(quote.expires_at().is_some());
    }

    #[test]
    fn rejected_impact_without_reason_gets_one() {
        let response: ImpactResponse = serde_json::from_value(serde_json::json!({
            "preview_id": "p2",
            "accepted": false,
            "estimated_cost": {"amount": "0", "currency": "USD"},
            "estimated_fees": {"amount": "0", "currency": "USD"},
            "estimated_total": {"amount": "0", "currency": "USD"}
        }))
        .unwrap();

        let quote = response.into_quote().unwrap();
        assert!(quote.rejection_reason().is_some());
    }

    #[test]
    fn order_response_to_order() {
        let response: OrderResponse = serde_json::from_value(serde_json::json!({
            "order_id": "o1",
            "account_id": "acct-1",
            "symbol": "AAPL",
            "side": "buy",
            "order_type": "limit",
            "quantity": "100",
            "filled_quantity": "50",
            "limit_price": "150.00",
            "status": "partially_filled",
            "avg_fill_price": "149.95",
            "placed_at": "2026-03-02T15:00:00Z",
            "updated_at": "2026-03-02T15:05:00Z"
        }))
        .unwrap();

        let order = response.into_order().unwrap();
        assert_eq!(order.order_id().as_str(), "o1");
        assert_eq!(order.status(), OrderStatus::PartiallyFilled);
        assert_eq!(order.remaining_quantity(), Quantity::from_i64(50));
        assert_eq!(order.avg_fill_price(), Some(dec!(149.95)));
    }
}
