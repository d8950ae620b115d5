//! Order DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::value_objects::{OrderSide, OrderStatus, OrderType};
use crate::domain::order_execution::{PlacedOrder, TrackedOrder};
use crate::domain::shared::Timestamp;

/// A placed order as shown by order status and history views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrderDto {
    /// Order ID.
    pub order_id: String,
    /// Account ID.
    pub account_id: String,
    /// Symbol.
    pub symbol: String,
    /// Side.
    pub side: OrderSide,
    /// Type.
    pub order_type: OrderType,
    /// Quantity.
    pub quantity: Decimal,
    /// Filled quantity.
    pub filled_quantity: Decimal,
    /// Remaining quantity.
    pub remaining_quantity: Decimal,
    /// Limit price.
    pub limit_price: Option<Decimal>,
    /// Stop price.
    pub stop_price: Option<Decimal>,
    /// Status.
    pub status: OrderStatus,
    /// Average fill price.
    pub avg_fill_price: Option<Decimal>,
    /// Placed at.
    pub placed_at: Timestamp,
    /// Last brokerage update.
    pub last_updated_at: Timestamp,
    /// True while a cancel request is outstanding.
    pub cancel_pending: bool,
    /// True if the last read of this order failed.
    pub stale: bool,
    /// Message of the last failed read.
    pub last_error: Option<String>,
}

impl PlacedOrderDto {
    /// Create from a domain order that was just read.
    #[must_use]
    pub fn from_order(order: &PlacedOrder) -> Self {
        Self {
            order_id: order.order_id().to_string(),
            account_id: order.account_id().to_string(),
            symbol: order.symbol().to_string(),
            side: order.side(),
            order_type: order.order_type(),
            quantity: order.quantity().amount(),
            filled_quantity: order.filled_quantity().amount(),
            remaining_quantity: order.remaining_quantity().amount(),
            limit_price: order.limit_price(),
            stop_price: order.stop_price(),
            status: order.status(),
            avg_fill_price: order.avg_fill_price(),
            placed_at: order.placed_at(),
            last_updated_at: order.last_updated_at(),
            cancel_pending: order.is_cancel_pending(),
            stale: false,
            last_error: None,
        }
    }

    /// Create from a cache entry, carrying its staleness.
    #[must_use]
    pub fn from_tracked(tracked: &TrackedOrder) -> Self {
        Self {
            stale: tracked.stale,
            last_error: tracked.last_error.clone(),
            ..Self::from_order(&tracked.order)
        }
    }
}

/// A page of order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderListDto {
    /// Account ID.
    pub account_id: String,
    /// Lookback window used, in days.
    pub lookback_days: u32,
    /// Orders, newest first.
    pub orders: Vec<PlacedOrderDto>,
    /// True if the last list read failed and these are last-known values.
    pub stale: bool,
    /// Message of the last failed read.
    pub last_error: Option<String>,
}
