//! Order Lifecycle Port (Driven Port)
//!
//! Read and cancel access to placed orders at the brokerage.

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::order_execution::PlacedOrder;
use crate::domain::shared::{AccountId, OrderId, Timestamp};

/// Port for following placed orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderLifecyclePort: Send + Sync {
    /// Orders of an account placed at or after `since`.
    async fn list_orders(
        &self,
        account_id: &AccountId,
        since: Timestamp,
    ) -> Result<Vec<PlacedOrder>, GatewayError>;

    /// Current snapshot of one order.
    async fn get_order(&self, order_id: &OrderId) -> Result<PlacedOrder, GatewayError>;

    /// Request cancellation.
    ///
    /// Returns `GatewayError::AlreadyFinalized` if the order is terminal
    /// and `GatewayError::CancelPending` if a cancel is already in flight.
    async fn cancel_order(&self, order_id: &OrderId) -> Result<(), GatewayError>;
}
