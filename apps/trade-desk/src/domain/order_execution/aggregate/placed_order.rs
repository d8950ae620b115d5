//! Placed Order Aggregate
//!
//! The committed order as known to the client. Its status only changes
//! by merging snapshots polled from the brokerage; the one client-local
//! write is the pending-cancel marker.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_execution::errors::OrderError;
use crate::domain::order_execution::services::OrderStateMachine;
use crate::domain::order_execution::value_objects::{OrderSide, OrderStatus, OrderType};
use crate::domain::shared::{AccountId, OrderId, Quantity, Symbol, Timestamp};

/// Fields of an order snapshot as reported by the brokerage.
#[derive(Debug, Clone)]
pub struct PlacedOrderParams {
    /// Brokerage order identifier.
    pub order_id: OrderId,
    /// Account the order belongs to.
    pub account_id: AccountId,
    /// Instrument.
    pub symbol: Symbol,
    /// Buy or sell.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Ordered quantity.
    pub quantity: Quantity,
    /// Quantity filled so far.
    pub filled_quantity: Quantity,
    /// Limit price, for LIMIT and STOP_LIMIT.
    pub limit_price: Option<Decimal>,
    /// Stop price, for STOP and STOP_LIMIT.
    pub stop_price: Option<Decimal>,
    /// Current status.
    pub status: OrderStatus,
    /// Average fill price, once anything has filled.
    pub avg_fill_price: Option<Decimal>,
    /// When the order was placed.
    pub placed_at: Timestamp,
    /// When the brokerage last changed the order.
    pub last_updated_at: Timestamp,
}

/// Result of merging a polled snapshot into a known order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The snapshot was newer and has been applied.
    Applied,
    /// The snapshot was not newer than what is already known.
    Stale,
    /// The order is terminal and the snapshot tried to move it.
    Frozen,
    /// The snapshot described a transition the lifecycle forbids.
    Invalid,
}

impl MergeOutcome {
    /// Label for logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Stale => "stale",
            Self::Frozen => "frozen",
            Self::Invalid => "invalid",
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    order_id: OrderId,
    account_id: AccountId,
    symbol: Symbol,
    side: OrderSide,
    order_type: OrderType,
    quantity: Quantity,
    filled_quantity: Quantity,
    limit_price: Option<Decimal>,
    stop_price: Option<Decimal>,
    status: OrderStatus,
    avg_fill_price: Option<Decimal>,
    placed_at: Timestamp,
    last_updated_at: Timestamp,
    cancel_requested_at: Option<Timestamp>,
    revision: u64,
}

impl PlacedOrder {
    /// Build an order from a brokerage snapshot.
    #[must_use]
    pub fn from_snapshot(params: PlacedOrderParams) -> Self {
        Self {
            order_id: params.order_id,
            account_id: params.account_id,
            symbol: params.symbol,
            side: params.side,
            order_type: params.order_type,
            quantity: params.quantity,
            filled_quantity: params.filled_quantity,
            limit_price: params.limit_price,
            stop_price: params.stop_price,
            status: params.status,
            avg_fill_price: params.avg_fill_price,
            placed_at: params.placed_at,
            last_updated_at: params.last_updated_at,
            cancel_requested_at: None,
            revision: 0,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Brokerage order identifier.
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Owning account.
    #[must_use]
    pub const fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Instrument.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Buy or sell.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Order type.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Ordered quantity.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Filled quantity.
    #[must_use]
    pub const fn filled_quantity(&self) -> Quantity {
        self.filled_quantity
    }

    /// Unfilled quantity.
    #[must_use]
    pub fn remaining_quantity(&self) -> Quantity {
        self.quantity.remaining_after(self.filled_quantity)
    }

    /// Limit price.
    #[must_use]
    pub const fn limit_price(&self) -> Option<Decimal> {
        self.limit_price
    }

    /// Stop price.
    #[must_use]
    pub const fn stop_price(&self) -> Option<Decimal> {
        self.stop_price
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Average fill price.
    #[must_use]
    pub const fn avg_fill_price(&self) -> Option<Decimal> {
        self.avg_fill_price
    }

    /// Placement time.
    #[must_use]
    pub const fn placed_at(&self) -> Timestamp {
        self.placed_at
    }

    /// Brokerage's last-change time, the merge key.
    #[must_use]
    pub const fn last_updated_at(&self) -> Timestamp {
        self.last_updated_at
    }

    /// When a cancel request was accepted, while it is still pending.
    #[must_use]
    pub const fn cancel_requested_at(&self) -> Option<Timestamp> {
        self.cancel_requested_at
    }

    /// Number of snapshots applied since the order was first seen.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns true once the order is filled, cancelled or rejected.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns true while a cancel request is outstanding.
    #[must_use]
    pub const fn is_cancel_pending(&self) -> bool {
        self.cancel_requested_at.is_some() && !self.status.is_terminal()
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Check whether a cancel request may be sent.
    ///
    /// # Errors
    ///
    /// `AlreadyFinalized` for terminal orders, `NotCancellable` while
    /// the order is still `Submitted`.
    pub fn ensure_cancellable(&self) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::AlreadyFinalized {
                order_id: self.order_id.to_string(),
                status: self.status,
            });
        }
        if !self.status.is_cancellable() {
            return Err(OrderError::NotCancellable {
                order_id: self.order_id.to_string(),
                status: self.status,
            });
        }
        Ok(())
    }

    /// Claim the right to send a cancel request.
    ///
    /// Sets the pending-cancel marker if the order is cancellable.
    /// Returns false if a request is already pending; the caller must
    /// not send another.
    ///
    /// # Errors
    ///
    /// Same as [`Self::ensure_cancellable`].
    pub fn begin_cancel(&mut self, at: Timestamp) -> Result<bool, OrderError> {
        if self.is_cancel_pending() {
            return Ok(false);
        }
        self.ensure_cancellable()?;
        self.cancel_requested_at = Some(at);
        Ok(true)
    }

    /// Drop the pending-cancel marker after a request that did not go through.
    pub fn release_cancel(&mut self) {
        self.cancel_requested_at = None;
    }

    /// Merge a newer snapshot of the same order.
    ///
    /// Snapshots are ordered by `last_updated_at`, not by arrival: a
    /// snapshot that is not strictly newer is ignored. Terminal orders
    /// never change status again.
    ///
    /// # Errors
    ///
    /// Returns error if the snapshot describes a different order.
    pub fn merge(&mut self, incoming: &Self) -> Result<MergeOutcome, OrderError> {
        if incoming.order_id != self.order_id {
            return Err(OrderError::OrderMismatch {
                expected: self.order_id.to_string(),
                actual: incoming.order_id.to_string(),
            });
        }

        if incoming.last_updated_at <= self.last_updated_at {
            return Ok(MergeOutcome::Stale);
        }

        if self.status.is_terminal() && incoming.status != self.status {
            return Ok(MergeOutcome::Frozen);
        }

        if !self.status.is_terminal()
            && OrderStateMachine::validate_transition(self.status, incoming.status).is_err()
        {
            return Ok(MergeOutcome::Invalid);
        }

        self.status = incoming.status;
        self.filled_quantity = incoming.filled_quantity;
        self.avg_fill_price = incoming.avg_fill_price;
        self.limit_price = incoming.limit_price;
        self.stop_price = incoming.stop_price;
        self.last_updated_at = incoming.last_updated_at;
        if self.status.is_terminal() {
            self.cancel_requested_at = None;
        }
        self.revision += 1;

        Ok(MergeOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn at(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn snapshot(status: OrderStatus, updated: &str) -> PlacedOrder {
        PlacedOrder::from_snapshot(PlacedOrderParams {
            order_id: OrderId::new("o1"),
            account_id: AccountId::new("acct-1"),
            symbol: Symbol::new("AAPL"),
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            quantity: Quantity::from_i64(10),
            filled_quantity: Quantity::ZERO,
            limit_price: None,
            stop_price: None,
            status,
            avg_fill_price: None,
            placed_at: at("2026-03-02T14:30:00Z"),
            last_updated_at: at(updated),
        })
    }

    #[test]
    fn newer_snapshot_is_applied() {
        let mut order = snapshot(OrderStatus::Submitted, "2026-03-02T14:30:00Z");
        let outcome = order
            .merge(&snapshot(OrderStatus::Open, "2026-03-02T14:30:01Z"))
            .unwrap();
        assert_eq!(outcome, MergeOutcome::Applied);
        assert_eq!(order.status(), OrderStatus::Open);
        assert_eq!(order.revision(), 1);
    }

    #[test]
    fn older_snapshot_arriving_late_is_ignored() {
        let mut order = snapshot(OrderStatus::Open, "2026-03-02T14:30:05Z");
        let outcome = order
            .merge(&snapshot(OrderStatus::Submitted, "2026-03-02T14:30:01Z"))
            .unwrap();
        assert_eq!(outcome, MergeOutcome::Stale);
        assert_eq!(order.status(), OrderStatus::Open);
        assert_eq!(order.revision(), 0);
    }

    #[test]
    fn equal_timestamp_is_ignored() {
        let mut order = snapshot(OrderStatus::Open, "2026-03-02T14:30:05Z");
        let outcome = order
            .merge(&snapshot(OrderStatus::Filled, "2026-03-02T14:30:05Z"))
            .unwrap();
        assert_eq!(outcome, MergeOutcome::Stale);
    }

    #[test]
    fn terminal_order_is_frozen() {
        let mut order = snapshot(OrderStatus::Cancelled, "2026-03-02T14:30:05Z");
        let outcome = order
            .merge(&snapshot(OrderStatus::Open, "2026-03-02T14:31:00Z"))
            .unwrap();
        assert_eq!(outcome, MergeOutcome::Frozen);
        assert_eq!(order.status(), OrderStatus::Cancelled);
    }

    #[test]
    fn backwards_transition_is_invalid() {
        let mut order = snapshot(OrderStatus::PartiallyFilled, "2026-03-02T14:30:05Z");
        let outcome = order
            .merge(&snapshot(OrderStatus::Open, "2026-03-02T14:31:00Z"))
            .unwrap();
        assert_eq!(outcome, MergeOutcome::Invalid);
        assert_eq!(order.status(), OrderStatus::PartiallyFilled);
    }

    #[test]
    fn fill_progress_is_applied() {
        let mut order = snapshot(OrderStatus::Open, "2026-03-02T14:30:00Z");
        let mut partial = snapshot(OrderStatus::PartiallyFilled, "2026-03-02T14:30:02Z");
        partial.filled_quantity = Quantity::from_i64(4);
        partial.avg_fill_price = Some(dec!(150.10));
        order.merge(&partial).unwrap();
        assert_eq!(order.remaining_quantity(), Quantity::from_i64(6));
        assert_eq!(order.avg_fill_price(), Some(dec!(150.10)));
    }

    #[test]
    fn different_order_is_an_error() {
        let mut order = snapshot(OrderStatus::Open, "2026-03-02T14:30:00Z");
        let mut other = snapshot(OrderStatus::Open, "2026-03-02T14:31:00Z");
        other.order_id = OrderId::new("o2");
        assert!(matches!(
            order.merge(&other),
            Err(OrderError::OrderMismatch { .. })
        ));
    }

    #[test]
    fn cancel_checks_by_status() {
        assert!(snapshot(OrderStatus::Open, "2026-03-02T14:30:00Z").ensure_cancellable().is_ok());
        assert!(matches!(
            snapshot(OrderStatus::Submitted, "2026-03-02T14:30:00Z").ensure_cancellable(),
            Err(OrderError::NotCancellable { .. })
        ));
        for status in [OrderStatus::Filled, OrderStatus::Cancelled, OrderStatus::Rejected] {
            assert!(matches!(
                snapshot(status, "2026-03-02T14:30:00Z").ensure_cancellable(),
                Err(OrderError::AlreadyFinalized { .. })
            ));
        }
    }

    #[test]
    fn cancel_marker_set_once_and_cleared_on_terminal() {
        let mut order = snapshot(OrderStatus::Open, "2026-03-02T14:30:00Z");
        assert!(order.begin_cancel(at("2026-03-02T14:30:03Z")).unwrap());
        assert!(!order.begin_cancel(at("2026-03-02T14:30:04Z")).unwrap());
        assert!(order.is_cancel_pending());

        order
            .merge(&snapshot(OrderStatus::Cancelled, "2026-03-02T14:30:06Z"))
            .unwrap();
        assert_eq!(order.cancel_requested_at(), None);
        assert!(!order.is_cancel_pending());
    }

    #[test]
    fn cancel_marker_survives_non_terminal_snapshot() {
        let mut order = snapshot(OrderStatus::Open, "2026-03-02T14:30:00Z");
        order.begin_cancel(at("2026-03-02T14:30:03Z")).unwrap();
        order
            .merge(&snapshot(OrderStatus::PartiallyFilled, "2026-03-02T14:30:06Z"))
            .unwrap();
        assert!(order.is_cancel_pending());
    }

    #[test]
    fn begin_cancel_refuses_orders_that_cannot_be_cancelled() {
        let mut filled = snapshot(OrderStatus::Filled, "2026-03-02T14:30:00Z");
        assert!(matches!(
            filled.begin_cancel(at("2026-03-02T14:30:03Z")),
            Err(OrderError::AlreadyFinalized { .. })
        ));
        assert_eq!(filled.cancel_requested_at(), None);

        let mut submitted = snapshot(OrderStatus::Submitted, "2026-03-02T14:30:00Z");
        assert!(matches!(
            submitted.begin_cancel(at("2026-03-02T14:30:03Z")),
            Err(OrderError::NotCancellable { .. })
        ));
        assert_eq!(submitted.cancel_requested_at(), None);
    }

    #[test]
    fn released_cancel_can_be_claimed_again() {
        let mut order = snapshot(OrderStatus::Open, "2026-03-02T14:30:00Z");
        assert!(order.begin_cancel(at("2026-03-02T14:30:03Z")).unwrap());
        order.release_cancel();
        assert!(!order.is_cancel_pending());
        assert!(order.begin_cancel(at("2026-03-02T14:30:05Z")).unwrap());
    }
}
