//! Order Lifecycle Tracker Use Case
//!
//! Reads placed orders from the brokerage, merges every response into
//! the order cache and handles cancellation. A failed read never clears
//! what is already known; it marks it stale.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::ports::{GatewayError, OrderLifecyclePort};
use crate::domain::order_execution::{
    MergeOutcome, OrderCache, OrderError, OrderStatus, PlacedOrder, TrackedOrder,
};
use crate::domain::shared::{AccountId, OrderId, Timestamp};
use crate::observability::{record_cancel, record_poll, record_snapshot_merge};

// ============================================================================
// Types
// ============================================================================

/// Lookback window for order history, in whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWindow {
    lookback_days: u32,
}

impl OrderWindow {
    /// A window clamped to `1..=max_days`.
    #[must_use]
    pub fn clamped(lookback_days: u32, max_days: u32) -> Self {
        Self {
            lookback_days: lookback_days.clamp(1, max_days.max(1)),
        }
    }

    /// Days of history covered.
    #[must_use]
    pub const fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    /// Earliest placement time included, relative to `now`.
    #[must_use]
    pub fn since(&self, now: Timestamp) -> Timestamp {
        now.minus_days(i64::from(self.lookback_days))
    }
}

/// Result of listing an account's orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderList {
    /// Account the orders belong to.
    pub account_id: AccountId,
    /// Window that was read.
    pub window: OrderWindow,
    /// Orders, newest placement first.
    pub orders: Vec<TrackedOrder>,
    /// True if the read failed and the orders are last-known-good.
    pub stale: bool,
    /// Message of the failed read.
    pub last_error: Option<String>,
}

/// Successful cancel outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelOutcome {
    /// The brokerage accepted the cancel request.
    Requested,
    /// A cancel request is already pending for this order.
    AlreadyRequested,
}

/// Order lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Cancel attempted on a filled, cancelled or rejected order.
    #[error("order {order_id} is already finalized")]
    AlreadyFinalized {
        /// Order ID.
        order_id: OrderId,
        /// Terminal status, if known.
        status: Option<OrderStatus>,
    },

    /// Cancel attempted before the order is working.
    #[error("order {order_id} cannot be cancelled while {status}")]
    NotCancellable {
        /// Order ID.
        order_id: OrderId,
        /// Current status.
        status: OrderStatus,
    },

    /// The brokerage does not know the order.
    #[error("order {order_id} not found")]
    NotFound {
        /// Order ID.
        order_id: OrderId,
    },

    /// The read or cancel failed; the next poll may succeed.
    #[error("order status unavailable: {message}")]
    Unavailable {
        /// Failure description.
        message: String,
    },
}

impl From<OrderError> for LifecycleError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::AlreadyFinalized { order_id, status } => Self::AlreadyFinalized {
                order_id: OrderId::new(order_id),
                status: Some(status),
            },
            OrderError::NotCancellable { order_id, status } => Self::NotCancellable {
                order_id: OrderId::new(order_id),
                status,
            },
            OrderError::UnknownOrder { order_id } => Self::NotFound {
                order_id: OrderId::new(order_id),
            },
            other => Self::Unavailable {
                message: other.to_string(),
            },
        }
    }
}

impl LifecycleError {
    /// Short label for metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AlreadyFinalized { .. } => "already_finalized",
            Self::NotCancellable { .. } => "not_cancellable",
            Self::NotFound { .. } => "not_found",
            Self::Unavailable { .. } => "unavailable",
        }
    }
}

// ============================================================================
// Use Case
// ============================================================================

/// Use case for following placed orders and cancelling them.
pub struct OrderLifecycleTracker<L, S>
where
    L: OrderLifecyclePort,
    S: OrderCache,
{
    lifecycle: Arc<L>,
    cache: Arc<S>,
    max_lookback_days: u32,
}

impl<L, S> Clone for OrderLifecycleTracker<L, S>
where
    L: OrderLifecyclePort,
    S: OrderCache,
{
    fn clone(&self) -> Self {
        Self {
            lifecycle: Arc::clone(&self.lifecycle),
            cache: Arc::clone(&self.cache),
            max_lookback_days: self.max_lookback_days,
        }
    }
}

impl<L, S> OrderLifecycleTracker<L, S>
where
    L: OrderLifecyclePort,
    S: OrderCache,
{
    /// Create a new tracker.
    pub const fn new(lifecycle: Arc<L>, cache: Arc<S>, max_lookback_days: u32) -> Self {
        Self {
            lifecycle,
            cache,
            max_lookback_days,
        }
    }

    /// Build a window clamped to this tracker's maximum lookback.
    #[must_use]
    pub fn window(&self, lookback_days: u32) -> OrderWindow {
        OrderWindow::clamped(lookback_days, self.max_lookback_days)
    }

    /// Read an account's orders and merge them into the cache.
    ///
    /// The result also contains cached orders the brokerage list did not
    /// include yet (an order placed a moment ago, for example).
    ///
    /// # Errors
    ///
    /// `Unavailable` if the read failed and nothing is cached for the
    /// account. If something is cached, it is returned marked stale.
    pub async fn list_orders(
        &self,
        account_id: &AccountId,
        window: OrderWindow,
    ) -> Result<OrderList, LifecycleError> {
        let now = Timestamp::now();
        let since = window.since(now);

        match self.lifecycle.list_orders(account_id, since).await {
            Ok(orders) => {
                record_poll("list", "ok");
                for order in orders {
                    self.merge(order, now).await;
                }
                let orders = self.cache.list_for_account(account_id, since).await?;
                tracing::debug!(account_id = %account_id, count = orders.len(), "Orders listed");
                Ok(OrderList {
                    account_id: account_id.clone(),
                    window,
                    orders,
                    stale: false,
                    last_error: None,
                })
            }
            Err(err) => {
                record_poll("list", "error");
                let message = err.to_string();
                tracing::warn!(
                    account_id = %account_id,
                    error = %message,
                    "Order list read failed"
                );
                self.cache.mark_account_stale(account_id, &message).await?;
                let orders = self.cache.list_for_account(account_id, since).await?;
                if orders.is_empty() {
                    return Err(LifecycleError::Unavailable { message });
                }
                Ok(OrderList {
                    account_id: account_id.clone(),
                    window,
                    orders,
                    stale: true,
                    last_error: Some(message),
                })
            }
        }
    }

    /// Refresh one order.
    ///
    /// # Errors
    ///
    /// `NotFound` if the brokerage does not know the order; `Unavailable`
    /// if the read failed and the order was never seen. A known order is
    /// returned marked stale instead.
    pub async fn get_order(&self, order_id: &OrderId) -> Result<TrackedOrder, LifecycleError> {
        match self.lifecycle.get_order(order_id).await {
            Ok(order) => {
                record_poll("order", "ok");
                if order.order_id() != order_id {
                    return Err(LifecycleError::Unavailable {
                        message: format!(
                            "requested order {order_id} but received {}",
                            order.order_id()
                        ),
                    });
                }
                self.merge(order, Timestamp::now()).await;
                self.cache
                    .get(order_id)
                    .await?
                    .ok_or_else(|| LifecycleError::NotFound {
                        order_id: order_id.clone(),
                    })
            }
            Err(GatewayError::NotFound { .. }) => {
                record_poll("order", "not_found");
                Err(LifecycleError::NotFound {
                    order_id: order_id.clone(),
                })
            }
            Err(err) => {
                record_poll("order", "error");
                let message = err.to_string();
                tracing::warn!(order_id = %order_id, error = %message, "Order read failed");
                self.cache.mark_stale(order_id, &message).await?;
                self.cache
                    .get(order_id)
                    .await?
                    .ok_or(LifecycleError::Unavailable { message })
            }
        }
    }

    /// Last-known-good state of an order, without a network call.
    ///
    /// # Errors
    ///
    /// Returns error if the cache cannot be read.
    pub async fn cached(&self, order_id: &OrderId) -> Result<Option<TrackedOrder>, LifecycleError> {
        Ok(self.cache.get(order_id).await?)
    }

    /// Cancel an order.
    ///
    /// Cancelling a terminal order reports `AlreadyFinalized` without
    /// touching the order; cancelling again while a request is pending
    /// reports `AlreadyRequested`. The pending marker is claimed before
    /// the request goes out, so concurrent cancels of one order send a
    /// single request. A failed request leaves the status as it was.
    ///
    /// # Errors
    ///
    /// `AlreadyFinalized`, `NotCancellable` (still `Submitted`),
    /// `NotFound`, or `Unavailable` if the request failed.
    pub async fn cancel(&self, order_id: &OrderId) -> Result<CancelOutcome, LifecycleError> {
        let result = self.try_cancel(order_id).await;
        let outcome = match &result {
            Ok(CancelOutcome::Requested) => "requested",
            Ok(CancelOutcome::AlreadyRequested) => "already_requested",
            Err(err) => err.kind(),
        };
        record_cancel(outcome);
        tracing::info!(order_id = %order_id, outcome, "Cancel handled");
        result
    }

    async fn try_cancel(&self, order_id: &OrderId) -> Result<CancelOutcome, LifecycleError> {
        let needs_refresh = !matches!(
            self.cache.get(order_id).await?,
            Some(tracked) if tracked.order.status() != OrderStatus::Submitted
        );
        if needs_refresh {
            // Submitted orders may have started working since the last read.
            self.get_order(order_id).await?;
        }

        if !self.cache.begin_cancel(order_id, Timestamp::now()).await? {
            return Ok(CancelOutcome::AlreadyRequested);
        }

        match self.lifecycle.cancel_order(order_id).await {
            Ok(()) => Ok(CancelOutcome::Requested),
            Err(GatewayError::CancelPending { .. }) => Ok(CancelOutcome::AlreadyRequested),
            Err(err) => {
                if let Err(e) = self.cache.release_cancel(order_id).await {
                    tracing::error!(
                        order_id = %order_id,
                        error = %e,
                        "Failed to release cancel marker"
                    );
                }
                Err(self.cancel_failed(order_id, err).await)
            }
        }
    }

    /// Classify a cancel request the brokerage refused.
    async fn cancel_failed(&self, order_id: &OrderId, err: GatewayError) -> LifecycleError {
        match err {
            GatewayError::AlreadyFinalized { status, .. } => {
                let status = match self.get_order(order_id).await {
                    Ok(tracked) if !tracked.stale => Some(tracked.order.status()),
                    _ => status,
                };
                match status {
                    Some(status) if !status.is_terminal() => {
                        tracing::warn!(
                            order_id = %order_id,
                            status = %status,
                            "Cancel refused as finalized but order is still working"
                        );
                        LifecycleError::Unavailable {
                            message: format!("cancel of order {order_id} refused while {status}"),
                        }
                    }
                    status => LifecycleError::AlreadyFinalized {
                        order_id: order_id.clone(),
                        status,
                    },
                }
            }
            GatewayError::NotFound { .. } => LifecycleError::NotFound {
                order_id: order_id.clone(),
            },
            err => {
                tracing::warn!(order_id = %order_id, error = %err, "Cancel request failed");
                LifecycleError::Unavailable {
                    message: err.to_string(),
                }
            }
        }
    }

    /// Merge a snapshot, logging anything that was not applied.
    async fn merge(&self, order: PlacedOrder, read_at: Timestamp) {
        let order_id = order.order_id().clone();
        match self.cache.merge(order, read_at).await {
            Ok(outcome) => {
                record_snapshot_merge(outcome.as_str());
                if outcome != MergeOutcome::Applied {
                    tracing::debug!(
                        order_id = %order_id,
                        outcome = outcome.as_str(),
                        "Snapshot not applied"
                    );
                }
            }
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "Failed to merge order snapshot");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use rust_decimal_macros::dec;
    use tokio::sync::Notify;

    use crate::application::ports::MockOrderLifecyclePort;
    use crate::domain::order_execution::{OrderSide, OrderType, PlacedOrderParams};
    use crate::domain::shared::{Quantity, Symbol};
    use crate::infrastructure::persistence::InMemoryOrderCache;

    fn order(id: &str, status: OrderStatus, updated_secs: i64) -> PlacedOrder {
        let placed = Timestamp::now().minus_days(1);
        PlacedOrder::from_snapshot(PlacedOrderParams {
            order_id: OrderId::new(id),
            account_id: AccountId::new("acct-1"),
            symbol: Symbol::new("AAPL"),
            side: OrderSide::Buy,
            order_type: OrderType::Limit,
            quantity: Quantity::from_i64(10),
            filled_quantity: Quantity::ZERO,
            limit_price: Some(dec!(150)),
            stop_price: None,
            status,
            avg_fill_price: None,
            placed_at: placed,
            last_updated_at: placed.plus_seconds(updated_secs),
        })
    }

    type Tracker = OrderLifecycleTracker<MockOrderLifecyclePort, InMemoryOrderCache>;

    fn tracker(mock: MockOrderLifecyclePort) -> (Tracker, Arc<InMemoryOrderCache>) {
        let cache = Arc::new(InMemoryOrderCache::new());
        (OrderLifecycleTracker::new(Arc::new(mock), Arc::clone(&cache), 90), cache)
    }

    #[test]
    fn window_is_clamped() {
        assert_eq!(OrderWindow::clamped(0, 90).lookback_days(), 1);
        assert_eq!(OrderWindow::clamped(7, 90).lookback_days(), 7);
        assert_eq!(OrderWindow::clamped(365, 90).lookback_days(), 90);
    }

    #[tokio::test]
    async fn cancel_open_order_then_already_finalized() {
        let mut mock = MockOrderLifecyclePort::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_cancel_order()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_get_order()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(order("o1", OrderStatus::Cancelled, 20)));
        let (tracker, cache) = tracker(mock);
        cache
            .merge(order("o1", OrderStatus::Open, 10), Timestamp::now())
            .await
            .unwrap();

        let outcome = tracker.cancel(&OrderId::new("o1")).await.unwrap();
        assert_eq!(outcome, CancelOutcome::Requested);
        let pending = tracker.cached(&OrderId::new("o1")).await.unwrap().unwrap();
        assert!(pending.order.is_cancel_pending());

        let polled = tracker.get_order(&OrderId::new("o1")).await.unwrap();
        assert_eq!(polled.order.status(), OrderStatus::Cancelled);
        assert!(!polled.order.is_cancel_pending());

        let err = tracker.cancel(&OrderId::new("o1")).await.unwrap_err();
        assert_eq!(
            err,
            LifecycleError::AlreadyFinalized {
                order_id: OrderId::new("o1"),
                status: Some(OrderStatus::Cancelled)
            }
        );
    }

    #[tokio::test]
    async fn second_cancel_while_pending_is_not_a_failure() {
        let mut mock = MockOrderLifecyclePort::new();
        mock.expect_cancel_order().times(1).returning(|_| Ok(()));
        let (tracker, cache) = tracker(mock);
        cache
            .merge(order("o1", OrderStatus::Open, 10), Timestamp::now())
            .await
            .unwrap();

        assert_eq!(tracker.cancel(&OrderId::new("o1")).await.unwrap(), CancelOutcome::Requested);
        assert_eq!(
            tracker.cancel(&OrderId::new("o1")).await.unwrap(),
            CancelOutcome::AlreadyRequested
        );
    }

    #[tokio::test]
    async fn cancel_terminal_order_makes_no_request() {
        let mut mock = MockOrderLifecyclePort::new();
        mock.expect_cancel_order().times(0);
        let (tracker, cache) = tracker(mock);
        cache
            .merge(order("o1", OrderStatus::Filled, 10), Timestamp::now())
            .await
            .unwrap();

        let err = tracker.cancel(&OrderId::new("o1")).await.unwrap_err();
        assert!(matches!(err, LifecycleError::AlreadyFinalized { .. }));
        let tracked = tracker.cached(&OrderId::new("o1")).await.unwrap().unwrap();
        assert_eq!(tracked.order.status(), OrderStatus::Filled);
    }

    #[tokio::test]
    async fn submitted_order_is_not_cancellable() {
        let mut mock = MockOrderLifecyclePort::new();
        mock.expect_get_order()
            .returning(|_| Ok(order("o1", OrderStatus::Submitted, 0)));
        mock.expect_cancel_order().times(0);
        let (tracker, _) = tracker(mock);

        let err = tracker.cancel(&OrderId::new("o1")).await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::NotCancellable {
                status: OrderStatus::Submitted,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn gateway_already_finalized_is_reported_distinctly() {
        let mut mock = MockOrderLifecyclePort::new();
        mock.expect_cancel_order().returning(|id| {
            Err(GatewayError::AlreadyFinalized {
                order_id: id.to_string(),
                status: None,
            })
        });
        mock.expect_get_order()
            .returning(|_| Ok(order("o1", OrderStatus::Filled, 30)));
        let (tracker, cache) = tracker(mock);
        cache
            .merge(order("o1", OrderStatus::Open, 10), Timestamp::now())
            .await
            .unwrap();

        let err = tracker.cancel(&OrderId::new("o1")).await.unwrap_err();
        assert_eq!(
            err,
            LifecycleError::AlreadyFinalized {
                order_id: OrderId::new("o1"),
                status: Some(OrderStatus::Filled)
            }
        );
    }

    #[tokio::test]
    async fn failed_cancel_leaves_status_unchanged() {
        let mut mock = MockOrderLifecyclePort::new();
        mock.expect_cancel_order().returning(|_| Err(GatewayError::Timeout));
        let (tracker, cache) = tracker(mock);
        cache
            .merge(order("o1", OrderStatus::PartiallyFilled, 10), Timestamp::now())
            .await
            .unwrap();

        let err = tracker.cancel(&OrderId::new("o1")).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Unavailable { .. }));
        let tracked = tracker.cached(&OrderId::new("o1")).await.unwrap().unwrap();
        assert_eq!(tracked.order.status(), OrderStatus::PartiallyFilled);
        assert!(!tracked.order.is_cancel_pending());
    }

    #[tokio::test]
    async fn failed_cancel_can_be_retried() {
        let mut mock = MockOrderLifecyclePort::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_cancel_order()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(GatewayError::Timeout));
        mock.expect_cancel_order()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        let (tracker, cache) = tracker(mock);
        cache
            .merge(order("o1", OrderStatus::Open, 10), Timestamp::now())
            .await
            .unwrap();

        assert!(tracker.cancel(&OrderId::new("o1")).await.is_err());
        assert_eq!(tracker.cancel(&OrderId::new("o1")).await.unwrap(), CancelOutcome::Requested);
    }

    #[tokio::test]
    async fn brokerage_pending_cancel_is_already_requested() {
        let mut mock = MockOrderLifecyclePort::new();
        mock.expect_cancel_order().times(1).returning(|id| {
            Err(GatewayError::CancelPending {
                order_id: id.to_string(),
            })
        });
        mock.expect_get_order().times(0);
        let (tracker, cache) = tracker(mock);
        cache
            .merge(order("o1", OrderStatus::Open, 10), Timestamp::now())
            .await
            .unwrap();

        let outcome = tracker.cancel(&OrderId::new("o1")).await.unwrap();
        assert_eq!(outcome, CancelOutcome::AlreadyRequested);
        let tracked = tracker.cached(&OrderId::new("o1")).await.unwrap().unwrap();
        assert!(tracked.order.is_cancel_pending());
    }

    #[tokio::test]
    async fn finalized_refusal_of_working_order_is_not_finalized() {
        let mut mock = MockOrderLifecyclePort::new();
        mock.expect_cancel_order().returning(|id| {
            Err(GatewayError::AlreadyFinalized {
                order_id: id.to_string(),
                status: None,
            })
        });
        mock.expect_get_order()
            .returning(|_| Ok(order("o1", OrderStatus::PartiallyFilled, 20)));
        let (tracker, cache) = tracker(mock);
        cache
            .merge(order("o1", OrderStatus::Open, 10), Timestamp::now())
            .await
            .unwrap();

        let err = tracker.cancel(&OrderId::new("o1")).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Unavailable { .. }), "{err:?}");
        let tracked = tracker.cached(&OrderId::new("o1")).await.unwrap().unwrap();
        assert_eq!(tracked.order.status(), OrderStatus::PartiallyFilled);
        assert!(!tracked.order.is_cancel_pending());
    }

    /// Brokerage whose cancel call parks until released.
    #[derive(Default)]
    struct GatedLifecycle {
        calls: AtomicUsize,
        entered: Notify,
        gate: Notify,
    }

    #[async_trait::async_trait]
    impl OrderLifecyclePort for GatedLifecycle {
        async fn list_orders(
            &self,
            _account_id: &AccountId,
            _since: Timestamp,
        ) -> Result<Vec<PlacedOrder>, GatewayError> {
            Ok(Vec::new())
        }

        async fn get_order(&self, order_id: &OrderId) -> Result<PlacedOrder, GatewayError> {
            Ok(order(order_id.as_str(), OrderStatus::Open, 10))
        }

        async fn cancel_order(&self, _order_id: &OrderId) -> Result<(), GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.gate.notified().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn concurrent_cancels_send_one_request() {
        let port = Arc::new(GatedLifecycle::default());
        let cache = Arc::new(InMemoryOrderCache::new());
        cache
            .merge(order("o1", OrderStatus::Open, 10), Timestamp::now())
            .await
            .unwrap();
        let tracker = OrderLifecycleTracker::new(Arc::clone(&port), cache, 90);

        let first = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.cancel(&OrderId::new("o1")).await }
        });
        port.entered.notified().await;

        let second = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.cancel(&OrderId::new("o1")).await }
        });
        assert_eq!(second.await.unwrap().unwrap(), CancelOutcome::AlreadyRequested);

        port.gate.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), CancelOutcome::Requested);
        assert_eq!(port.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_read_keeps_last_known_good() {
        let mut mock = MockOrderLifecyclePort::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_get_order()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(order("o1", OrderStatus::Open, 10)));
        mock.expect_get_order()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(GatewayError::Connection { message: "reset".to_string() }));
        let (tracker, _) = tracker(mock);

        tracker.get_order(&OrderId::new("o1")).await.unwrap();
        let stale = tracker.get_order(&OrderId::new("o1")).await.unwrap();
        assert!(stale.stale);
        assert_eq!(stale.order.status(), OrderStatus::Open);
        assert!(stale.last_error.unwrap().contains("reset"));
    }

    #[tokio::test]
    async fn failed_read_of_unknown_order_is_unavailable() {
        let mut mock = MockOrderLifecyclePort::new();
        mock.expect_get_order().returning(|_| Err(GatewayError::Timeout));
        let (tracker, _) = tracker(mock);

        let err = tracker.get_order(&OrderId::new("o1")).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn older_response_does_not_regress_order() {
        let mut mock = MockOrderLifecyclePort::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_get_order()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(order("o1", OrderStatus::PartiallyFilled, 20)));
        mock.expect_get_order()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(order("o1", OrderStatus::Open, 10)));
        let (tracker, _) = tracker(mock);

        tracker.get_order(&OrderId::new("o1")).await.unwrap();
        let tracked = tracker.get_order(&OrderId::new("o1")).await.unwrap();
        assert_eq!(tracked.order.status(), OrderStatus::PartiallyFilled);
    }

    #[tokio::test]
    async fn list_falls_back_to_stale_cache() {
        let mut mock = MockOrderLifecyclePort::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_list_orders()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(vec![
                    order("o1", OrderStatus::Open, 1),
                    order("o2", OrderStatus::Filled, 2),
                ])
            });
        mock.expect_list_orders()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(GatewayError::RateLimited));
        let (tracker, _) = tracker(mock);
        let account = AccountId::new("acct-1");
        let window = tracker.window(7);

        let fresh = tracker.list_orders(&account, window).await.unwrap();
        assert_eq!(fresh.orders.len(), 2);
        assert!(!fresh.stale);

        let stale = tracker.list_orders(&account, window).await.unwrap();
        assert!(stale.stale);
        assert_eq!(stale.orders.len(), 2);
        assert!(stale.orders.iter().all(|t| t.stale));
    }

    #[tokio::test]
    async fn list_failure_with_empty_cache_is_unavailable() {
        let mut mock = MockOrderLifecyclePort::new();
        mock.expect_list_orders()
            .returning(|_, _| Err(GatewayError::Timeout));
        let (tracker, _) = tracker(mock);

        let err = tracker
            .list_orders(&AccountId::new("acct-1"), OrderWindow::clamped(7, 90))
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Unavailable { .. }));
    }
}
