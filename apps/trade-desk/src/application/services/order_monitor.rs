//! Order Monitor Service
//!
//! Polling loops behind the order views of the trading surfaces: an
//! account list refreshed on a slow cadence and focused single-order
//! views refreshed on a fast one. Each loop belongs to the handle that
//! started it and stops when the handle is dropped.
//!
//! Views only move forward: a response is published per order only if
//! it is at least as new as what the view already shows, so a manual
//! refresh racing the automatic poll cannot roll a view back.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::application::ports::OrderLifecyclePort;
use crate::application::use_cases::{
    CancelOutcome, LifecycleError, OrderLifecycleTracker, OrderList, OrderWindow,
};
use crate::domain::order_execution::{OrderCache, TrackedOrder};
use crate::domain::shared::{AccountId, OrderId, Timestamp};

/// Configuration for the order monitor.
#[derive(Debug, Clone)]
pub struct OrderMonitorConfig {
    /// Account list polling interval (milliseconds).
    pub list_interval_ms: u64,
    /// Focused order polling interval (milliseconds).
    pub focus_interval_ms: u64,
}

impl Default for OrderMonitorConfig {
    fn default() -> Self {
        Self {
            list_interval_ms: 30_000,
            focus_interval_ms: 3_000,
        }
    }
}

// ============================================================================
// Views
// ============================================================================

/// What an account order view shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    /// Account.
    pub account_id: AccountId,
    /// Window being polled.
    pub window: OrderWindow,
    /// Orders, newest placement first.
    pub orders: Vec<TrackedOrder>,
    /// True if the latest read failed.
    pub stale: bool,
    /// Message of the latest failed read.
    pub last_error: Option<String>,
    /// Number of responses applied to this view.
    pub poll_seq: u64,
    /// When the view last changed.
    pub updated_at: Option<Timestamp>,
}

impl AccountView {
    fn empty(account_id: AccountId, window: OrderWindow) -> Self {
        Self {
            account_id,
            window,
            orders: Vec::new(),
            stale: false,
            last_error: None,
            poll_seq: 0,
            updated_at: None,
        }
    }

    /// Apply a list response, keeping any order the view already shows
    /// at a later revision.
    pub fn apply(&mut self, list: OrderList) {
        let orders = list
            .orders
            .into_iter()
            .map(|incoming| {
                match self
                    .orders
                    .iter()
                    .find(|shown| shown.order.order_id() == incoming.order.order_id())
                {
                    Some(shown) if shown.order.revision() > incoming.order.revision() => {
                        shown.clone()
                    }
                    _ => incoming,
                }
            })
            .collect();
        self.orders = orders;
        self.stale = list.stale;
        self.last_error = list.last_error;
        self.poll_seq += 1;
        self.updated_at = Some(Timestamp::now());
    }

    /// Record a failed read without touching the orders.
    pub fn apply_failure(&mut self, error: &LifecycleError) {
        self.stale = true;
        self.last_error = Some(error.to_string());
        for tracked in &mut self.orders {
            tracked.mark_stale(error.to_string());
        }
        self.poll_seq += 1;
        self.updated_at = Some(Timestamp::now());
    }
}

/// What a focused order view shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
    /// Order being watched.
    pub order_id: OrderId,
    /// Latest known state, if any read has succeeded.
    pub order: Option<TrackedOrder>,
    /// Message of the latest failed read.
    pub last_error: Option<String>,
    /// Number of responses applied to this view.
    pub poll_seq: u64,
}

impl OrderView {
    const fn empty(order_id: OrderId) -> Self {
        Self {
            order_id,
            order: None,
            last_error: None,
            poll_seq: 0,
        }
    }

    /// Apply a single-order response unless the view is already newer.
    pub fn apply(&mut self, incoming: TrackedOrder) {
        let older = self
            .order
            .as_ref()
            .is_some_and(|shown| shown.order.revision() > incoming.order.revision());
        if !older {
            self.last_error.clone_from(&incoming.last_error);
            self.order = Some(incoming);
        }
        self.poll_seq += 1;
    }

    /// Record a failed read.
    pub fn apply_failure(&mut self, error: &LifecycleError) {
        if let Some(shown) = self.order.as_mut() {
            shown.mark_stale(error.to_string());
        }
        self.last_error = Some(error.to_string());
        self.poll_seq += 1;
    }

    /// Returns true once the order is terminal and the view is fresh.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.order
            .as_ref()
            .is_some_and(|t| t.order.is_terminal() && !t.stale)
    }
}

// ============================================================================
// Feeds
// ============================================================================

struct AccountFeed<L: OrderLifecyclePort, S: OrderCache> {
    tracker: OrderLifecycleTracker<L, S>,
    account_id: AccountId,
    window: OrderWindow,
    tx: watch::Sender<AccountView>,
}

impl<L: OrderLifecyclePort, S: OrderCache> AccountFeed<L, S> {
    async fn poll(&self) -> Result<AccountView, LifecycleError> {
        match self.tracker.list_orders(&self.account_id, self.window).await {
            Ok(list) => {
                self.tx.send_modify(|view| view.apply(list));
                Ok(self.tx.borrow().clone())
            }
            Err(e) => {
                self.tx.send_modify(|view| view.apply_failure(&e));
                Err(e)
            }
        }
    }
}

struct OrderFeed<L: OrderLifecyclePort, S: OrderCache> {
    tracker: OrderLifecycleTracker<L, S>,
    order_id: OrderId,
    tx: watch::Sender<OrderView>,
}

impl<L: OrderLifecyclePort, S: OrderCache> OrderFeed<L, S> {
    async fn poll(&self) -> Result<OrderView, LifecycleError> {
        match self.tracker.get_order(&self.order_id).await {
            Ok(tracked) => {
                self.tx.send_modify(|view| view.apply(tracked));
                Ok(self.tx.borrow().clone())
            }
            Err(e) => {
                self.tx.send_modify(|view| view.apply_failure(&e));
                Err(e)
            }
        }
    }
}

// ============================================================================
// Handles
// ============================================================================

/// Handle to an account order view. Polling stops when it is dropped.
pub struct AccountWatch<L: OrderLifecyclePort, S: OrderCache> {
    feed: Arc<AccountFeed<L, S>>,
    rx: watch::Receiver<AccountView>,
    _guard: DropGuard,
}

impl<L: OrderLifecyclePort, S: OrderCache> AccountWatch<L, S> {
    /// Current view.
    pub fn view(&self) -> AccountView {
        self.rx.borrow().clone()
    }

    /// Receive the view whenever it changes.
    pub fn subscribe(&self) -> watch::Receiver<AccountView> {
        self.feed.tx.subscribe()
    }

    /// Number of live subscriptions besides this handle.
    pub fn subscriber_count(&self) -> usize {
        self.feed.tx.receiver_count().saturating_sub(1)
    }

    /// Poll now, alongside the automatic loop.
    ///
    /// # Errors
    ///
    /// Returns error if the read failed and nothing is cached.
    pub async fn refresh(&self) -> Result<AccountView, LifecycleError> {
        self.feed.poll().await
    }
}

/// Handle to a focused order view. Polling stops when it is dropped or
/// once the order is terminal.
pub struct OrderWatch<L: OrderLifecyclePort, S: OrderCache> {
    feed: Arc<OrderFeed<L, S>>,
    rx: watch::Receiver<OrderView>,
    _guard: DropGuard,
}

impl<L: OrderLifecyclePort, S: OrderCache> OrderWatch<L, S> {
    /// Current view.
    pub fn view(&self) -> OrderView {
        self.rx.borrow().clone()
    }

    /// Receive the view whenever it changes.
    pub fn subscribe(&self) -> watch::Receiver<OrderView> {
        self.feed.tx.subscribe()
    }

    /// Number of live subscriptions besides this handle.
    pub fn subscriber_count(&self) -> usize {
        self.feed.tx.receiver_count().saturating_sub(1)
    }

    /// Poll now, alongside the automatic loop.
    ///
    /// # Errors
    ///
    /// Returns error if the read failed and the order was never seen.
    pub async fn refresh(&self) -> Result<OrderView, LifecycleError> {
        self.feed.poll().await
    }

    /// Cancel the watched order, then refresh the view.
    ///
    /// # Errors
    ///
    /// See [`OrderLifecycleTracker::cancel`].
    pub async fn cancel(&self) -> Result<CancelOutcome, LifecycleError> {
        let outcome = self.feed.tracker.cancel(&self.feed.order_id).await?;
        if let Ok(Some(tracked)) = self.feed.tracker.cached(&self.feed.order_id).await {
            self.feed.tx.send_modify(|view| view.apply(tracked));
        }
        Ok(outcome)
    }
}

// ============================================================================
// Service
// ============================================================================

/// Order monitor service.
pub struct OrderMonitor<L, S>
where
    L: OrderLifecyclePort + 'static,
    S: OrderCache + 'static,
{
    config: OrderMonitorConfig,
    tracker: OrderLifecycleTracker<L, S>,
    shutdown: CancellationToken,
    active_loops: Arc<AtomicUsize>,
}

impl<L, S> OrderMonitor<L, S>
where
    L: OrderLifecyclePort + 'static,
    S: OrderCache + 'static,
{
    /// Create a new order monitor.
    ///
    /// Every loop it starts also stops when `shutdown` is cancelled.
    #[must_use]
    pub fn new(
        config: OrderMonitorConfig,
        tracker: OrderLifecycleTracker<L, S>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            tracker,
            shutdown,
            active_loops: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The tracker behind every view.
    pub const fn tracker(&self) -> &OrderLifecycleTracker<L, S> {
        &self.tracker
    }

    /// Number of polling loops currently running.
    #[must_use]
    pub fn active_loops(&self) -> usize {
        self.active_loops.load(Ordering::SeqCst)
    }

    /// Cancel an order from any view.
    ///
    /// # Errors
    ///
    /// See [`OrderLifecycleTracker::cancel`].
    pub async fn cancel(&self, order_id: &OrderId) -> Result<CancelOutcome, LifecycleError> {
        self.tracker.cancel(order_id).await
    }

    /// Start polling an account's order list.
    pub fn watch_account(&self, account_id: AccountId, window: OrderWindow) -> AccountWatch<L, S> {
        let (tx, rx) = watch::channel(AccountView::empty(account_id.clone(), window));
        let feed = Arc::new(AccountFeed {
            tracker: self.tracker.clone(),
            account_id,
            window,
            tx,
        });
        let token = self.shutdown.child_token();
        let interval = Duration::from_millis(self.config.list_interval_ms);

        let loop_feed = Arc::clone(&feed);
        let loop_token = token.clone();
        let active = Arc::clone(&self.active_loops);
        active.fetch_add(1, Ordering::SeqCst);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!(account_id = %loop_feed.account_id, "Order list polling started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = loop_feed.poll().await {
                            tracing::warn!(
                                account_id = %loop_feed.account_id,
                                error = %e,
                                "Order list poll failed"
                            );
                        }
                    }
                    () = loop_token.cancelled() => {
                        tracing::debug!(
                            account_id = %loop_feed.account_id,
                            "Order list polling stopped"
                        );
                        break;
                    }
                }
            }
            active.fetch_sub(1, Ordering::SeqCst);
        });

        AccountWatch {
            feed,
            rx,
            _guard: token.drop_guard(),
        }
    }

    /// Start polling a single order.
    pub fn watch_order(&self, order_id: OrderId) -> OrderWatch<L, S> {
        let (tx, rx) = watch::channel(OrderView::empty(order_id.clone()));
        let feed = Arc::new(OrderFeed {
            tracker: self.tracker.clone(),
            order_id,
            tx,
        });
        let token = self.shutdown.child_token();
        let interval = Duration::from_millis(self.config.focus_interval_ms);

        let loop_feed = Arc::clone(&feed);
        let loop_token = token.clone();
        let active = Arc::clone(&self.active_loops);
        active.fetch_add(1, Ordering::SeqCst);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!(order_id = %loop_feed.order_id, "Order status polling started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match loop_feed.poll().await {
                            Ok(view) if view.is_settled() => {
                                tracing::debug!(
                                    order_id = %loop_feed.order_id,
                                    "Order is terminal, status polling stopped"
                                );
                                break;
                            }
                            Ok(_) => {}
                            Err(LifecycleError::NotFound { .. }) => {
                                tracing::warn!(
                                    order_id = %loop_feed.order_id,
                                    "Order not found, status polling stopped"
                                );
                                break;
                            }
                            Err(e) => {
                                tracing::warn!(
                                    order_id = %loop_feed.order_id,
                                    error = %e,
                                    "Order status poll failed"
                                );
                            }
                        }
                    }
                    () = loop_token.cancelled() => {
                        tracing::debug!(
                            order_id = %loop_feed.order_id,
                            "Order status polling stopped"
                        );
                        break;
                    }
                }
            }
            active.fetch_sub(1, Ordering::SeqCst);
        });

        OrderWatch {
            feed,
            rx,
            _guard: token.drop_guard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::application::ports::{GatewayError, MockOrderLifecyclePort};
    use crate::domain::order_execution::{
        OrderSide, OrderStatus, OrderType, PlacedOrder, PlacedOrderParams,
    };
    use crate::domain::shared::{Quantity, Symbol};
    use crate::infrastructure::persistence::InMemoryOrderCache;

    fn snapshot(status: OrderStatus, updated_secs: i64) -> PlacedOrder {
        let placed = Timestamp::parse("2026-03-02T15:00:00Z").unwrap();
        PlacedOrder::from_snapshot(PlacedOrderParams {
            order_id: OrderId::new("o1"),
            account_id: AccountId::new("acct-1"),
            symbol: Symbol::new("MSFT"),
            side: OrderSide::Buy,
            order_type: OrderType::Limit,
            quantity: Quantity::from_i64(5),
            filled_quantity: Quantity::ZERO,
            limit_price: Some(dec!(400)),
            stop_price: None,
            status,
            avg_fill_price: None,
            placed_at: placed,
            last_updated_at: placed.plus_seconds(updated_secs),
        })
    }

    fn tracked(status: OrderStatus, revision_bumps: u64) -> TrackedOrder {
        let mut order = snapshot(OrderStatus::Submitted, 0);
        let path = [OrderStatus::Open, OrderStatus::PartiallyFilled, OrderStatus::Filled];
        for (i, next) in path.iter().take(usize::try_from(revision_bumps).unwrap()).enumerate() {
            let secs = i64::try_from(i).unwrap() + 1;
            order.merge(&snapshot(*next, secs)).unwrap();
        }
        assert_eq!(order.status(), status);
        TrackedOrder::fresh(order, Timestamp::now())
    }

    fn monitor(
        mock: MockOrderLifecyclePort,
    ) -> OrderMonitor<MockOrderLifecyclePort, InMemoryOrderCache> {
        let tracker = OrderLifecycleTracker::new(
            Arc::new(mock),
            Arc::new(InMemoryOrderCache::new()),
            90,
        );
        OrderMonitor::new(OrderMonitorConfig::default(), tracker, CancellationToken::new())
    }

    #[test]
    fn order_view_ignores_older_revision() {
        let mut view = OrderView::empty(OrderId::new("o1"));
        view.apply(tracked(OrderStatus::PartiallyFilled, 2));
        view.apply(tracked(OrderStatus::Open, 1));

        let shown = view.order.as_ref().unwrap();
        assert_eq!(shown.order.status(), OrderStatus::PartiallyFilled);
        assert_eq!(view.poll_seq, 2);
    }

    #[test]
    fn account_view_keeps_newer_orders() {
        let window = OrderWindow::clamped(7, 90);
        let mut view = AccountView::empty(AccountId::new("acct-1"), window);
        let list = |order: TrackedOrder| OrderList {
            account_id: AccountId::new("acct-1"),
            window,
            orders: vec![order],
            stale: false,
            last_error: None,
        };

        view.apply(list(tracked(OrderStatus::Filled, 3)));
        view.apply(list(tracked(OrderStatus::Open, 1)));

        assert_eq!(view.orders[0].order.status(), OrderStatus::Filled);
    }

    #[test]
    fn failure_marks_view_stale_but_keeps_orders() {
        let mut view = OrderView::empty(OrderId::new("o1"));
        view.apply(tracked(OrderStatus::Open, 1));
        view.apply_failure(&LifecycleError::Unavailable {
            message: "timeout".to_string(),
        });

        let shown = view.order.as_ref().unwrap();
        assert!(shown.stale);
        assert_eq!(shown.order.status(), OrderStatus::Open);
        assert!(!view.is_settled());
    }

    #[tokio::test(start_paused = true)]
    async fn focused_polling_stops_at_terminal_status() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut mock = MockOrderLifecyclePort::new();
        let counter = Arc::clone(&calls);
        mock.expect_get_order().returning(move |_| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let secs = i64::try_from(n).unwrap() + 1;
            if n < 2 {
                Ok(snapshot(OrderStatus::Open, secs))
            } else {
                Ok(snapshot(OrderStatus::Filled, secs))
            }
        });
        let monitor = monitor(mock);

        let watch = monitor.watch_order(OrderId::new("o1"));
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(watch.view().is_settled());
        assert_eq!(monitor.active_loops(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_stops_list_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut mock = MockOrderLifecyclePort::new();
        let counter = Arc::clone(&calls);
        mock.expect_list_orders().returning(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        });
        let monitor = monitor(mock);

        let watch = monitor.watch_account(AccountId::new("acct-1"), OrderWindow::clamped(7, 90));
        tokio::time::sleep(Duration::from_secs(65)).await;
        let before = calls.load(Ordering::SeqCst);
        assert_eq!(before, 3);
        assert_eq!(monitor.active_loops(), 1);

        drop(watch);
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(calls.load(Ordering::SeqCst), before);
        assert_eq!(monitor.active_loops(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_poll_keeps_last_known_status() {
        let mut mock = MockOrderLifecyclePort::new();
        let mut first = true;
        mock.expect_get_order().returning(move |_| {
            if std::mem::take(&mut first) {
                Ok(snapshot(OrderStatus::Open, 1))
            } else {
                Err(GatewayError::Timeout)
            }
        });
        let monitor = monitor(mock);

        let watch = monitor.watch_order(OrderId::new("o1"));
        tokio::time::sleep(Duration::from_secs(4)).await;

        let view = watch.view();
        let shown = view.order.unwrap();
        assert!(shown.stale);
        assert_eq!(shown.order.status(), OrderStatus::Open);
        assert!(view.last_error.is_some());
    }
}
