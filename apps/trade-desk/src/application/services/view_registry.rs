//! View Registry Service
//!
//! Order and account views held open by trading surfaces. Each view owns
//! a polling loop in the order monitor; closing the view, or leaving it
//! idle with no subscriber, drops the handle and stops the loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::idle_sweep::{LastSeen, spawn_idle_sweep};
use super::order_monitor::{AccountView, AccountWatch, OrderMonitor, OrderView, OrderWatch};
use crate::application::ports::OrderLifecyclePort;
use crate::application::use_cases::LifecycleError;
use crate::domain::order_execution::OrderCache;
use crate::domain::shared::{AccountId, OrderId, ViewId};
use crate::observability::{record_idle_close, update_open_views};

/// What a view currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSnapshot {
    /// A single focused order.
    Order(OrderView),
    /// An account's order list.
    Account(AccountView),
}

/// Change notifications for a view.
pub enum ViewUpdates {
    /// A single focused order.
    Order(watch::Receiver<OrderView>),
    /// An account's order list.
    Account(watch::Receiver<AccountView>),
}

enum WatchedView<L: OrderLifecyclePort, S: OrderCache> {
    Order(OrderWatch<L, S>),
    Account(AccountWatch<L, S>),
}

/// One open view.
pub struct ViewSession<L: OrderLifecyclePort, S: OrderCache> {
    id: ViewId,
    watch: WatchedView<L, S>,
    last_seen: LastSeen,
}

impl<L: OrderLifecyclePort, S: OrderCache> ViewSession<L, S> {
    /// View handle.
    pub const fn id(&self) -> &ViewId {
        &self.id
    }

    /// Current contents.
    pub fn snapshot(&self) -> ViewSnapshot {
        match &self.watch {
            WatchedView::Order(watch) => ViewSnapshot::Order(watch.view()),
            WatchedView::Account(watch) => ViewSnapshot::Account(watch.view()),
        }
    }

    /// Receive the contents whenever they change.
    pub fn subscribe(&self) -> ViewUpdates {
        match &self.watch {
            WatchedView::Order(watch) => ViewUpdates::Order(watch.subscribe()),
            WatchedView::Account(watch) => ViewUpdates::Account(watch.subscribe()),
        }
    }

    /// Poll now, alongside the automatic loop.
    ///
    /// # Errors
    ///
    /// Returns error if the read failed and nothing is cached.
    pub async fn refresh(&self) -> Result<ViewSnapshot, LifecycleError> {
        match &self.watch {
            WatchedView::Order(watch) => watch.refresh().await.map(ViewSnapshot::Order),
            WatchedView::Account(watch) => watch.refresh().await.map(ViewSnapshot::Account),
        }
    }

    fn subscriber_count(&self) -> usize {
        match &self.watch {
            WatchedView::Order(watch) => watch.subscriber_count(),
            WatchedView::Account(watch) => watch.subscriber_count(),
        }
    }

    fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        self.last_seen.idle_for(now) >= timeout && self.subscriber_count() == 0
    }
}

/// Registry of open views.
pub struct ViewRegistry<L, S>
where
    L: OrderLifecyclePort + 'static,
    S: OrderCache + 'static,
{
    monitor: Arc<OrderMonitor<L, S>>,
    sessions: RwLock<HashMap<ViewId, Arc<ViewSession<L, S>>>>,
}

impl<L, S> ViewRegistry<L, S>
where
    L: OrderLifecyclePort + 'static,
    S: OrderCache + 'static,
{
    /// Create an empty registry whose views poll through `monitor`.
    pub fn new(monitor: Arc<OrderMonitor<L, S>>) -> Self {
        Self {
            monitor,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start following one order.
    pub fn open_order(&self, order_id: OrderId) -> Arc<ViewSession<L, S>> {
        let watch = self.monitor.watch_order(order_id);
        self.insert(WatchedView::Order(watch))
    }

    /// Start following an account's orders over `lookback_days`,
    /// clamped to the tracker's maximum.
    pub fn open_account(
        &self,
        account_id: AccountId,
        lookback_days: u32,
    ) -> Arc<ViewSession<L, S>> {
        let window = self.monitor.tracker().window(lookback_days);
        let watch = self.monitor.watch_account(account_id, window);
        self.insert(WatchedView::Account(watch))
    }

    /// Find an open view and mark it used.
    pub fn get(&self, id: &ViewId) -> Option<Arc<ViewSession<L, S>>> {
        let session = self.sessions.read().get(id).cloned()?;
        session.last_seen.touch();
        Some(session)
    }

    /// Close a view. Returns false if it was not open.
    pub fn close(&self, id: &ViewId) -> bool {
        self.remove(id, "closed")
    }

    /// Close every view idle for at least `timeout`.
    ///
    /// Returns the number closed.
    pub fn sweep_idle(&self, timeout: Duration) -> usize {
        let now = Instant::now();
        let idle: Vec<ViewId> = self
            .sessions
            .read()
            .iter()
            .filter(|(_, session)| session.is_idle(now, timeout))
            .map(|(id, _)| id.clone())
            .collect();
        let mut closed = 0;
        for id in idle {
            if self.remove(&id, "idle") {
                record_idle_close("view");
                closed += 1;
            }
        }
        closed
    }

    /// Sweep idle views periodically until `shutdown` is cancelled.
    pub fn spawn_idle_sweep(
        self: &Arc<Self>,
        timeout: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let registry = Arc::downgrade(self);
        spawn_idle_sweep("view", timeout, shutdown, move || {
            registry.upgrade().map(|registry| registry.sweep_idle(timeout))
        })
    }

    /// Number of open views.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns true if no view is open.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn insert(&self, watch: WatchedView<L, S>) -> Arc<ViewSession<L, S>> {
        let id = ViewId::generate();
        let session = Arc::new(ViewSession {
            id: id.clone(),
            watch,
            last_seen: LastSeen::now(),
        });
        let open = {
            let mut sessions = self.sessions.write();
            sessions.insert(id.clone(), Arc::clone(&session));
            sessions.len()
        };
        update_open_views(open);
        tracing::info!(view_id = %id, "View opened");
        session
    }

    fn remove(&self, id: &ViewId, reason: &'static str) -> bool {
        let (removed, open) = {
            let mut sessions = self.sessions.write();
            let removed = sessions.remove(id);
            (removed, sessions.len())
        };
        if removed.is_none() {
            return false;
        }
        update_open_views(open);
        tracing::info!(view_id = %id, reason, "View closed");
        true
    }
}
