//! Workflow Registry Service
//!
//! Open trade workflows, one per trading surface instance, each with the
//! quote poll for the symbol on its form. Closing a workflow stops its
//! quote polling; a commit already in flight still completes and its
//! order is still tracked. Workflows nobody reads or subscribes to are
//! closed by the idle sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::idle_sweep::{LastSeen, spawn_idle_sweep};
use super::quote_poller::{QuotePoller, QuoteView, QuoteWatch};
use crate::application::dto::WorkflowSnapshot;
use crate::application::ports::Brokerage;
use crate::application::use_cases::TradeWorkflowController;
use crate::domain::order_execution::{ImpactQuote, OrderCache, OrderDraft, PlacedOrder};
use crate::domain::shared::{PreviewId, Symbol, WorkflowId};
use crate::domain::trade_workflow::{TradeSurface, WorkflowError};
use crate::observability::{record_idle_close, update_open_workflows};

/// One open workflow.
pub struct WorkflowSession<B, S>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    controller: TradeWorkflowController<B, B, S>,
    quotes: Arc<QuotePoller<B>>,
    quote_watch: Mutex<Option<QuoteWatch>>,
    last_seen: LastSeen,
}

impl<B, S> WorkflowSession<B, S>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    /// The workflow controller.
    pub const fn controller(&self) -> &TradeWorkflowController<B, B, S> {
        &self.controller
    }

    /// Quote panel for the symbol on the form, if it is a valid symbol.
    pub fn quote(&self) -> Option<QuoteView> {
        self.quote_watch.lock().as_ref().map(QuoteWatch::view)
    }

    /// Replace the form contents.
    ///
    /// # Errors
    ///
    /// See [`TradeWorkflowController::edit`].
    pub fn edit(&self, draft: OrderDraft) -> Result<WorkflowSnapshot, WorkflowError> {
        let symbol = draft.symbol.clone();
        let snapshot = self.controller.edit(draft)?;
        self.follow(&symbol);
        Ok(snapshot)
    }

    /// Replace the form contents and request a preview.
    ///
    /// # Errors
    ///
    /// See [`TradeWorkflowController::request_preview`].
    pub async fn request_preview(&self, draft: OrderDraft) -> Result<ImpactQuote, WorkflowError> {
        self.follow(&draft.symbol);
        self.controller.request_preview(draft).await
    }

    /// Commit the previewed order.
    ///
    /// # Errors
    ///
    /// See [`TradeWorkflowController::confirm`].
    pub async fn confirm(&self, preview_id: &PreviewId) -> Result<PlacedOrder, WorkflowError> {
        self.controller.confirm(preview_id).await
    }

    /// Start a new trade; the quote panel keeps its symbol.
    pub fn reset(&self) -> WorkflowSnapshot {
        self.controller.reset()
    }

    /// True if nothing has read the workflow for `timeout` and no
    /// surface is subscribed to its snapshots.
    fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        self.last_seen.idle_for(now) >= timeout && self.controller.subscriber_count() == 0
    }

    /// Poll quotes for `raw_symbol`, replacing the current poll if the
    /// symbol changed. Invalid symbols stop polling.
    fn follow(&self, raw_symbol: &str) {
        let mut current = self.quote_watch.lock();
        match Symbol::parse(raw_symbol) {
            Ok(symbol) => {
                if current.as_ref().is_some_and(|w| w.symbol() == symbol) {
                    return;
                }
                *current = Some(self.quotes.watch(symbol));
            }
            Err(_) => *current = None,
        }
    }
}

/// Registry of open workflows.
pub struct WorkflowRegistry<B, S>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    brokerage: Arc<B>,
    orders: Arc<S>,
    quotes: Arc<QuotePoller<B>>,
    preview_ttl_secs: u64,
    sessions: RwLock<HashMap<WorkflowId, Arc<WorkflowSession<B, S>>>>,
}

impl<B, S> WorkflowRegistry<B, S>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    /// Create an empty registry.
    pub fn new(
        brokerage: Arc<B>,
        orders: Arc<S>,
        quotes: Arc<QuotePoller<B>>,
        preview_ttl_secs: u64,
    ) -> Self {
        Self {
            brokerage,
            orders,
            quotes,
            preview_ttl_secs,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a workflow for a surface, starting in `Form` with `draft`.
    pub fn open(&self, surface: TradeSurface, draft: OrderDraft) -> Arc<WorkflowSession<B, S>> {
        let id = WorkflowId::generate();
        let symbol = draft.symbol.clone();
        let session = Arc::new(WorkflowSession {
            controller: TradeWorkflowController::new(
                id.clone(),
                surface,
                draft,
                self.preview_ttl_secs,
                Arc::clone(&self.brokerage),
                Arc::clone(&self.brokerage),
                Arc::clone(&self.orders),
            ),
            quotes: Arc::clone(&self.quotes),
            quote_watch: Mutex::new(None),
            last_seen: LastSeen::now(),
        });
        session.follow(&symbol);

        let open = {
            let mut sessions = self.sessions.write();
            sessions.insert(id.clone(), Arc::clone(&session));
            sessions.len()
        };
        update_open_workflows(open);
        tracing::info!(workflow_id = %id, surface = %surface, "Workflow opened");
        session
    }

    /// Find an open workflow and mark it used.
    pub fn get(&self, id: &WorkflowId) -> Option<Arc<WorkflowSession<B, S>>> {
        let session = self.sessions.read().get(id).cloned()?;
        session.last_seen.touch();
        Some(session)
    }

    /// Close a workflow. Returns false if it was not open.
    pub fn close(&self, id: &WorkflowId) -> bool {
        self.remove(id, "closed")
    }

    /// Close every workflow idle for at least `timeout`.
    ///
    /// Returns the number closed.
    pub fn sweep_idle(&self, timeout: Duration) -> usize {
        let now = Instant::now();
        let idle: Vec<WorkflowId> = self
            .sessions
            .read()
            .iter()
            .filter(|(_, session)| session.is_idle(now, timeout))
            .map(|(id, _)| id.clone())
            .collect();
        let mut closed = 0;
        for id in idle {
            if self.remove(&id, "idle") {
                record_idle_close("workflow");
                closed += 1;
            }
        }
        closed
    }

    /// Sweep idle workflows periodically until `shutdown` is cancelled.
    pub fn spawn_idle_sweep(
        self: &Arc<Self>,
        timeout: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let registry = Arc::downgrade(self);
        spawn_idle_sweep("workflow", timeout, shutdown, move || {
            registry.upgrade().map(|registry| registry.sweep_idle(timeout))
        })
    }

    fn remove(&self, id: &WorkflowId, reason: &'static str) -> bool {
        let (removed, open) = {
            let mut sessions = self.sessions.write();
            let removed = sessions.remove(id);
            (removed, sessions.len())
        };
        let Some(session) = removed else {
            return false;
        };
        session.quote_watch.lock().take();
        update_open_workflows(open);
        tracing::info!(
            workflow_id = %id,
            state = %session.controller.snapshot().state,
            reason,
            "Workflow closed"
        );
        true
    }

    /// Number of open workflows.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns true if no workflow is open.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::domain::order_execution::OrderSide;
    use crate::domain::trade_workflow::WorkflowState;
    use crate::infrastructure::paper::{PaperBrokerage, PaperConfig};
    use crate::infrastructure::persistence::InMemoryOrderCache;

    fn registry() -> WorkflowRegistry<PaperBrokerage, InMemoryOrderCache> {
        let brokerage = Arc::new(PaperBrokerage::new(PaperConfig::default()));
        let quotes = Arc::new(QuotePoller::new(
            Arc::clone(&brokerage),
            5_000,
            CancellationToken::new(),
        ));
        WorkflowRegistry::new(brokerage, Arc::new(InMemoryOrderCache::new()), quotes, 60)
    }

    #[tokio::test]
    async fn open_get_close() {
        let registry = registry();
        let session = registry.open(TradeSurface::QuickTrade, OrderDraft::blank_for("acct-1"));
        let id = session.controller().id();

        assert_eq!(registry.len(), 1);
        assert!(registry.get(&id).is_some());
        assert!(session.quote().is_none());

        assert!(registry.close(&id));
        assert!(!registry.close(&id));
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_workflow_is_swept() {
        let registry = Arc::new(registry());
        let stale = registry.open(TradeSurface::QuickTrade, OrderDraft::blank_for("acct-1"));
        let active = registry.open(TradeSurface::TradeTicket, OrderDraft::blank_for("acct-1"));
        let stale_id = stale.controller().id();
        let active_id = active.controller().id();
        drop((stale, active));

        let shutdown = CancellationToken::new();
        let sweep = registry.spawn_idle_sweep(Duration::from_secs(60), shutdown.clone());

        for _ in 0..4 {
            tokio::time::sleep(Duration::from_secs(20)).await;
            assert!(registry.get(&active_id).is_some());
        }

        assert!(registry.get(&stale_id).is_none());
        assert_eq!(registry.len(), 1);

        shutdown.cancel();
        sweep.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn subscribed_workflow_is_not_idle() {
        let registry = registry();
        let session = registry.open(TradeSurface::TradeTicket, OrderDraft::blank_for("acct-1"));
        let updates = session.controller().subscribe();

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(registry.sweep_idle(Duration::from_secs(60)), 0);

        drop(updates);
        assert_eq!(registry.sweep_idle(Duration::from_secs(60)), 1);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn editing_symbol_follows_quotes() {
        let registry = registry();
        let session = registry.open(TradeSurface::TradeTicket, OrderDraft::blank_for("acct-1"));

        let snapshot = session
            .edit(OrderDraft::market("acct-1", "aapl", OrderSide::Buy, dec!(1)))
            .unwrap();
        assert_eq!(snapshot.state, WorkflowState::Form);
        assert_eq!(session.quote().unwrap().symbol, Symbol::new("AAPL"));

        session
            .edit(OrderDraft::market("acct-1", "", OrderSide::Buy, dec!(1)))
            .unwrap();
        assert!(session.quote().is_none());
    }
}
