//! Trade Workflow Controller Use Case
//!
//! Drives one trade from form input to at most one placed order per
//! preview handle, on behalf of whichever trading surface opened it.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::application::dto::WorkflowSnapshot;
use crate::application::ports::{GatewayError, ImpactCalculatorPort, OrderCommitterPort};
use crate::domain::order_execution::{ImpactQuote, OrderCache, OrderDraft, PlacedOrder};
use crate::domain::shared::{PreviewId, Timestamp, WorkflowId};
use crate::domain::trade_workflow::{
    Resolution, TradeSurface, TradeWorkflow, WorkflowError, WorkflowState,
};
use crate::observability::{record_commit, record_preview};

/// Use case driving a single trade workflow.
///
/// The workflow itself sits behind a mutex that is never held across a
/// network call: each operation takes a ticket under the lock, releases
/// it, awaits the port, then reports back under the lock.
pub struct TradeWorkflowController<I, C, S>
where
    I: ImpactCalculatorPort,
    C: OrderCommitterPort,
    S: OrderCache,
{
    surface: TradeSurface,
    workflow: Mutex<TradeWorkflow>,
    snapshots: watch::Sender<WorkflowSnapshot>,
    impact: Arc<I>,
    committer: Arc<C>,
    orders: Arc<S>,
}

impl<I, C, S> TradeWorkflowController<I, C, S>
where
    I: ImpactCalculatorPort,
    C: OrderCommitterPort,
    S: OrderCache,
{
    /// Create a controller in `Form` with the given draft.
    pub fn new(
        id: WorkflowId,
        surface: TradeSurface,
        draft: OrderDraft,
        preview_ttl_secs: u64,
        impact: Arc<I>,
        committer: Arc<C>,
        orders: Arc<S>,
    ) -> Self {
        let workflow = TradeWorkflow::new(id, draft, preview_ttl_secs);
        let (snapshots, _) =
            watch::channel(WorkflowSnapshot::capture(&workflow, surface, Timestamp::now()));
        Self {
            surface,
            workflow: Mutex::new(workflow),
            snapshots,
            impact,
            committer,
            orders,
        }
    }

    /// Workflow ID.
    pub fn id(&self) -> WorkflowId {
        self.workflow.lock().id().clone()
    }

    /// Surface that owns this workflow.
    pub const fn surface(&self) -> TradeSurface {
        self.surface
    }

    /// Current snapshot, re-evaluated now (a quote may have expired).
    pub fn snapshot(&self) -> WorkflowSnapshot {
        let workflow = self.workflow.lock();
        WorkflowSnapshot::capture(&workflow, self.surface, Timestamp::now())
    }

    /// Receive a snapshot after every transition.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowSnapshot> {
        self.snapshots.subscribe()
    }

    /// Number of live snapshot subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.snapshots.receiver_count()
    }

    /// Replace the form contents.
    ///
    /// # Errors
    ///
    /// `Busy` while confirming, `RunComplete` after success.
    pub fn edit(&self, draft: OrderDraft) -> Result<WorkflowSnapshot, WorkflowError> {
        let mut workflow = self.workflow.lock();
        let outcome = workflow.edit(draft)?;
        tracing::debug!(
            workflow_id = %workflow.id(),
            surface = %self.surface,
            ?outcome,
            "Order form edited"
        );
        Ok(self.publish(&workflow))
    }

    /// Replace the form contents and request an impact quote for them.
    ///
    /// # Errors
    ///
    /// `Validation` without any network call if the draft is invalid;
    /// `PreviewUnavailable` if the calculator cannot be reached;
    /// `StalePreview` if the workflow was edited or reset while waiting.
    pub async fn request_preview(&self, draft: OrderDraft) -> Result<ImpactQuote, WorkflowError> {
        self.edit(draft)?;
        self.refresh_preview().await
    }

    /// Request an impact quote for the current form contents.
    ///
    /// # Errors
    ///
    /// Same as [`Self::request_preview`].
    pub async fn refresh_preview(&self) -> Result<ImpactQuote, WorkflowError> {
        let ticket = {
            let mut workflow = self.workflow.lock();
            let ticket = workflow.begin_preview();
            self.publish(&workflow);
            ticket
        };
        let ticket = match ticket {
            Ok(ticket) => ticket,
            Err(err) => {
                if err.is_validation() {
                    record_preview(self.surface.as_str(), "invalid");
                    tracing::info!(
                        surface = %self.surface,
                        error = %err,
                        "Order form rejected locally"
                    );
                }
                return Err(err);
            }
        };

        tracing::info!(
            surface = %self.surface,
            run = ticket.run,
            symbol = %ticket.intent.symbol(),
            side = %ticket.intent.side(),
            order = %ticket.intent.kind(),
            quantity = %ticket.intent.quantity(),
            "Requesting order impact"
        );

        let result = self.impact.compute_impact(&ticket.intent).await;

        let mut workflow = self.workflow.lock();
        match result {
            Ok(quote) => {
                let resolution = workflow.complete_preview(ticket.run, quote.clone());
                self.publish(&workflow);
                if resolution == Resolution::Superseded {
                    tracing::debug!(
                        workflow_id = %workflow.id(),
                        preview_id = %quote.preview_id(),
                        "Impact quote arrived after the form changed, discarded"
                    );
                    return Err(WorkflowError::StalePreview {
                        preview_id: quote.preview_id().clone(),
                    });
                }

                let outcome = if quote.is_accepted() { "accepted" } else { "rejected" };
                record_preview(self.surface.as_str(), outcome);
                tracing::info!(
                    workflow_id = %workflow.id(),
                    preview_id = %quote.preview_id(),
                    accepted = quote.is_accepted(),
                    reason = quote.rejection_reason().unwrap_or_default(),
                    total = %quote.estimate().total,
                    "Impact quote received"
                );
                Ok(quote)
            }
            Err(err) => {
                let error = WorkflowError::PreviewUnavailable {
                    message: err.to_string(),
                };
                let resolution = workflow.fail_preview(ticket.run, error.clone());
                self.publish(&workflow);
                if resolution == Resolution::Applied {
                    record_preview(self.surface.as_str(), "unavailable");
                }
                tracing::warn!(workflow_id = %workflow.id(), error = %err, "Impact request failed");
                Err(error)
            }
        }
    }

    /// Commit the previewed order.
    ///
    /// The preview handle is consumed before the commit is sent, so a
    /// second call with the same handle (a double tap, a concurrent
    /// request) is refused without reaching the network. A commit that
    /// fails in transport is never retried.
    ///
    /// # Errors
    ///
    /// `PreviewConsumed`, `StalePreview`, `PreviewRejected`,
    /// `PreviewExpired` or `Busy` without a network call;
    /// `CommitRejected` if the brokerage refused the order;
    /// `CommitUnconfirmed` if the outcome is unknown.
    pub async fn confirm(&self, preview_id: &PreviewId) -> Result<PlacedOrder, WorkflowError> {
        let ticket = {
            let mut workflow = self.workflow.lock();
            let ticket = workflow.begin_confirm(preview_id, Timestamp::now());
            self.publish(&workflow);
            ticket
        }?;

        tracing::info!(
            surface = %self.surface,
            preview_id = %ticket.preview_id,
            run = ticket.run,
            "Committing order"
        );

        let result = self.committer.commit(&ticket.preview_id).await;

        match result {
            Ok(order) => {
                self.track(&order).await;
                let mut workflow = self.workflow.lock();
                let resolution = workflow.complete_commit(ticket.run, order.clone());
                self.publish(&workflow);
                if resolution == Resolution::Superseded {
                    record_commit(self.surface.as_str(), "abandoned");
                    tracing::warn!(
                        workflow_id = %workflow.id(),
                        preview_id = %ticket.preview_id,
                        order_id = %order.order_id(),
                        "Order placed after the workflow was reset; tracking it without showing it"
                    );
                } else {
                    record_commit(self.surface.as_str(), "placed");
                    tracing::info!(
                        workflow_id = %workflow.id(),
                        preview_id = %ticket.preview_id,
                        order_id = %order.order_id(),
                        status = %order.status(),
                        "Order placed"
                    );
                }
                Ok(order)
            }
            Err(err) => {
                let (error, outcome) = match err {
                    GatewayError::Rejected { reason } => {
                        (WorkflowError::CommitRejected { reason }, "rejected")
                    }
                    other => (
                        WorkflowError::CommitUnconfirmed {
                            preview_id: ticket.preview_id.clone(),
                            detail: other.to_string(),
                        },
                        "unconfirmed",
                    ),
                };
                let mut workflow = self.workflow.lock();
                let resolution = workflow.fail_commit(ticket.run, error.clone());
                self.publish(&workflow);
                record_commit(self.surface.as_str(), outcome);
                tracing::warn!(
                    workflow_id = %workflow.id(),
                    preview_id = %ticket.preview_id,
                    abandoned = resolution == Resolution::Superseded,
                    error = %error,
                    "Commit failed"
                );
                Err(error)
            }
        }
    }

    /// Return to `Form` with a blank draft. Always allowed.
    ///
    /// Resetting while a commit is in flight does not cancel it; if the
    /// order is placed it is still tracked.
    pub fn reset(&self) -> WorkflowSnapshot {
        let mut workflow = self.workflow.lock();
        let previous = workflow.reset();
        if previous == WorkflowState::Confirming {
            tracing::info!(
                workflow_id = %workflow.id(),
                surface = %self.surface,
                "Workflow reset while a commit is in flight"
            );
        }
        self.publish(&workflow)
    }

    async fn track(&self, order: &PlacedOrder) {
        if let Err(e) = self.orders.merge(order.clone(), Timestamp::now()).await {
            tracing::error!(
                order_id = %order.order_id(),
                error = %e,
                "Failed to cache placed order"
            );
        }
    }

    fn publish(&self, workflow: &TradeWorkflow) -> WorkflowSnapshot {
        let snapshot = WorkflowSnapshot::capture(workflow, self.surface, Timestamp::now());
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }
}
