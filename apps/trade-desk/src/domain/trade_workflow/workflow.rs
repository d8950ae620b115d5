//! Trade Workflow Aggregate
//!
//! Synchronous transition rules for one trading surface's workflow.
//! Network calls happen outside; the aggregate hands out tickets when a
//! call may start and is told how each call resolved. A ticket carries
//! the run generation it was issued for, so a response that arrives
//! after an edit or reset is recognised and dropped.

use super::errors::WorkflowError;
use super::ledger::PreviewLedger;
use super::state::WorkflowState;
use crate::domain::order_execution::{ImpactQuote, OrderDraft, OrderIntent, PlacedOrder};
use crate::domain::shared::{PreviewId, Timestamp, WorkflowId};

/// Permission to call the impact calculator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTicket {
    /// Run generation the request belongs to.
    pub run: u64,
    /// Validated intent to price.
    pub intent: OrderIntent,
}

/// Permission to call the order committer, exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitTicket {
    /// Run generation the commit belongs to.
    pub run: u64,
    /// Preview handle, already consumed.
    pub preview_id: PreviewId,
}

/// Whether a resolved call still belonged to the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The result was applied.
    Applied,
    /// The run moved on; the result was dropped.
    Superseded,
}

/// Result of an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The draft was identical; nothing changed.
    Unchanged,
    /// The draft changed and any held quote was discarded.
    Edited,
}

/// One trade workflow.
#[derive(Debug, Clone)]
pub struct TradeWorkflow {
    id: WorkflowId,
    state: WorkflowState,
    draft: OrderDraft,
    quote: Option<ImpactQuote>,
    placed_order: Option<PlacedOrder>,
    last_error: Option<WorkflowError>,
    run: u64,
    ledger: PreviewLedger,
    preview_ttl_secs: u64,
}

impl TradeWorkflow {
    /// Start a workflow in `Form` with the given draft.
    #[must_use]
    pub fn new(id: WorkflowId, draft: OrderDraft, preview_ttl_secs: u64) -> Self {
        Self {
            id,
            state: WorkflowState::Form,
            draft,
            quote: None,
            placed_order: None,
            last_error: None,
            run: 0,
            ledger: PreviewLedger::default(),
            preview_ttl_secs,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Workflow identifier.
    #[must_use]
    pub const fn id(&self) -> &WorkflowId {
        &self.id
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> WorkflowState {
        self.state
    }

    /// Current form contents.
    #[must_use]
    pub const fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    /// Held impact quote, in `Preview` (and while `Confirming`).
    #[must_use]
    pub const fn quote(&self) -> Option<&ImpactQuote> {
        self.quote.as_ref()
    }

    /// Placed order, in `Success`.
    #[must_use]
    pub const fn placed_order(&self) -> Option<&PlacedOrder> {
        self.placed_order.as_ref()
    }

    /// Error to show, in `Error` or after a refused request.
    #[must_use]
    pub const fn last_error(&self) -> Option<&WorkflowError> {
        self.last_error.as_ref()
    }

    /// Current run generation.
    #[must_use]
    pub const fn run(&self) -> u64 {
        self.run
    }

    /// Seconds a preview handle stays valid when the quote has no expiry.
    #[must_use]
    pub const fn preview_ttl_secs(&self) -> u64 {
        self.preview_ttl_secs
    }

    /// Returns true if the handle has already been committed.
    #[must_use]
    pub fn is_consumed(&self, preview_id: &PreviewId) -> bool {
        self.ledger.is_consumed(preview_id)
    }

    /// Returns true if `confirm` on the held quote would dispatch a commit.
    #[must_use]
    pub fn can_confirm(&self, now: Timestamp) -> bool {
        self.state == WorkflowState::Preview
            && self.quote.as_ref().is_some_and(|q| {
                q.is_accepted()
                    && !self.ledger.is_consumed(q.preview_id())
                    && !q.is_expired_at(now, self.preview_ttl_secs)
            })
    }

    /// Returns true if a preview may be requested.
    #[must_use]
    pub const fn can_request_preview(&self) -> bool {
        self.state.accepts_preview_request()
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Replace the form contents.
    ///
    /// Any held quote is discarded and a preview still in flight will be
    /// dropped on arrival.
    ///
    /// # Errors
    ///
    /// `Busy` while confirming, `RunComplete` after success.
    pub fn edit(&mut self, draft: OrderDraft) -> Result<EditOutcome, WorkflowError> {
        match self.state {
            WorkflowState::Confirming => {
                return Err(WorkflowError::Busy { state: self.state });
            }
            WorkflowState::Success => return Err(WorkflowError::RunComplete),
            _ => {}
        }

        if draft == self.draft {
            return Ok(EditOutcome::Unchanged);
        }

        self.draft = draft;
        self.last_error = None;
        if self.state != WorkflowState::Form {
            self.state = WorkflowState::Form;
            self.quote = None;
            self.run += 1;
        }
        Ok(EditOutcome::Edited)
    }

    /// Validate the draft and start a preview request.
    ///
    /// # Errors
    ///
    /// `Validation` if the draft is invalid (the workflow returns to
    /// `Form` and no call may be made), `Busy` while a call is in
    /// flight, `RunComplete` after success.
    pub fn begin_preview(&mut self) -> Result<PreviewTicket, WorkflowError> {
        if self.state.is_in_flight() {
            return Err(WorkflowError::Busy { state: self.state });
        }
        if self.state == WorkflowState::Success {
            return Err(WorkflowError::RunComplete);
        }

        self.run += 1;
        self.quote = None;

        match self.draft.validate() {
            Ok(intent) => {
                self.state = WorkflowState::Previewing;
                self.last_error = None;
                Ok(PreviewTicket {
                    run: self.run,
                    intent,
                })
            }
            Err(err) => {
                let err = WorkflowError::from(err);
                self.state = WorkflowState::Form;
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Apply a quote returned by the impact calculator.
    ///
    /// Rejected quotes are shown too; they simply cannot be confirmed.
    pub fn complete_preview(&mut self, run: u64, quote: ImpactQuote) -> Resolution {
        if !self.is_current(run, WorkflowState::Previewing) {
            return Resolution::Superseded;
        }
        self.state = WorkflowState::Preview;
        self.quote = Some(quote);
        Resolution::Applied
    }

    /// Record a failed impact call.
    pub fn fail_preview(&mut self, run: u64, error: WorkflowError) -> Resolution {
        if !self.is_current(run, WorkflowState::Previewing) {
            return Resolution::Superseded;
        }
        self.state = WorkflowState::Error;
        self.last_error = Some(error);
        Resolution::Applied
    }

    /// Check the preview handle and consume it.
    ///
    /// The check and the consumption happen in one step: once this
    /// returns a ticket, no other call can obtain one for the same
    /// handle.
    ///
    /// # Errors
    ///
    /// `PreviewConsumed`, `Busy`, `StalePreview`, `PreviewRejected` or
    /// `PreviewExpired`, checked in that order. Nothing is consumed on
    /// error.
    pub fn begin_confirm(
        &mut self,
        preview_id: &PreviewId,
        now: Timestamp,
    ) -> Result<CommitTicket, WorkflowError> {
        if self.ledger.is_consumed(preview_id) {
            return Err(WorkflowError::PreviewConsumed {
                preview_id: preview_id.clone(),
            });
        }
        if self.state.is_in_flight() {
            return Err(WorkflowError::Busy { state: self.state });
        }

        let quote = match (&self.quote, self.state) {
            (Some(quote), WorkflowState::Preview) if quote.preview_id() == preview_id => quote,
            _ => {
                return Err(WorkflowError::StalePreview {
                    preview_id: preview_id.clone(),
                });
            }
        };

        if let Some(reason) = quote.rejection_reason() {
            return Err(WorkflowError::PreviewRejected {
                reason: reason.to_string(),
            });
        }

        if quote.is_expired_at(now, self.preview_ttl_secs) {
            let err = WorkflowError::PreviewExpired {
                preview_id: preview_id.clone(),
            };
            self.last_error = Some(err.clone());
            return Err(err);
        }

        self.ledger.consume(preview_id.clone());
        self.state = WorkflowState::Confirming;
        self.last_error = None;
        Ok(CommitTicket {
            run: self.run,
            preview_id: preview_id.clone(),
        })
    }

    /// Apply a successful commit.
    pub fn complete_commit(&mut self, run: u64, order: PlacedOrder) -> Resolution {
        if !self.is_current(run, WorkflowState::Confirming) {
            return Resolution::Superseded;
        }
        self.state = WorkflowState::Success;
        self.quote = None;
        self.placed_order = Some(order);
        Resolution::Applied
    }

    /// Record a failed commit. The preview handle stays consumed.
    pub fn fail_commit(&mut self, run: u64, error: WorkflowError) -> Resolution {
        if !self.is_current(run, WorkflowState::Confirming) {
            return Resolution::Superseded;
        }
        self.state = WorkflowState::Error;
        self.quote = None;
        self.last_error = Some(error);
        Resolution::Applied
    }

    /// Return to `Form` with a blank draft for the same account.
    ///
    /// Always allowed. Returns the state the workflow was in, so that
    /// the caller can tell whether a commit was abandoned mid-flight.
    pub fn reset(&mut self) -> WorkflowState {
        let previous = self.state;
        self.state = WorkflowState::Form;
        self.draft = OrderDraft::blank_for(self.draft.account_id.clone());
        self.quote = None;
        self.placed_order = None;
        self.last_error = None;
        self.run += 1;
        previous
    }

    fn is_current(&self, run: u64, expected: WorkflowState) -> bool {
        run == self.run && self.state == expected
    }
}
