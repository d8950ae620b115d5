//! Everything a trade workflow can report to a trading surface.

use thiserror::Error;

use super::WorkflowState;
use crate::domain::order_execution::ValidationError;
use crate::domain::shared::PreviewId;

/// Trade workflow errors.
///
/// Validation and business rejections are resolved inside the workflow.
/// `CommitUnconfirmed` is the only outcome where the brokerage may or
/// may not hold an order; it is never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// The form failed local validation; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The impact calculator could not be reached.
    #[error("could not get a preview ({message}); try again")]
    PreviewUnavailable {
        /// Transport failure description.
        message: String,
    },

    /// Confirm attempted on a quote the brokerage would refuse.
    #[error("order cannot be placed: {reason}")]
    PreviewRejected {
        /// Rejection reason from the quote.
        reason: String,
    },

    /// The preview handle has already been used for a commit.
    #[error("preview {preview_id} was already used; request a new preview")]
    PreviewConsumed {
        /// The consumed handle.
        preview_id: PreviewId,
    },

    /// The preview handle is not the one currently shown.
    #[error("preview {preview_id} no longer matches the order; request a new preview")]
    StalePreview {
        /// The stale handle.
        preview_id: PreviewId,
    },

    /// The preview handle has expired.
    #[error("preview {preview_id} has expired; request a new preview")]
    PreviewExpired {
        /// The expired handle.
        preview_id: PreviewId,
    },

    /// The brokerage refused the commit; no order was placed.
    #[error("order was rejected: {reason}")]
    CommitRejected {
        /// Rejection reason from the brokerage.
        reason: String,
    },

    /// The commit outcome is unknown.
    #[error("could not confirm placement, check order history before trying again ({detail})")]
    CommitUnconfirmed {
        /// Handle that was sent.
        preview_id: PreviewId,
        /// Transport failure description.
        detail: String,
    },

    /// A preview or commit of this run is still outstanding.
    #[error("a request is already in progress ({state})")]
    Busy {
        /// State the workflow is in.
        state: WorkflowState,
    },

    /// The run already placed its order.
    #[error("order already placed; reset to start a new trade")]
    RunComplete,
}

impl WorkflowError {
    /// Returns true if the error came from local validation.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
