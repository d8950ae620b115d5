//! Trade Workflow Bounded Context
//!
//! The single state machine every trading surface (quick trade widget,
//! ticket, preview dialog) runs to turn a form into at most one placed
//! order per preview handle.

pub mod errors;
mod ledger;
mod state;
mod workflow;

pub use errors::WorkflowError;
pub use ledger::PreviewLedger;
pub use state::{TradeSurface, WorkflowState};
pub use workflow::{CommitTicket, EditOutcome, PreviewTicket, Resolution, TradeWorkflow};
