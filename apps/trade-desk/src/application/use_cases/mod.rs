//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod track_orders;
mod trade_workflow;

pub use crate::domain::trade_workflow::WorkflowError;
pub use track_orders::{
    CancelOutcome, LifecycleError, OrderLifecycleTracker, OrderList, OrderWindow,
};
pub use trade_workflow::TradeWorkflowController;
