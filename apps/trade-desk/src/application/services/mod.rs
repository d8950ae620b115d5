//! Application Services
//!
//! Application services coordinate domain logic and infrastructure adapters.
//! They differ from use cases in that they run background polling loops
//! or hold long-lived state across requests.

mod idle_sweep;
mod order_monitor;
mod quote_poller;
mod view_registry;
mod workflow_registry;

pub use order_monitor::{
    AccountView, AccountWatch, OrderMonitor, OrderMonitorConfig, OrderView, OrderWatch,
};
pub use idle_sweep::{LastSeen, spawn_idle_sweep, sweep_period};
pub use quote_poller::{QuotePoller, QuoteView, QuoteWatch};
pub use view_registry::{ViewRegistry, ViewSession, ViewSnapshot, ViewUpdates};
pub use workflow_registry::{WorkflowRegistry, WorkflowSession};
