//! Order Execution Aggregates
//!
//! `ImpactQuote` lives for one workflow run; `PlacedOrder` outlives it
//! and is owned by the lifecycle tracker.

mod impact_quote;
mod placed_order;
mod tracked_order;

pub use impact_quote::{ImpactEstimate, ImpactQuote, ImpactVerdict};
pub use placed_order::{MergeOutcome, PlacedOrder, PlacedOrderParams};
pub use tracked_order::TrackedOrder;
