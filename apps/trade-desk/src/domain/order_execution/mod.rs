//! Order Execution Bounded Context
//!
//! Order entry (draft, validation, intent), impact quotes, and the
//! lifecycle of placed orders.
//!
//! # Key Concepts
//!
//! - **OrderDraft / OrderIntent**: raw form state and the validated,
//!   immutable request built from it
//! - **ImpactQuote**: non-binding estimate plus single-use preview handle
//! - **PlacedOrder**: committed order, updated only from polled snapshots

pub mod aggregate;
pub mod errors;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use aggregate::{
    ImpactEstimate, ImpactQuote, ImpactVerdict, MergeOutcome, PlacedOrder, PlacedOrderParams,
    TrackedOrder,
};
pub use errors::OrderError;
pub use repository::OrderCache;
pub use services::OrderStateMachine;
pub use value_objects::{
    OrderDraft, OrderIntent, OrderKind, OrderSide, OrderStatus, OrderType, TimeInForce,
    ValidationError,
};
