//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Aggregates**: Consistency boundaries with invariants
//! - **Value Objects**: Immutable domain types with equality by value
//! - **Domain Services**: Stateless business logic
//! - **Repository Traits**: Persistence abstractions (implemented in adapters)
//!
//! # Bounded Contexts
//!
//! - [`order_execution`]: Order entry, impact quotes, placed-order lifecycle
//! - [`trade_workflow`]: Form -> Preview -> Confirm state machine

pub mod order_execution;
pub mod shared;
pub mod trade_workflow;
