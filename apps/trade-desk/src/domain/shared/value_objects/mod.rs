//! Shared Value Objects
//!
//! Immutable types shared by the trade workflow and the order tracker.
//! Value objects are compared by value, not identity.

mod identifiers;
mod money;
mod quantity;
mod symbol;
mod timestamp;

pub use identifiers::{AccountId, OrderId, PreviewId, ViewId, WorkflowId};
pub use money::{Currency, Money};
pub use quantity::Quantity;
pub use symbol::Symbol;
pub use timestamp::Timestamp;
