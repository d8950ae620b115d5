//! Order Execution Value Objects
//!
//! Immutable types for order entry and order tracking.

mod order_intent;
mod order_side;
mod order_status;
mod order_type;
mod time_in_force;
mod validation;

pub use order_intent::{OrderDraft, OrderIntent};
pub use order_side::OrderSide;
pub use order_status::OrderStatus;
pub use order_type::{OrderKind, OrderType};
pub use time_in_force::TimeInForce;
pub use validation::ValidationError;
