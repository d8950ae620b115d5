//! Placed-order errors.

use std::fmt;

use super::value_objects::OrderStatus;

/// Errors raised by the placed-order aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The brokerage reported a status the lifecycle does not allow.
    InvalidStateTransition {
        /// Current order status.
        from: OrderStatus,
        /// Reported status.
        to: OrderStatus,
        /// Reason for failure.
        reason: String,
    },

    /// Cancel attempted on a filled, cancelled or rejected order.
    AlreadyFinalized {
        /// Order ID.
        order_id: String,
        /// Terminal status the order is in.
        status: OrderStatus,
    },

    /// Cancel attempted before the order is working at the venue.
    NotCancellable {
        /// Order ID.
        order_id: String,
        /// Current status.
        status: OrderStatus,
    },

    /// A snapshot for a different order was merged.
    OrderMismatch {
        /// Order being updated.
        expected: String,
        /// Order the snapshot describes.
        actual: String,
    },

    /// The order is not tracked.
    UnknownOrder {
        /// Order ID.
        order_id: String,
    },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStateTransition { from, to, reason } => {
                write!(f, "Invalid order state transition: {from} -> {to}: {reason}")
            }
            Self::AlreadyFinalized { order_id, status } => {
                write!(f, "Order {order_id} is already finalized ({status})")
            }
            Self::NotCancellable { order_id, status } => {
                write!(f, "Order {order_id} cannot be cancelled while {status}")
            }
            Self::OrderMismatch { expected, actual } => {
                write!(f, "Snapshot for order {actual} applied to order {expected}")
            }
            Self::UnknownOrder { order_id } => write!(f, "Order {order_id} is not tracked"),
        }
    }
}

impl std::error::Error for OrderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_finalized_display() {
        let err = OrderError::AlreadyFinalized {
            order_id: "o1".to_string(),
            status: OrderStatus::Filled,
        };
        assert_eq!(err.to_string(), "Order o1 is already finalized (FILLED)");
    }

    #[test]
    fn not_cancellable_display() {
        let err = OrderError::NotCancellable {
            order_id: "o1".to_string(),
            status: OrderStatus::Submitted,
        };
        assert!(err.to_string().contains("SUBMITTED"));
    }

    #[test]
    fn invalid_transition_display() {
        let err = OrderError::InvalidStateTransition {
            from: OrderStatus::Open,
            to: OrderStatus::Submitted,
            reason: "status cannot move backwards".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("OPEN"));
        assert!(msg.contains("SUBMITTED"));
    }
}
