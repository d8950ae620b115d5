//! Order State Machine Service
//!
//! Validates status changes reported by the brokerage.

use crate::domain::order_execution::errors::OrderError;
use crate::domain::order_execution::value_objects::OrderStatus;

/// Allowed placed-order status transitions.
///
/// Polling can skip intermediate states (an order may go straight from
/// `Submitted` to `Filled` between two polls), so every forward move is
/// allowed. Repeating a non-terminal status is allowed so that fill
/// progress on a `PartiallyFilled` order can be applied.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Check if a state transition is valid.
    #[must_use]
    pub const fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            (
                OrderStatus::Submitted,
                OrderStatus::Submitted
                    | OrderStatus::Open
                    | OrderStatus::PartiallyFilled
                    | OrderStatus::Filled
                    | OrderStatus::Cancelled
                    | OrderStatus::Rejected
            ) | (
                OrderStatus::Open,
                OrderStatus::Open
                    | OrderStatus::PartiallyFilled
                    | OrderStatus::Filled
                    | OrderStatus::Cancelled
                    | OrderStatus::Rejected
            ) | (
                OrderStatus::PartiallyFilled,
                OrderStatus::PartiallyFilled | OrderStatus::Filled | OrderStatus::Cancelled
            )
        )
    }

    /// Validate a state transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is invalid.
    pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(OrderError::InvalidStateTransition {
                from,
                to,
                reason: Self::transition_error_reason(from, to),
            })
        }
    }

    /// Human-readable reason for an invalid transition.
    #[must_use]
    pub fn transition_error_reason(from: OrderStatus, to: OrderStatus) -> String {
        match from {
            OrderStatus::Filled => format!("order is already filled, cannot become {to}"),
            OrderStatus::Cancelled => format!("order is cancelled, cannot become {to}"),
            OrderStatus::Rejected => format!("order was rejected, cannot become {to}"),
            _ => format!("status cannot move backwards from {from} to {to}"),
        }
    }

    /// All statuses reachable from `from`.
    #[must_use]
    pub fn valid_next_states(from: OrderStatus) -> Vec<OrderStatus> {
        ALL_STATUSES
            .into_iter()
            .filter(|to| Self::is_valid_transition(from, *to))
            .collect()
    }
}

const ALL_STATUSES: [OrderStatus; 6] = [
    OrderStatus::Submitted,
    OrderStatus::Open,
    OrderStatus::PartiallyFilled,
    OrderStatus::Filled,
    OrderStatus::Cancelled,
    OrderStatus::Rejected,
];
