//! Errors reported by the external brokerage gateway.

use thiserror::Error;

use crate::domain::order_execution::OrderStatus;

/// Brokerage gateway error, shared by every driven port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The gateway could not be reached or the connection dropped.
    #[error("gateway connection error: {message}")]
    Connection {
        /// Error details.
        message: String,
    },

    /// The request timed out; the outcome is unknown.
    #[error("gateway request timed out")]
    Timeout,

    /// The brokerage refused the request for a business reason.
    #[error("rejected by brokerage: {reason}")]
    Rejected {
        /// Rejection reason.
        reason: String,
    },

    /// The referenced resource does not exist.
    #[error("not found: {resource}")]
    NotFound {
        /// What was looked up.
        resource: String,
    },

    /// The order is already filled, cancelled or rejected.
    #[error("order {order_id} is already finalized")]
    AlreadyFinalized {
        /// Order ID.
        order_id: String,
        /// Terminal status, when the gateway reports it.
        status: Option<OrderStatus>,
    },

    /// The brokerage already holds a cancel request for the order.
    #[error("cancel already pending for order {order_id}")]
    CancelPending {
        /// Order ID.
        order_id: String,
    },

    /// Too many requests.
    #[error("rate limited by gateway")]
    RateLimited,

    /// Anything else.
    #[error("gateway error: {message}")]
    Unknown {
        /// Error details.
        message: String,
    },
}

impl GatewayError {
    /// Returns true if repeating an idempotent request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout | Self::RateLimited)
    }

    /// Short label for metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::Timeout => "timeout",
            Self::Rejected { .. } => "rejected",
            Self::NotFound { .. } => "not_found",
            Self::AlreadyFinalized { .. } => "already_finalized",
            Self::CancelPending { .. } => "cancel_pending",
            Self::RateLimited => "rate_limited",
            Self::Unknown { .. } => "unknown",
        }
    }
}
