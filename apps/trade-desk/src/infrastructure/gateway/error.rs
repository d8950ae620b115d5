//! Gateway client error types.

use thiserror::Error;

use super::api_types::parse_order_status;
use crate::application::ports::GatewayError;

/// Errors from the gateway HTTP client.
#[derive(Debug, Error, Clone)]
pub enum GatewayClientError {
    /// The request could not be sent or the connection dropped.
    #[error("network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("request timed out")]
    Timeout,

    /// Response body could not be decoded.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// The gateway refused the request (HTTP 400/422).
    #[error("rejected: {0}")]
    Rejected(String),

    /// Authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Resource not found.
    #[error("not found: {path}")]
    NotFound {
        /// Request path.
        path: String,
    },

    /// Conflict with the resource's current state (HTTP 409).
    #[error("conflict: {message}")]
    Conflict {
        /// Error message.
        message: String,
        /// Gateway error code, if any.
        code: Option<String>,
    },

    /// Rate limited.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: u64,
    },

    /// Retries exhausted.
    #[error("max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// Server error on a request that is not retried.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
    },
}

impl From<GatewayClientError> for GatewayError {
    fn from(err: GatewayClientError) -> Self {
        match err {
            GatewayClientError::Network(message) => Self::Connection { message },
            GatewayClientError::Timeout => Self::Timeout,
            GatewayClientError::MaxRetriesExceeded { attempts } => Self::Connection {
                message: format!("max retries exceeded after {attempts} attempts"),
            },
            GatewayClientError::Rejected(reason) => Self::Rejected { reason },
            GatewayClientError::NotFound { path } => Self::NotFound { resource: path },
            GatewayClientError::Conflict { message, code } => Self::Unknown {
                message: match code {
                    Some(code) => format!("{code}: {message}"),
                    None => message,
                },
            },
            GatewayClientError::RateLimited { .. } => Self::RateLimited,
            GatewayClientError::JsonParse(message) => Self::Unknown { message },
            GatewayClientError::AuthenticationFailed => Self::Unknown {
                message: "authentication failed".to_string(),
            },
            GatewayClientError::Api { code, message } => Self::Unknown {
                message: format!("{code}: {message}"),
            },
        }
    }
}

/// Conflict code the brokerage sends while a cancel is in flight.
const PENDING_CANCEL: &str = "pending_cancel";

impl GatewayClientError {
    /// Interpret a cancel failure.
    ///
    /// A conflict is only `AlreadyFinalized` when its code names a
    /// terminal status. A pending cancel is reported as such; any other
    /// conflict stays an ordinary gateway error.
    pub fn into_cancel_error(self, order_id: &str) -> GatewayError {
        match self {
            Self::Conflict { code: Some(code), .. }
                if code.eq_ignore_ascii_case(PENDING_CANCEL) =>
            {
                GatewayError::CancelPending {
                    order_id: order_id.to_string(),
                }
            }
            Self::Conflict { code, message } => {
                match code.as_deref().and_then(|c| parse_order_status(c).ok()) {
                    Some(status) if status.is_terminal() => GatewayError::AlreadyFinalized {
                        order_id: order_id.to_string(),
                        status: Some(status),
                    },
                    _ => Self::Conflict { code, message }.into(),
                }
            }
            other => other.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_execution::OrderStatus;

    #[test]
    fn network_error_is_connection() {
        let err: GatewayError = GatewayClientError::Network("refused".to_string()).into();
        assert!(matches!(err, GatewayError::Connection { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn rejected_is_business_rejection() {
        let err: GatewayError =
            GatewayClientError::Rejected("insufficient buying power".to_string()).into();
        assert_eq!(
            err,
            GatewayError::Rejected {
                reason: "insufficient buying power".to_string()
            }
        );
    }

    #[test]
    fn cancel_conflict_is_already_finalized() {
        let err = GatewayClientError::Conflict {
            message: "order is filled".to_string(),
            code: Some("filled".to_string()),
        }
        .into_cancel_error("o1");
        assert_eq!(
            err,
            GatewayError::AlreadyFinalized {
                order_id: "o1".to_string(),
                status: Some(OrderStatus::Filled)
            }
        );
    }

    #[test]
    fn pending_cancel_conflict_is_not_finalized() {
        let err = GatewayClientError::Conflict {
            message: "cancel already requested".to_string(),
            code: Some("pending_cancel".to_string()),
        }
        .into_cancel_error("o1");
        assert_eq!(
            err,
            GatewayError::CancelPending {
                order_id: "o1".to_string()
            }
        );
    }

    #[test]
    fn conflict_with_working_status_stays_a_gateway_error() {
        for code in [Some("open"), Some("partially_filled"), Some("locked"), None] {
            let err = GatewayClientError::Conflict {
                message: "cannot cancel".to_string(),
                code: code.map(str::to_string),
            }
            .into_cancel_error("o1");
            assert!(
                matches!(err, GatewayError::Unknown { .. }),
                "{code:?} mapped to {err:?}"
            );
        }
    }

    #[test]
    fn timeout_maps_to_timeout() {
        let err: GatewayError = GatewayClientError::Timeout.into();
        assert_eq!(err, GatewayError::Timeout);
    }
}
