//! Error envelope for the REST surface.
//!
//! Every failure a trading surface can see is reported as a structured
//! JSON body with a stable code, a human-readable message and optional
//! context.
//!
//! # HTTP Status Codes
//!
//! | Code | Status | Usage |
//! |------|--------|-------|
//! | `INVALID_REQUEST` | 400 | Malformed request |
//! | `VALIDATION_FAILED` | 422 | Form failed local validation |
//! | `PREVIEW_REJECTED` | 422 | Confirm on a quote the brokerage refuses |
//! | `COMMIT_REJECTED` | 422 | Brokerage refused the commit |
//! | `PREVIEW_CONSUMED` | 409 | Preview handle already used |
//! | `STALE_PREVIEW` | 409 | Preview no longer matches the form |
//! | `PREVIEW_EXPIRED` | 409 | Preview handle expired |
//! | `WORKFLOW_BUSY` | 409 | Preview or commit outstanding |
//! | `RUN_COMPLETE` | 409 | Order already placed, reset first |
//! | `ALREADY_FINALIZED` | 409 | Cancel on a terminal order |
//! | `NOT_CANCELLABLE` | 409 | Cancel before the order is working |
//! | `NOT_FOUND` | 404 | Unknown workflow or order |
//! | `RATE_LIMITED` | 429 | Brokerage rate limit |
//! | `COMMIT_UNCONFIRMED` | 502 | Commit outcome unknown |
//! | `BROKERAGE_UNAVAILABLE` | 503 | Brokerage could not be reached |
//! | `INTERNAL_ERROR` | 500 | Unexpected server error |

use std::collections::HashMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::ports::GatewayError;
use crate::application::use_cases::{LifecycleError, WorkflowError};

/// Error codes for the REST surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Invalid request format or missing fields.
    InvalidRequest,
    /// Order form failed validation.
    ValidationFailed,
    /// Confirm attempted on a rejected quote.
    PreviewRejected,
    /// Brokerage refused the commit.
    CommitRejected,
    /// Preview handle already used.
    PreviewConsumed,
    /// Preview does not match the current form.
    StalePreview,
    /// Preview handle expired.
    PreviewExpired,
    /// A preview or commit is outstanding.
    WorkflowBusy,
    /// The workflow already placed its order.
    RunComplete,
    /// Order is filled, cancelled or rejected.
    AlreadyFinalized,
    /// Order cannot be cancelled yet.
    NotCancellable,
    /// Resource not found.
    NotFound,
    /// Rate limit exceeded.
    RateLimited,
    /// Commit outcome unknown.
    CommitUnconfirmed,
    /// Brokerage could not be reached.
    BrokerageUnavailable,
    /// Internal server error.
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,

            Self::ValidationFailed | Self::PreviewRejected | Self::CommitRejected => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            Self::PreviewConsumed
            | Self::StalePreview
            | Self::PreviewExpired
            | Self::WorkflowBusy
            | Self::RunComplete
            | Self::AlreadyFinalized
            | Self::NotCancellable => StatusCode::CONFLICT,

            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::CommitUnconfirmed => StatusCode::BAD_GATEWAY,
            Self::BrokerageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::PreviewRejected => "PREVIEW_REJECTED",
            Self::CommitRejected => "COMMIT_REJECTED",
            Self::PreviewConsumed => "PREVIEW_CONSUMED",
            Self::StalePreview => "STALE_PREVIEW",
            Self::PreviewExpired => "PREVIEW_EXPIRED",
            Self::WorkflowBusy => "WORKFLOW_BUSY",
            Self::RunComplete => "RUN_COMPLETE",
            Self::AlreadyFinalized => "ALREADY_FINALIZED",
            Self::NotCancellable => "NOT_CANCELLABLE",
            Self::NotFound => "NOT_FOUND",
            Self::RateLimited => "RATE_LIMITED",
            Self::CommitUnconfirmed => "COMMIT_UNCONFIRMED",
            Self::BrokerageUnavailable => "BROKERAGE_UNAVAILABLE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// A REST error with context.
#[derive(Debug, Error)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    context: Vec<(String, String)>,
}

impl ApiError {
    /// Create a new API error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Add context to the error.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    /// Get the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the context.
    #[must_use]
    pub fn context(&self) -> &[(String, String)] {
        &self.context
    }

    /// Convert to the JSON error body.
    #[must_use]
    pub fn to_http_response(&self) -> HttpErrorResponse {
        HttpErrorResponse {
            code: self.code.reason().to_string(),
            message: self.message.clone(),
            details: self.context.iter().cloned().collect(),
        }
    }

    /// Invalid request format.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Resource not found.
    #[must_use]
    pub fn not_found(what: &str, id: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("{what} {id} not found")).with_context("id", id)
    }

    /// Internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.reason(), self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        if status.is_server_error() {
            tracing::warn!(code = %self.code, message = %self.message, "Request failed");
        }
        (status, Json(self.to_http_response())).into_response()
    }
}

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpErrorResponse {
    /// Error code string.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Additional details.
    #[serde(default)]
    pub details: HashMap<String, String>,
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        let message = err.to_string();
        match err {
            WorkflowError::Validation(_) => Self::new(ErrorCode::ValidationFailed, message),
            WorkflowError::PreviewUnavailable { .. } => {
                Self::new(ErrorCode::BrokerageUnavailable, message)
            }
            WorkflowError::PreviewRejected { .. } => Self::new(ErrorCode::PreviewRejected, message),
            WorkflowError::PreviewConsumed { preview_id } => {
                Self::new(ErrorCode::PreviewConsumed, message)
                    .with_context("preview_id", preview_id.as_str())
            }
            WorkflowError::StalePreview { preview_id } => {
                Self::new(ErrorCode::StalePreview, message)
                    .with_context("preview_id", preview_id.as_str())
            }
            WorkflowError::PreviewExpired { preview_id } => {
                Self::new(ErrorCode::PreviewExpired, message)
                    .with_context("preview_id", preview_id.as_str())
            }
            WorkflowError::CommitRejected { .. } => Self::new(ErrorCode::CommitRejected, message),
            WorkflowError::CommitUnconfirmed { preview_id, .. } => {
                Self::new(ErrorCode::CommitUnconfirmed, message)
                    .with_context("preview_id", preview_id.as_str())
            }
            WorkflowError::Busy { state } => {
                Self::new(ErrorCode::WorkflowBusy, message).with_context("state", state.to_string())
            }
            WorkflowError::RunComplete => Self::new(ErrorCode::RunComplete, message),
        }
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        let message = err.to_string();
        match err {
            LifecycleError::AlreadyFinalized { order_id, status } => {
                let error = Self::new(ErrorCode::AlreadyFinalized, message)
                    .with_context("order_id", order_id.as_str());
                match status {
                    Some(status) => error.with_context("status", status.to_string()),
                    None => error,
                }
            }
            LifecycleError::NotCancellable { order_id, status } => {
                Self::new(ErrorCode::NotCancellable, message)
                    .with_context("order_id", order_id.as_str())
                    .with_context("status", status.to_string())
            }
            LifecycleError::NotFound { order_id } => {
                Self::new(ErrorCode::NotFound, message).with_context("order_id", order_id.as_str())
            }
            LifecycleError::Unavailable { .. } => {
                Self::new(ErrorCode::BrokerageUnavailable, message)
            }
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let message = err.to_string();
        let code = match err {
            GatewayError::NotFound { .. } => ErrorCode::NotFound,
            GatewayError::RateLimited => ErrorCode::RateLimited,
            GatewayError::Rejected { .. } => ErrorCode::InvalidRequest,
            GatewayError::AlreadyFinalized { .. } => ErrorCode::AlreadyFinalized,
            GatewayError::CancelPending { .. } => ErrorCode::NotCancellable,
            GatewayError::Connection { .. } | GatewayError::Timeout => {
                ErrorCode::BrokerageUnavailable
            }
            GatewayError::Unknown { .. } => ErrorCode::InternalError,
        };
        Self::new(code, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_execution::{OrderStatus, ValidationError};
    use crate::domain::shared::{OrderId, PreviewId};

    #[test]
    fn error_code_http_mapping() {
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ErrorCode::AlreadyFinalized.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::CommitUnconfirmed.http_status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_with_context() {
        let error = ApiError::new(ErrorCode::InvalidRequest, "Bad request")
            .with_context("field", "quantity")
            .with_context("value", "abc");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "Bad request");
        assert_eq!(error.context().len(), 2);
    }

    #[test]
    fn validation_error_maps_to_422() {
        let error = ApiError::from(WorkflowError::Validation(ValidationError::MissingAccount));
        assert_eq!(error.code(), ErrorCode::ValidationFailed);
    }

    #[test]
    fn commit_unconfirmed_carries_preview_id() {
        let error = ApiError::from(WorkflowError::CommitUnconfirmed {
            preview_id: PreviewId::new("p1"),
            detail: "timeout".to_string(),
        });
        let body = error.to_http_response();
        assert_eq!(body.code, "COMMIT_UNCONFIRMED");
        assert_eq!(body.details.get("preview_id").map(String::as_str), Some("p1"));
        assert!(body.message.contains("check order history"));
    }

    #[test]
    fn already_finalized_carries_status() {
        let error = ApiError::from(LifecycleError::AlreadyFinalized {
            order_id: OrderId::new("o1"),
            status: Some(OrderStatus::Cancelled),
        });
        let body = error.to_http_response();
        assert_eq!(body.code, "ALREADY_FINALIZED");
        assert_eq!(body.details.get("order_id").map(String::as_str), Some("o1"));
        assert!(body.details.contains_key("status"));
    }

    #[test]
    fn error_display() {
        let error = ApiError::invalid_request("Missing field");
        assert_eq!(error.to_string(), "[INVALID_REQUEST] Missing field");
    }
}
