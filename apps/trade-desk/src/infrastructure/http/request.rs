//! HTTP request DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::order_execution::OrderDraft;
use crate::domain::trade_workflow::TradeSurface;

/// Request to open a workflow for a trading surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenWorkflowRequest {
    /// Surface opening the workflow.
    pub surface: TradeSurface,
    /// Initial form contents.
    pub draft: OrderDraft,
}

/// Request to replace the form contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDraftRequest {
    /// New form contents.
    pub draft: OrderDraft,
}

/// Request a preview, optionally replacing the form first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewRequest {
    /// Form contents to preview; the current form if absent.
    pub draft: Option<OrderDraft>,
}

/// Request to commit a previewed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmRequest {
    /// Preview handle shown to the user.
    pub preview_id: String,
}

/// Query parameters for order history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderHistoryQuery {
    /// Days of history; the configured default if absent.
    pub lookback_days: Option<u32>,
}
