//! Workflow states and the UI surfaces that drive them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of one trade workflow run.
///
/// ```text
/// Form -> Previewing -> Preview -> Confirming -> Success
///                    -> Error              -> Error
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    /// Editing the order form.
    #[default]
    Form,
    /// Waiting for the impact calculator.
    Previewing,
    /// Showing an impact quote.
    Preview,
    /// Waiting for the order committer.
    Confirming,
    /// Order placed.
    Success,
    /// Preview or commit failed.
    Error,
}

impl WorkflowState {
    /// Returns true while a network call of this run is outstanding.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::Previewing | Self::Confirming)
    }

    /// Returns true if a new preview may be requested from this state.
    #[must_use]
    pub const fn accepts_preview_request(&self) -> bool {
        matches!(self, Self::Form | Self::Preview | Self::Error)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Form => write!(f, "FORM"),
            Self::Previewing => write!(f, "PREVIEWING"),
            Self::Preview => write!(f, "PREVIEW"),
            Self::Confirming => write!(f, "CONFIRMING"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// The dashboard surface a workflow or order view belongs to.
///
/// Every surface runs the same workflow; the label only feeds logs
/// and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSurface {
    /// Quick buy/sell widget.
    QuickTrade,
    /// Full trading ticket.
    #[default]
    TradeTicket,
    /// Order preview dialog.
    OrderPreview,
    /// Order status dialog.
    OrderStatus,
}

impl TradeSurface {
    /// Label used in metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::QuickTrade => "quick_trade",
            Self::TradeTicket => "trade_ticket",
            Self::OrderPreview => "order_preview",
            Self::OrderStatus => "order_status",
        }
    }
}

impl fmt::Display for TradeSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
