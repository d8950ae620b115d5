//! HTTP response DTOs.

use serde::{Deserialize, Serialize};

use crate::application::dto::{OrderListDto, PlacedOrderDto, WorkflowSnapshot};
use crate::application::services::{QuoteView, ViewSnapshot};
use crate::application::use_cases::{CancelOutcome, OrderList};
use crate::domain::shared::{Timestamp, ViewId};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Brokerage mode.
    pub brokerage: String,
}

/// A workflow as a trading surface renders it.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResponse {
    /// Workflow state.
    #[serde(flatten)]
    pub snapshot: WorkflowSnapshot,
    /// Quote panel for the symbol on the form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_panel: Option<QuoteView>,
}

/// Result of a successful confirm.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmResponse {
    /// The placed order.
    pub order: PlacedOrderDto,
    /// Workflow after the commit.
    pub workflow: WorkflowSnapshot,
}

/// Result of a cancel request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    /// Order ID.
    pub order_id: String,
    /// What happened.
    pub outcome: CancelOutcome,
    /// Order as last known, with the pending-cancel marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<PlacedOrderDto>,
}

impl From<OrderList> for OrderListDto {
    fn from(list: OrderList) -> Self {
        Self {
            account_id: list.account_id.to_string(),
            lookback_days: list.window.lookback_days(),
            orders: list.orders.iter().map(PlacedOrderDto::from_tracked).collect(),
            stale: list.stale,
            last_error: list.last_error,
        }
    }
}

/// Contents of an open order or account view.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewBody {
    /// A single focused order.
    Order {
        /// Order being watched.
        order_id: String,
        /// Latest known state, once a read has succeeded.
        order: Option<PlacedOrderDto>,
        /// True once the order is terminal and the view is fresh.
        settled: bool,
        /// Message of the latest failed read.
        last_error: Option<String>,
        /// Number of responses applied.
        poll_seq: u64,
    },
    /// An account's order list.
    Account {
        /// Account.
        account_id: String,
        /// Days of history polled.
        lookback_days: u32,
        /// Orders, newest placement first.
        orders: Vec<PlacedOrderDto>,
        /// True if the latest read failed.
        stale: bool,
        /// Message of the latest failed read.
        last_error: Option<String>,
        /// Number of responses applied.
        poll_seq: u64,
        /// When the view last changed.
        updated_at: Option<Timestamp>,
    },
}

/// An open view and its handle.
#[derive(Debug, Clone, Serialize)]
pub struct ViewResponse {
    /// Handle for reading, refreshing and closing the view.
    pub view_id: String,
    /// Contents.
    #[serde(flatten)]
    pub view: ViewBody,
}

impl ViewResponse {
    /// Render a view snapshot.
    pub fn new(view_id: &ViewId, snapshot: &ViewSnapshot) -> Self {
        let view = match snapshot {
            ViewSnapshot::Order(view) => ViewBody::Order {
                order_id: view.order_id.to_string(),
                order: view.order.as_ref().map(PlacedOrderDto::from_tracked),
                settled: view.is_settled(),
                last_error: view.last_error.clone(),
                poll_seq: view.poll_seq,
            },
            ViewSnapshot::Account(view) => ViewBody::Account {
                account_id: view.account_id.to_string(),
                lookback_days: view.window.lookback_days(),
                orders: view.orders.iter().map(PlacedOrderDto::from_tracked).collect(),
                stale: view.stale,
                last_error: view.last_error.clone(),
                poll_seq: view.poll_seq,
                updated_at: view.updated_at,
            },
        };
        Self {
            view_id: view_id.to_string(),
            view,
        }
    }
}
