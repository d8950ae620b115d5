//! Workflow DTOs
//!
//! What a trading surface renders: one snapshot per workflow change.

use serde::{Deserialize, Serialize};

use super::PlacedOrderDto;
use crate::domain::order_execution::{ImpactQuote, OrderDraft};
use crate::domain::shared::{Money, Timestamp, WorkflowId};
use crate::domain::trade_workflow::{TradeSurface, TradeWorkflow, WorkflowState};

/// An impact quote as shown in the preview step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactQuoteDto {
    /// Single-use preview handle.
    pub preview_id: String,
    /// Whether the brokerage would accept the order.
    pub accepted: bool,
    /// Present iff not accepted.
    pub rejection_reason: Option<String>,
    /// Principal.
    pub estimated_cost: Money,
    /// Fees.
    pub estimated_fees: Money,
    /// Total.
    pub estimated_total: Money,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
    /// When the quote was produced.
    pub generated_at: Timestamp,
    /// When the preview handle stops being committable.
    pub expires_at: Timestamp,
}

impl ImpactQuoteDto {
    /// Create from a domain quote.
    #[must_use]
    pub fn from_quote(quote: &ImpactQuote, ttl_secs: u64) -> Self {
        let estimate = quote.estimate();
        Self {
            preview_id: quote.preview_id().to_string(),
            accepted: quote.is_accepted(),
            rejection_reason: quote.rejection_reason().map(str::to_string),
            estimated_cost: estimate.cost,
            estimated_fees: estimate.fees,
            estimated_total: estimate.total,
            warnings: quote.warnings().to_vec(),
            generated_at: quote.generated_at(),
            expires_at: quote.effective_expiry(ttl_secs),
        }
    }
}

/// Everything a surface needs to render a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    /// Workflow ID.
    pub workflow_id: WorkflowId,
    /// Surface that owns the workflow.
    pub surface: TradeSurface,
    /// Current state.
    pub state: WorkflowState,
    /// Run generation; changes on every edit, preview and reset.
    pub run: u64,
    /// Form contents.
    pub draft: OrderDraft,
    /// Held quote.
    pub quote: Option<ImpactQuoteDto>,
    /// Placed order, after success.
    pub placed_order: Option<PlacedOrderDto>,
    /// Error text to show.
    pub error: Option<String>,
    /// Whether the confirm control is enabled.
    pub can_confirm: bool,
    /// Whether the preview control is enabled.
    pub can_request_preview: bool,
    /// When the snapshot was taken.
    pub captured_at: Timestamp,
}

impl WorkflowSnapshot {
    /// Capture the current state of a workflow.
    #[must_use]
    pub fn capture(workflow: &TradeWorkflow, surface: TradeSurface, now: Timestamp) -> Self {
        let ttl = workflow.preview_ttl_secs();
        Self {
            workflow_id: workflow.id().clone(),
            surface,
            state: workflow.state(),
            run: workflow.run(),
            draft: workflow.draft().clone(),
            quote: workflow.quote().map(|q| ImpactQuoteDto::from_quote(q, ttl)),
            placed_order: workflow.placed_order().map(PlacedOrderDto::from_order),
            error: workflow.last_error().map(ToString::to_string),
            can_confirm: workflow.can_confirm(now),
            can_request_preview: workflow.can_request_preview(),
            captured_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_execution::{ImpactEstimate, ImpactVerdict, OrderSide};
    use crate::domain::shared::PreviewId;
    use rust_decimal_macros::dec;

    #[test]
    fn quote_dto_exposes_reason_and_expiry() {
        let generated = Timestamp::parse("2026-03-02T14:30:00Z").unwrap();
        let quote = ImpactQuote::new(
            PreviewId::new("p2"),
            ImpactVerdict::Rejected {
                reason: "Outside market hours".to_string(),
            },
            ImpactEstimate::from_parts(Money::usd(dec!(1500)), Money::usd(dec!(0))).unwrap(),
            generated,
        );
        let dto = ImpactQuoteDto::from_quote(&quote, 60);
        assert!(!dto.accepted);
        assert_eq!(dto.rejection_reason.as_deref(), Some("Outside market hours"));
        assert_eq!(dto.expires_at, generated.plus_seconds(60));
    }

    #[test]
    fn snapshot_of_fresh_workflow() {
        let wf = TradeWorkflow::new(
            WorkflowId::new("wf-1"),
            OrderDraft::market("acct-1", "AAPL", OrderSide::Buy, dec!(10)),
            60,
        );
        let snap = WorkflowSnapshot::capture(&wf, TradeSurface::QuickTrade, Timestamp::now());
        assert_eq!(snap.state, WorkflowState::Form);
        assert!(snap.can_request_preview);
        assert!(!snap.can_confirm);
        assert!(snap.quote.is_none());
        assert!(snap.error.is_none());
    }
}
