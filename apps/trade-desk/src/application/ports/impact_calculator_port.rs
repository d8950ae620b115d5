//! Impact Calculator Port (Driven Port)

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::order_execution::{ImpactQuote, OrderIntent};

/// Port for pricing an order before it is committed.
///
/// The call has no side effects at the brokerage, so it may be retried.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImpactCalculatorPort: Send + Sync {
    /// Estimate cost and fees and issue a single-use preview handle.
    ///
    /// A business refusal is returned as a quote with a rejected
    /// verdict, not as an error.
    async fn compute_impact(&self, intent: &OrderIntent) -> Result<ImpactQuote, GatewayError>;
}
