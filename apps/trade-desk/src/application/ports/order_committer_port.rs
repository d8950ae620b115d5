//! Order Committer Port (Driven Port)

use async_trait::async_trait;

use super::GatewayError;
use crate::domain::order_execution::PlacedOrder;
use crate::domain::shared::PreviewId;

/// Port for placing a previewed order.
///
/// Implementations must send the request exactly once and must not
/// retry on their own: a transport failure leaves the outcome unknown.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderCommitterPort: Send + Sync {
    /// Place the order authorized by `preview_id`.
    ///
    /// `GatewayError::Rejected` means no order was placed; any other
    /// error means the order may or may not exist.
    async fn commit(&self, preview_id: &PreviewId) -> Result<PlacedOrder, GatewayError>;
}
