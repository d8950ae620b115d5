//! In-memory order cache.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::order_execution::aggregate::{MergeOutcome, PlacedOrder, TrackedOrder};
use crate::domain::order_execution::errors::OrderError;
use crate::domain::order_execution::repository::OrderCache;
use crate::domain::shared::{AccountId, OrderId, Timestamp};

/// In-memory implementation of `OrderCache`.
///
/// Each trait method holds the write lock for its whole read-modify-write,
/// which is what makes concurrent merges of the same order safe.
#[derive(Debug, Default)]
pub struct InMemoryOrderCache {
    orders: RwLock<HashMap<OrderId, TrackedOrder>>,
}

impl InMemoryOrderCache {
    /// Create a new empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
        }
    }

    /// Get the number of tracked orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }

    /// Drop every tracked order.
    pub fn clear(&self) {
        self.orders.write().clear();
    }
}

#[async_trait]
impl OrderCache for InMemoryOrderCache {
    async fn merge(
        &self,
        order: PlacedOrder,
        read_at: Timestamp,
    ) -> Result<MergeOutcome, OrderError> {
        let mut orders = self.orders.write();
        match orders.get_mut(order.order_id()) {
            Some(tracked) => {
                let outcome = tracked.order.merge(&order)?;
                tracked.mark_fresh(read_at);
                Ok(outcome)
            }
            None => {
                orders.insert(order.order_id().clone(), TrackedOrder::fresh(order, read_at));
                Ok(MergeOutcome::Applied)
            }
        }
    }

    async fn get(&self, id: &OrderId) -> Result<Option<TrackedOrder>, OrderError> {
        Ok(self.orders.read().get(id).cloned())
    }

    async fn list_for_account(
        &self,
        account_id: &AccountId,
        since: Timestamp,
    ) -> Result<Vec<TrackedOrder>, OrderError> {
        let orders = self.orders.read();
        let mut matching: Vec<TrackedOrder> = orders
            .values()
            .filter(|t| t.order.account_id() == account_id && t.order.placed_at() >= since)
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.order
                .placed_at()
                .cmp(&a.order.placed_at())
                .then_with(|| a.order.order_id().as_str().cmp(b.order.order_id().as_str()))
        });
        Ok(matching)
    }

    async fn mark_stale(&self, id: &OrderId, error: &str) -> Result<bool, OrderError> {
        let mut orders = self.orders.write();
        Ok(orders.get_mut(id).is_some_and(|tracked| {
            tracked.mark_stale(error);
            true
        }))
    }

    async fn mark_account_stale(
        &self,
        account_id: &AccountId,
        error: &str,
    ) -> Result<usize, OrderError> {
        let mut orders = self.orders.write();
        let mut count = 0;
        for tracked in orders
            .values_mut()
            .filter(|t| t.order.account_id() == account_id)
        {
            tracked.mark_stale(error);
            count += 1;
        }
        Ok(count)
    }

    async fn begin_cancel(&self, id: &OrderId, at: Timestamp) -> Result<bool, OrderError> {
        let mut orders = self.orders.write();
        let tracked = orders.get_mut(id).ok_or_else(|| OrderError::UnknownOrder {
            order_id: id.to_string(),
        })?;
        tracked.order.begin_cancel(at)
    }

    async fn release_cancel(&self, id: &OrderId) -> Result<(), OrderError> {
        let mut orders = self.orders.write();
        let tracked = orders.get_mut(id).ok_or_else(|| OrderError::UnknownOrder {
            order_id: id.to_string(),
        })?;
        tracked.order.release_cancel();
        Ok(())
    }
}
