//! Order Cache Trait
//!
//! Last-known-good store for placed orders, shared by the lifecycle
//! tracker, the order monitor and the trade workflow controller.
//! Implemented by adapters in the infrastructure layer.

use async_trait::async_trait;

use super::aggregate::{MergeOutcome, PlacedOrder, TrackedOrder};
use super::errors::OrderError;
use crate::domain::shared::{AccountId, OrderId, Timestamp};

/// Repository trait for tracked orders.
///
/// Every method is atomic with respect to the others, so a manual
/// refresh and a background poll for the same order cannot interleave
/// a read and a write.
#[async_trait]
pub trait OrderCache: Send + Sync {
    /// Merge a freshly read snapshot, inserting it if the order is new.
    ///
    /// The entry is marked fresh whatever the merge outcome, since the
    /// read itself succeeded.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be updated.
    async fn merge(&self, order: PlacedOrder, read_at: Timestamp)
    -> Result<MergeOutcome, OrderError>;

    /// Find a tracked order.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be read.
    async fn get(&self, id: &OrderId) -> Result<Option<TrackedOrder>, OrderError>;

    /// Orders of an account placed at or after `since`, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be read.
    async fn list_for_account(
        &self,
        account_id: &AccountId,
        since: Timestamp,
    ) -> Result<Vec<TrackedOrder>, OrderError>;

    /// Mark one order stale after a failed read. Returns false if unknown.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be updated.
    async fn mark_stale(&self, id: &OrderId, error: &str) -> Result<bool, OrderError>;

    /// Mark every order of an account stale after a failed list read.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be updated.
    async fn mark_account_stale(&self, account_id: &AccountId, error: &str)
    -> Result<usize, OrderError>;

    /// Check the order is cancellable and set its pending-cancel marker
    /// in one step. Returns false if a cancel was already pending.
    ///
    /// Concurrent callers for the same order see exactly one `true`.
    ///
    /// # Errors
    ///
    /// `UnknownOrder`, or the order's own `AlreadyFinalized` /
    /// `NotCancellable`.
    async fn begin_cancel(&self, id: &OrderId, at: Timestamp) -> Result<bool, OrderError>;

    /// Clear the pending-cancel marker after a cancel request failed.
    ///
    /// # Errors
    ///
    /// Returns error if the order is unknown.
    async fn release_cancel(&self, id: &OrderId) -> Result<(), OrderError>;
}
