//! A placed order plus the client's knowledge about how fresh it is.

use serde::{Deserialize, Serialize};

use super::PlacedOrder;
use crate::domain::shared::Timestamp;

/// Cache entry for a placed order.
///
/// A failed read never clears a known order; it marks it stale and
/// records why until the next successful read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedOrder {
    /// Last-known-good order.
    pub order: PlacedOrder,
    /// True if the latest read of this order failed.
    pub stale: bool,
    /// Message of the latest failed read.
    pub last_error: Option<String>,
    /// When the order was last read successfully.
    pub refreshed_at: Timestamp,
}

impl TrackedOrder {
    /// Track an order that was just read.
    #[must_use]
    pub const fn fresh(order: PlacedOrder, at: Timestamp) -> Self {
        Self {
            order,
            stale: false,
            last_error: None,
            refreshed_at: at,
        }
    }

    /// Record a successful read.
    pub fn mark_fresh(&mut self, at: Timestamp) {
        self.stale = false;
        self.last_error = None;
        self.refreshed_at = at;
    }

    /// Record a failed read, keeping the order as-is.
    pub fn mark_stale(&mut self, error: impl Into<String>) {
        self.stale = true;
        self.last_error = Some(error.into());
    }
}
