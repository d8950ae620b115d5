//! Order status in the placed-order lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a placed order as reported by the brokerage.
///
/// ```text
/// Submitted -> Open -> PartiallyFilled -> Filled
///                   -> Filled | Cancelled | Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Commit accepted, not yet working at the venue.
    Submitted,
    /// Working at the venue.
    Open,
    /// Some quantity filled, remainder working.
    PartiallyFilled,
    /// Completely filled.
    Filled,
    /// Cancelled (by request or expiry).
    Cancelled,
    /// Rejected by the brokerage or venue.
    Rejected,
}

impl OrderStatus {
    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Rejected)
    }

    /// Returns true if a cancel request may be sent.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, Self::Open | Self::PartiallyFilled)
    }

    /// Returns true if the order is still live at the brokerage.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => write!(f, "SUBMITTED"),
            Self::Open => write!(f, "OPEN"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}
