//! Impact Quote
//!
//! A non-binding estimate of an order's cost returned by the impact
//! calculator, together with the single-use preview handle that
//! authorizes committing it.

use serde::{Deserialize, Serialize};

use crate::domain::shared::{DomainError, Money, PreviewId, Timestamp};

/// Whether the brokerage would accept the order as previewed.
///
/// A rejection always carries its reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpactVerdict {
    /// The order may be committed.
    Accepted,
    /// The order would be refused.
    Rejected {
        /// Human-readable reason, e.g. "Outside market hours".
        reason: String,
    },
}

/// Estimated cost, fees and total of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactEstimate {
    /// Principal (price x quantity).
    pub cost: Money,
    /// Commissions and regulatory fees.
    pub fees: Money,
    /// Amount the account will be debited or credited.
    pub total: Money,
}

impl ImpactEstimate {
    /// Build an estimate whose total is `cost + fees`.
    ///
    /// # Errors
    ///
    /// Returns error if cost and fees are in different currencies.
    pub fn from_parts(cost: Money, fees: Money) -> Result<Self, DomainError> {
        Ok(Self {
            cost,
            fees,
            total: cost.checked_add(fees)?,
        })
    }
}

/// The result of one impact calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactQuote {
    preview_id: PreviewId,
    verdict: ImpactVerdict,
    estimate: ImpactEstimate,
    warnings: Vec<String>,
    generated_at: Timestamp,
    expires_at: Option<Timestamp>,
}

impl ImpactQuote {
    /// Create a quote.
    #[must_use]
    pub const fn new(
        preview_id: PreviewId,
        verdict: ImpactVerdict,
        estimate: ImpactEstimate,
        generated_at: Timestamp,
    ) -> Self {
        Self {
            preview_id,
            verdict,
            estimate,
            warnings: Vec::new(),
            generated_at,
            expires_at: None,
        }
    }

    /// Attach non-fatal warnings, in display order.
    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Attach the calculator's own expiry for the preview handle.
    #[must_use]
    pub const fn with_expiry(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Single-use preview handle.
    #[must_use]
    pub const fn preview_id(&self) -> &PreviewId {
        &self.preview_id
    }

    /// Accept/reject verdict.
    #[must_use]
    pub const fn verdict(&self) -> &ImpactVerdict {
        &self.verdict
    }

    /// Returns true if the brokerage would accept the order.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self.verdict, ImpactVerdict::Accepted)
    }

    /// Rejection reason, present iff the quote is not accepted.
    #[must_use]
    pub fn rejection_reason(&self) -> Option<&str> {
        match &self.verdict {
            ImpactVerdict::Accepted => None,
            ImpactVerdict::Rejected { reason } => Some(reason),
        }
    }

    /// Cost, fees and total.
    #[must_use]
    pub const fn estimate(&self) -> &ImpactEstimate {
        &self.estimate
    }

    /// Non-fatal warnings.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// When the calculator produced the quote.
    #[must_use]
    pub const fn generated_at(&self) -> Timestamp {
        self.generated_at
    }

    /// Expiry sent by the calculator, if any.
    #[must_use]
    pub const fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// Effective expiry: the calculator's, else `generated_at + ttl_secs`.
    #[must_use]
    pub fn effective_expiry(&self, ttl_secs: u64) -> Timestamp {
        self.expires_at.unwrap_or_else(|| {
            self.generated_at
                .plus_seconds(i64::try_from(ttl_secs).unwrap_or(i64::from(u32::MAX)))
        })
    }

    /// Returns true if the preview handle may no longer be committed at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp, ttl_secs: u64) -> bool {
        now >= self.effective_expiry(ttl_secs)
    }
}
