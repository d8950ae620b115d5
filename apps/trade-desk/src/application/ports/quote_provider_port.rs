//! Quote Provider Port (Driven Port)
//!
//! Read-only market price for a symbol, refreshed on a fixed interval
//! while a trading surface is open.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::GatewayError;
use crate::domain::shared::{Symbol, Timestamp};

/// Latest price for a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Last trade price.
    pub price: Decimal,
    /// Best bid, if available.
    pub bid: Option<Decimal>,
    /// Best ask, if available.
    pub ask: Option<Decimal>,
    /// Change since previous close, in percent.
    pub change_percent: Option<Decimal>,
    /// When the provider produced the quote.
    pub as_of: Timestamp,
}

impl Quote {
    /// Create a quote with only a last price.
    #[must_use]
    pub const fn new(symbol: Symbol, price: Decimal, as_of: Timestamp) -> Self {
        Self {
            symbol,
            price,
            bid: None,
            ask: None,
            change_percent: None,
            as_of,
        }
    }

    /// Attach bid and ask.
    #[must_use]
    pub const fn with_spread(mut self, bid: Decimal, ask: Decimal) -> Self {
        self.bid = Some(bid);
        self.ask = Some(ask);
        self
    }

    /// Attach the daily change.
    #[must_use]
    pub const fn with_change_percent(mut self, change: Decimal) -> Self {
        self.change_percent = Some(change);
        self
    }

    /// Midpoint of bid and ask, falling back to the last price.
    #[must_use]
    pub fn mid(&self) -> Decimal {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => (bid + ask) / Decimal::from(2),
            _ => self.price,
        }
    }

    /// Ask minus bid, when both are known.
    #[must_use]
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.ask? - self.bid?)
    }
}

/// Port for fetching quotes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteProviderPort: Send + Sync {
    /// Get the current quote for a symbol.
    async fn get_quote(&self, symbol: &Symbol) -> Result<Quote, GatewayError>;
}
