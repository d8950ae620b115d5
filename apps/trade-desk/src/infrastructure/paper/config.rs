//! Paper brokerage configuration.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::shared::Currency;

/// Configuration for the in-memory paper brokerage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperConfig {
    /// Reporting currency for every estimate.
    pub currency: Currency,
    /// Last price per symbol.
    pub prices: HashMap<String, Decimal>,
    /// Flat commission charged per order.
    pub commission_per_order: Decimal,
    /// Commission charged per share.
    pub commission_per_share: Decimal,
    /// Cash available for buys.
    pub buying_power: Decimal,
    /// Whether orders are accepted.
    pub market_open: bool,
    /// Lifetime of a preview handle in seconds.
    pub preview_ttl_secs: u64,
    /// Move orders one lifecycle step forward on every read.
    pub auto_progress: bool,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            currency: Currency::Usd,
            prices: HashMap::from([
                ("AAPL".to_string(), dec!(150.00)),
                ("MSFT".to_string(), dec!(400.00)),
                ("SPY".to_string(), dec!(500.00)),
                ("VTI".to_string(), dec!(250.00)),
            ]),
            commission_per_order: Decimal::ZERO,
            commission_per_share: Decimal::ZERO,
            buying_power: dec!(100000),
            market_open: true,
            preview_ttl_secs: 60,
            auto_progress: false,
        }
    }
}

impl PaperConfig {
    /// Set the price of a symbol.
    #[must_use]
    pub fn with_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.prices.insert(symbol.to_uppercase(), price);
        self
    }

    /// Set the fee schedule.
    #[must_use]
    pub const fn with_commission(mut self, per_order: Decimal, per_share: Decimal) -> Self {
        self.commission_per_order = per_order;
        self.commission_per_share = per_share;
        self
    }

    /// Set the buying power.
    #[must_use]
    pub const fn with_buying_power(mut self, buying_power: Decimal) -> Self {
        self.buying_power = buying_power;
        self
    }

    /// Open or close the market.
    #[must_use]
    pub const fn with_market_open(mut self, open: bool) -> Self {
        self.market_open = open;
        self
    }

    /// Commission for an order of `quantity` shares.
    #[must_use]
    pub fn commission(&self, quantity: Decimal) -> Decimal {
        self.commission_per_order + self.commission_per_share * quantity
    }
}
