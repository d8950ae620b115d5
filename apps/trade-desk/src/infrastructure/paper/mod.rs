//! Paper Brokerage
//!
//! Deterministic in-memory brokerage used in `PAPER` mode and by tests.

mod brokerage;
mod config;

pub use brokerage::{INSUFFICIENT_BUYING_POWER, OUTSIDE_MARKET_HOURS, PaperBrokerage};
pub use config::PaperConfig;
