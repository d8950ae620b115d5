//! Time in force for orders.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How long an order stays working at the brokerage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Valid for the current trading day only.
    #[default]
    Day,
    /// Good-til-cancelled.
    Gtc,
    /// Fill-or-kill (all or nothing, immediately).
    Fok,
    /// Immediate-or-cancel (fill what is possible, cancel the rest).
    Ioc,
}

impl TimeInForce {
    /// Returns true if the order must execute immediately or not at all.
    #[must_use]
    pub const fn is_immediate(&self) -> bool {
        matches!(self, Self::Fok | Self::Ioc)
    }

    /// Lowercase wire spelling used by the brokerage gateway.
    #[must_use]
    pub const fn as_wire(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Gtc => "gtc",
            Self::Fok => "fok",
            Self::Ioc => "ioc",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "DAY"),
            Self::Gtc => write!(f, "GTC"),
            Self::Fok => write!(f, "FOK"),
            Self::Ioc => write!(f, "IOC"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_in_force_default_is_day() {
        assert_eq!(TimeInForce::default(), TimeInForce::Day);
    }

    #[test]
    fn time_in_force_is_immediate() {
        assert!(TimeInForce::Fok.is_immediate());
        assert!(TimeInForce::Ioc.is_immediate());
        assert!(!TimeInForce::Gtc.is_immediate());
    }

    #[test]
    fn time_in_force_serde() {
        let parsed: TimeInForce = serde_json::from_str("\"GTC\"").unwrap();
        assert_eq!(parsed, TimeInForce::Gtc);
        assert_eq!(parsed.as_wire(), "gtc");
    }
}
