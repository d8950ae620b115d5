//! Symbol value object for tradable instruments.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// Longest ticker accepted by the brokerage.
const MAX_SYMBOL_LEN: usize = 12;

/// A ticker symbol such as "AAPL" or "BRK.B".
///
/// Normalized to trimmed uppercase on construction so that the
/// form, the quote feed, and the order history agree on one spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol, normalized to uppercase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_uppercase())
    }

    /// Create and validate in one step.
    ///
    /// # Errors
    ///
    /// Returns error if the normalized symbol is not a valid ticker.
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let symbol = Self::new(value);
        symbol.validate()?;
        Ok(symbol)
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Validate the symbol for order entry.
    ///
    /// # Errors
    ///
    /// Returns error if the symbol is empty, too long, or contains
    /// characters other than letters, digits, '.' and '-'.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            return Err(DomainError::InvalidValue {
                field: "symbol".to_string(),
                message: "symbol cannot be empty".to_string(),
            });
        }

        if self.0.len() > MAX_SYMBOL_LEN {
            return Err(DomainError::InvalidValue {
                field: "symbol".to_string(),
                message: format!("symbol exceeds {MAX_SYMBOL_LEN} characters"),
            });
        }

        let valid_chars = self
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !valid_chars || !self.0.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidValue {
                field: "symbol".to_string(),
                message: format!("'{}' is not a valid ticker", self.0),
            });
        }

        Ok(())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn symbol_normalizes_case_and_whitespace() {
        assert_eq!(Symbol::new("  aapl ").as_str(), "AAPL");
    }

    #[test_case("AAPL" ; "plain ticker")]
    #[test_case("BRK.B" ; "class share")]
    #[test_case("RDS-A" ; "dash suffix")]
    fn symbol_accepts(raw: &str) {
        assert!(Symbol::parse(raw).is_ok());
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "blank")]
    #[test_case("AAPL$" ; "symbol character")]
    #[test_case("1ABC" ; "leading digit")]
    #[test_case("ABCDEFGHIJKLM" ; "too long")]
    fn symbol_rejects(raw: &str) {
        assert!(matches!(
            Symbol::parse(raw),
            Err(DomainError::InvalidValue { .. })
        ));
    }

    #[test]
    fn symbol_display() {
        assert_eq!(format!("{}", Symbol::from("msft")), "MSFT");
    }
}
