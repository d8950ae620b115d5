//! Brokerage configuration: which adapter serves the driven ports.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::gateway::{GatewayConfig, RetryConfig};
use crate::infrastructure::paper::PaperConfig;

/// Which brokerage implementation to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BrokerageMode {
    /// In-memory paper brokerage.
    #[default]
    Paper,
    /// Remote brokerage gateway.
    Gateway,
}

impl BrokerageMode {
    /// Label used in logs and the health endpoint.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Paper => "PAPER",
            Self::Gateway => "GATEWAY",
        }
    }
}

/// Brokerage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BrokerageConfig {
    /// Adapter selection.
    #[serde(default)]
    pub mode: BrokerageMode,
    /// Remote gateway settings, used in `GATEWAY` mode.
    #[serde(default)]
    pub gateway: GatewaySettings,
    /// Paper brokerage settings, used in `PAPER` mode.
    #[serde(default)]
    pub paper: PaperConfig,
}

/// Remote gateway settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Gateway base URL.
    #[serde(default)]
    pub base_url: String,
    /// Bearer token.
    #[serde(default)]
    pub api_key: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retry policy for idempotent requests.
    #[serde(default)]
    pub retry: RetrySettings,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_ms: default_timeout_ms(),
            retry: RetrySettings::default(),
        }
    }
}

impl GatewaySettings {
    /// Build the adapter configuration.
    #[must_use]
    pub fn to_gateway_config(&self) -> GatewayConfig {
        GatewayConfig::new(&self.base_url, &self.api_key)
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_retry(RetryConfig {
                max_attempts: self.retry.max_attempts,
                initial_backoff: Duration::from_millis(self.retry.initial_backoff_ms),
                max_backoff: Duration::from_millis(self.retry.max_backoff_ms),
                multiplier: self.retry.multiplier,
            })
    }
}

/// Retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Attempts including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff cap in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Backoff multiplier.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
        }
    }
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    100
}

const fn default_max_backoff_ms() -> u64 {
    5_000
}

const fn default_multiplier() -> f64 {
    2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_settings_to_adapter_config() {
        let settings = GatewaySettings {
            base_url: "https://gateway.example.com/".to_string(),
            api_key: "key".to_string(),
            timeout_ms: 2_500,
            retry: RetrySettings {
                max_attempts: 5,
                ..RetrySettings::default()
            },
        };
        let config = settings.to_gateway_config();
        assert_eq!(config.base_url, "https://gateway.example.com");
        assert_eq!(config.timeout, Duration::from_millis(2_500));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff, Duration::from_millis(100));
    }

    #[test]
    fn mode_labels() {
        assert_eq!(BrokerageMode::Paper.as_str(), "PAPER");
        assert_eq!(BrokerageMode::Gateway.as_str(), "GATEWAY");
    }
}
