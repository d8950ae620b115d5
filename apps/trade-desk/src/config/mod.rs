//! Configuration module for the trade desk.
//!
//! Loads a YAML file with environment variable interpolation and
//! validates it before anything is wired.
//!
//! # Usage
//!
//! ```rust,ignore
//! use trade_desk::config::{Config, load_config};
//!
//! // Load from TRADE_DESK_CONFIG, falling back to config.yaml
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod brokerage;
mod observability;
mod polling;
mod server;
mod workflow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use brokerage::{BrokerageConfig, BrokerageMode, GatewaySettings, RetrySettings};
pub use observability::{LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use polling::PollingConfig;
pub use server::ServerConfig;
pub use workflow::WorkflowConfig;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "TRADE_DESK_CONFIG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Brokerage configuration.
    #[serde(default)]
    pub brokerage: BrokerageConfig,
    /// Polling configuration.
    #[serde(default)]
    pub polling: PollingConfig,
    /// Trade workflow configuration.
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// The path is `path`, else `$TRADE_DESK_CONFIG`, else `config.yaml`.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(
        || std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.yaml".to_string()),
        str::to_string,
    );

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // constant pattern
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let polling = &config.polling;

    if polling.quote_interval_ms == 0
        || polling.order_list_interval_ms == 0
        || polling.order_focus_interval_ms == 0
    {
        return Err(ConfigError::ValidationError(
            "polling intervals must be positive".to_string(),
        ));
    }

    if polling.order_focus_interval_ms >= polling.order_list_interval_ms {
        return Err(ConfigError::ValidationError(
            "order_focus_interval_ms must be shorter than order_list_interval_ms".to_string(),
        ));
    }

    if polling.default_lookback_days == 0 {
        return Err(ConfigError::ValidationError(
            "default_lookback_days must be positive".to_string(),
        ));
    }

    if polling.max_lookback_days < polling.default_lookback_days {
        return Err(ConfigError::ValidationError(
            "max_lookback_days must be at least default_lookback_days".to_string(),
        ));
    }

    if config.workflow.preview_ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "preview_ttl_secs must be positive".to_string(),
        ));
    }

    if config.workflow.idle_timeout_secs <= config.workflow.preview_ttl_secs {
        return Err(ConfigError::ValidationError(
            "workflow.idle_timeout_secs must be longer than preview_ttl_secs".to_string(),
        ));
    }

    if config.polling.view_idle_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "polling.view_idle_timeout_secs must be positive".to_string(),
        ));
    }

    if config.brokerage.mode == BrokerageMode::Gateway {
        let gateway = &config.brokerage.gateway;
        if gateway.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "brokerage.gateway.base_url is required in GATEWAY mode".to_string(),
            ));
        }
        if gateway.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "brokerage.gateway.retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if gateway.retry.multiplier < 1.0 {
            return Err(ConfigError::ValidationError(
                "brokerage.gateway.retry.multiplier must be at least 1.0".to_string(),
            ));
        }
    }

    Ok(())
}
