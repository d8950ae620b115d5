//! Polling cadence and order history window.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::services::OrderMonitorConfig;

/// Polling configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Quote refresh while a ticket is open.
    #[serde(default = "default_quote_interval_ms")]
    pub quote_interval_ms: u64,
    /// Order list refresh.
    #[serde(default = "default_order_list_interval_ms")]
    pub order_list_interval_ms: u64,
    /// Refresh of a single order shown in a status dialog.
    #[serde(default = "default_order_focus_interval_ms")]
    pub order_focus_interval_ms: u64,
    /// History window when a request names none.
    #[serde(default = "default_lookback_days")]
    pub default_lookback_days: u32,
    /// Largest history window a request may ask for.
    #[serde(default = "default_max_lookback_days")]
    pub max_lookback_days: u32,
    /// Order and account views nobody has read or subscribed to for this
    /// long are closed and stop polling.
    #[serde(default = "default_view_idle_timeout_secs")]
    pub view_idle_timeout_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            quote_interval_ms: default_quote_interval_ms(),
            order_list_interval_ms: default_order_list_interval_ms(),
            order_focus_interval_ms: default_order_focus_interval_ms(),
            default_lookback_days: default_lookback_days(),
            max_lookback_days: default_max_lookback_days(),
            view_idle_timeout_secs: default_view_idle_timeout_secs(),
        }
    }
}

impl PollingConfig {
    /// Idle timeout for order and account views.
    #[must_use]
    pub const fn view_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.view_idle_timeout_secs)
    }

    /// Order monitor cadence.
    #[must_use]
    pub const fn monitor_config(&self) -> OrderMonitorConfig {
        OrderMonitorConfig {
            list_interval_ms: self.order_list_interval_ms,
            focus_interval_ms: self.order_focus_interval_ms,
        }
    }
}

const fn default_quote_interval_ms() -> u64 {
    5_000
}

const fn default_order_list_interval_ms() -> u64 {
    30_000
}

const fn default_order_focus_interval_ms() -> u64 {
    3_000
}

const fn default_lookback_days() -> u32 {
    7
}

const fn default_max_lookback_days() -> u32 {
    90
}

const fn default_view_idle_timeout_secs() -> u64 {
    300
}
