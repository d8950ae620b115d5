//! Trade workflow configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Trade workflow configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Lifetime of a preview handle when the impact calculator sends no
    /// expiry of its own.
    #[serde(default = "default_preview_ttl_secs")]
    pub preview_ttl_secs: u64,
    /// Workflows nobody has read or subscribed to for this long are
    /// closed and stop polling quotes.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            preview_ttl_secs: default_preview_ttl_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

impl WorkflowConfig {
    /// Idle timeout for open workflows.
    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

const fn default_preview_ttl_secs() -> u64 {
    60
}

const fn default_idle_timeout_secs() -> u64 {
    900
}
