//! Observability module for metrics.
//!
//! Logging and distributed tracing are set up in [`crate::telemetry`].

mod metrics;

pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_cancel, record_commit,
    record_gateway_request, record_idle_close, record_poll, record_preview,
    record_snapshot_merge, update_open_views, update_open_workflows,
};
