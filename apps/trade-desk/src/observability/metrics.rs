//! Prometheus metrics for the trade desk.
//!
//! Counters for every preview, commit, cancel and poll outcome, plus
//! gateway latency. Recording is a no-op until [`init_metrics`] installs
//! the exporter.
//!
//! # Example
//!
//! ```ignore
//! use trade_desk::observability::{init_metrics, MetricsConfig};
//!
//! init_metrics(&MetricsConfig::default())?;
//! record_preview("trade_ticket", "accepted");
//! ```

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for gateway latency (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 9090),
            // 5ms to 10s; brokerage round trips are slow
            latency_buckets: vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        }
    }
}

impl MetricsConfig {
    /// Create a metrics configuration listening on `port`.
    #[must_use]
    pub fn with_port(port: u16) -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port),
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// Starts an HTTP listener that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Trade Workflow Metrics
// ============================================================================

/// Record the outcome of a preview request.
///
/// `outcome` is one of `accepted`, `rejected`, `invalid`, `unavailable`.
pub fn record_preview(surface: &str, outcome: &str) {
    counter!(
        "trade_previews_total",
        "surface" => surface.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record the outcome of a commit.
///
/// `outcome` is one of `placed`, `rejected`, `unconfirmed`, `abandoned`.
pub fn record_commit(surface: &str, outcome: &str) {
    counter!(
        "trade_commits_total",
        "surface" => surface.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Set the number of open workflows.
#[allow(clippy::cast_precision_loss)]
pub fn update_open_workflows(count: usize) {
    gauge!("trade_workflows_open").set(count as f64);
}

/// Record a workflow or view closed by the idle sweep.
///
/// `kind` is `workflow` or `view`.
pub fn record_idle_close(kind: &str) {
    counter!("trade_idle_closes_total", "kind" => kind.to_string()).increment(1);
}

// ============================================================================
// Order Lifecycle Metrics
// ============================================================================

/// Record the outcome of a cancel request.
pub fn record_cancel(outcome: &str) {
    counter!("order_cancels_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record one poll.
///
/// `scope` is `list`, `focus` or `quote`; `outcome` is `ok` or `error`.
pub fn record_poll(scope: &str, outcome: &str) {
    counter!(
        "order_polls_total",
        "scope" => scope.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Set the number of open order and account views.
#[allow(clippy::cast_precision_loss)]
pub fn update_open_views(count: usize) {
    gauge!("order_views_open").set(count as f64);
}

/// Record how a polled snapshot was merged.
pub fn record_snapshot_merge(outcome: &str) {
    counter!("order_snapshot_merges_total", "outcome" => outcome.to_string()).increment(1);
}

// ============================================================================
// Gateway Metrics
// ============================================================================

/// Record one gateway HTTP round trip.
pub fn record_gateway_request(operation: &str, outcome: &str, latency_seconds: f64) {
    counter!(
        "gateway_requests_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        "gateway_request_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(latency_seconds);
}
