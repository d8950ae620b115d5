//! Trade Desk Binary
//!
//! Serves the order-execution REST API for the dashboard's trading
//! surfaces.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin trade-desk
//! ```
//!
//! # Environment Variables
//!
//! - `TRADE_DESK_CONFIG`: Path to the YAML config (default: `config.yaml`)
//! - `BROKERAGE_MODE`, `GATEWAY_BASE_URL`, `GATEWAY_API_KEY`: interpolated
//!   into `config.yaml`
//! - `OTEL_ENABLED`: Set to `false` to disable trace export
//! - `RUST_LOG`: Log filter (default: `observability.logging.level`)

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use trade_desk::application::ports::Brokerage;
use trade_desk::application::services::{
    OrderMonitor, QuotePoller, ViewRegistry, WorkflowRegistry,
};
use trade_desk::application::use_cases::OrderLifecycleTracker;
use trade_desk::config::{BrokerageMode, Config, load_config};
use trade_desk::infrastructure::gateway::GatewayAdapter;
use trade_desk::infrastructure::http::{AppState, create_router};
use trade_desk::infrastructure::paper::PaperBrokerage;
use trade_desk::infrastructure::persistence::InMemoryOrderCache;
use trade_desk::observability::{MetricsConfig, init_metrics};
use trade_desk::telemetry::init_telemetry;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config = load_config(None).context("failed to load configuration")?;
    let _telemetry = init_telemetry(&config.observability.logging);

    tracing::info!(
        brokerage = config.brokerage.mode.as_str(),
        http_port = config.server.http_port,
        preview_ttl_secs = config.workflow.preview_ttl_secs,
        workflow_idle_timeout_secs = config.workflow.idle_timeout_secs,
        view_idle_timeout_secs = config.polling.view_idle_timeout_secs,
        "Starting trade desk"
    );

    if config.observability.metrics.enabled
        && let Err(e) = init_metrics(&MetricsConfig::with_port(config.observability.metrics.port))
    {
        tracing::warn!(error = %e, "Metrics exporter not started, continuing without it");
    }

    match config.brokerage.mode {
        BrokerageMode::Paper => {
            let brokerage = PaperBrokerage::new(config.brokerage.paper.clone());
            tracing::info!("Paper brokerage initialized; no real orders will be placed");
            serve(&config, Arc::new(brokerage)).await
        }
        BrokerageMode::Gateway => {
            let gateway = GatewayAdapter::new(&config.brokerage.gateway.to_gateway_config())
                .context("failed to create gateway adapter")?;
            tracing::info!(
                base_url = %config.brokerage.gateway.base_url,
                "Brokerage gateway adapter initialized"
            );
            serve(&config, Arc::new(gateway)).await
        }
    }
}

/// Wire the application around `brokerage` and serve until shutdown.
async fn serve<B>(config: &Config, brokerage: Arc<B>) -> anyhow::Result<()>
where
    B: Brokerage + 'static,
{
    let shutdown = CancellationToken::new();
    let cache = Arc::new(InMemoryOrderCache::new());

    let quotes = Arc::new(QuotePoller::new(
        Arc::clone(&brokerage),
        config.polling.quote_interval_ms,
        shutdown.clone(),
    ));
    let tracker = OrderLifecycleTracker::new(
        Arc::clone(&brokerage),
        Arc::clone(&cache),
        config.polling.max_lookback_days,
    );
    let monitor = Arc::new(OrderMonitor::new(
        config.polling.monitor_config(),
        tracker,
        shutdown.clone(),
    ));
    let registry = Arc::new(WorkflowRegistry::new(
        brokerage,
        cache,
        Arc::clone(&quotes),
        config.workflow.preview_ttl_secs,
    ));
    let views = Arc::new(ViewRegistry::new(Arc::clone(&monitor)));

    // Closes workflows and views a surface abandoned without closing.
    registry.spawn_idle_sweep(config.workflow.idle_timeout(), shutdown.clone());
    views.spawn_idle_sweep(config.polling.view_idle_timeout(), shutdown.clone());

    let state = AppState {
        registry,
        monitor,
        views,
        quotes,
        default_lookback_days: config.polling.default_lookback_days,
        brokerage: config.brokerage.mode.as_str().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let app = create_router(state);

    let addr = config
        .server
        .socket_addr()
        .with_context(|| format!("invalid bind address {:?}", config.server.bind_address))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "HTTP server starting");

    let server_token = shutdown.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        server_token.cancel();
    })
    .into_future();
    let drain = async {
        shutdown.cancelled().await;
        tokio::time::sleep(SHUTDOWN_TIMEOUT).await;
    };

    tokio::select! {
        result = server => result.context("HTTP server error")?,
        () = drain => tracing::warn!(
            timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
            "In-flight requests did not finish before the shutdown timeout"
        ),
    }

    // Stops every quote and order polling loop and both idle sweeps.
    shutdown.cancel();
    tracing::info!("Trade desk stopped");
    Ok(())
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// # Panics
///
/// Panics if signal handlers cannot be installed. A process that cannot
/// hear termination signals should fail at startup.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
