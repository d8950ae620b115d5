//! Logging and trace export.
//!
//! Installs the `tracing` subscriber: a console layer (JSON unless
//! `observability.logging.format` is `pretty`) and, unless disabled, an
//! OTLP span exporter.
//!
//! # Environment
//!
//! - `RUST_LOG`: log filter (falls back to `observability.logging.level`)
//! - `OTEL_ENABLED`: `false` disables trace export
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP gRPC endpoint (default: `http://localhost:4317`)
//! - `OTEL_SERVICE_NAME`: service name on exported spans (default: `trade-desk`)

use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";
const DEFAULT_SERVICE_NAME: &str = "trade-desk";

/// Trace export settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    /// Whether spans are exported at all.
    pub enabled: bool,
    /// OTLP collector endpoint.
    pub endpoint: String,
    /// `service.name` on exported spans.
    pub service_name: String,
}

impl ExportSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            enabled: non_empty("OTEL_ENABLED")
                .is_none_or(|v| !v.trim().eq_ignore_ascii_case("false")),
            endpoint: non_empty("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_OTLP_ENDPOINT.to_string()),
            service_name: non_empty("OTEL_SERVICE_NAME")
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
        }
    }
}

/// Shuts down the tracer provider on drop, flushing pending spans.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("Error shutting down tracer provider: {e:?}");
        }
    }
}

fn fmt_layer<S>(logging: &LoggingConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    if logging.format.eq_ignore_ascii_case("pretty") {
        tracing_subscriber::fmt::layer().with_ansi(true).boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .boxed()
    }
}

fn filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
}

/// Install the global subscriber.
///
/// Falls back to console-only logging when export is disabled or the
/// exporter cannot be built.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
#[must_use]
pub fn init_telemetry(logging: &LoggingConfig) -> TelemetryGuard {
    let settings = ExportSettings::from_env();

    if !settings.enabled {
        Registry::default()
            .with(filter(logging))
            .with(fmt_layer(logging))
            .init();
        tracing::info!("Trace export disabled (OTEL_ENABLED=false), console logging only");
        return TelemetryGuard { provider: None };
    }

    let exporter = match opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&settings.endpoint)
        .build()
    {
        Ok(exporter) => exporter,
        Err(e) => {
            Registry::default()
                .with(filter(logging))
                .with(fmt_layer(logging))
                .init();
            tracing::warn!(error = ?e, "OTLP exporter unavailable, console logging only");
            return TelemetryGuard { provider: None };
        }
    };

    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter)
        .build();
    let tracer = provider.tracer(settings.service_name.clone());

    Registry::default()
        .with(filter(logging))
        .with(fmt_layer(logging))
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .init();

    tracing::info!(
        service_name = %settings.service_name,
        endpoint = %settings.endpoint,
        "Trace export initialized"
    );

    TelemetryGuard {
        provider: Some(provider),
    }
}
