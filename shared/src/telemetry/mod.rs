//! Telemetry bootstrap and trace context propagation.
//!
//! [`init`] installs the process-wide `tracing` subscriber: a pretty or JSON
//! fmt layer filtered by `RUST_LOG`, and an unfiltered OpenTelemetry layer
//! that exports spans to the collector over OTLP/gRPC with an always-on
//! sampler. The returned
//! [`TelemetryGuard`] flushes pending spans on shutdown.
//!
//! Propagation is not global: see [`propagation`].

pub mod propagation;
#[cfg(feature = "test-util")]
pub mod testing;

pub use propagation::{Propagator, TraceContext, TRACEPARENT_HEADER};

use crate::config::{self, ConfigError};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{SpanExporter, WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tonic::transport::Endpoint;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Default OTLP/gRPC collector endpoint.
pub const DEFAULT_COLLECTOR_ENDPOINT: &str = "http://opentelemetry-collector:4317";

/// Errors that can occur while installing telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The collector endpoint is not a valid gRPC endpoint.
    #[error("Invalid collector endpoint: {0}")]
    InvalidEndpoint(#[from] tonic::transport::Error),

    /// The OTLP span exporter could not be built.
    #[error("Failed to create trace exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),

    /// A global `tracing` subscriber was already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected 'pretty' or 'json'")),
        }
    }
}

/// Telemetry configuration.
///
/// Configuration values can be set via environment variables:
/// - `OTEL_SERVICE_NAME`: The `service.name` resource attribute
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: Collector endpoint (default: `http://opentelemetry-collector:4317`)
/// - `OTEL_EXPORT_TIMEOUT_SECS`: Timeout for one export call (default: 10)
/// - `OTEL_SHUTDOWN_TIMEOUT_SECS`: Deadline for the final flush (default: 5)
/// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name reported on every span.
    pub service_name: String,
    /// OTLP/gRPC collector endpoint.
    pub collector_endpoint: String,
    /// Timeout for establishing the collector connection.
    pub connect_timeout: Duration,
    /// Timeout for one export call.
    pub export_timeout: Duration,
    /// Deadline for flushing spans at shutdown.
    pub shutdown_timeout: Duration,
    /// Output format for log lines.
    pub log_format: LogFormat,
}

impl TelemetryConfig {
    /// Creates a configuration with defaults for the given service.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            collector_endpoint: DEFAULT_COLLECTOR_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(1),
            export_timeout: Duration::from_secs(10),
            shutdown_timeout: Duration::from_secs(5),
            log_format: LogFormat::default(),
        }
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a timeout or the log format is set but invalid.
    pub fn from_env(default_service_name: &str) -> Result<Self, ConfigError> {
        let defaults = Self::new(default_service_name);
        Ok(Self {
            service_name: config::string_var("OTEL_SERVICE_NAME", default_service_name),
            collector_endpoint: config::string_var(
                "OTEL_EXPORTER_OTLP_ENDPOINT",
                DEFAULT_COLLECTOR_ENDPOINT,
            ),
            connect_timeout: defaults.connect_timeout,
            export_timeout: config::secs_var("OTEL_EXPORT_TIMEOUT_SECS", 10)?,
            shutdown_timeout: config::secs_var("OTEL_SHUTDOWN_TIMEOUT_SECS", 5)?,
            log_format: config::parse_var("LOG_FORMAT", defaults.log_format)?,
        })
    }
}

/// Keeps the tracer provider alive and flushes it on shutdown.
#[must_use = "dropping the guard without calling shutdown loses buffered spans"]
pub struct TelemetryGuard {
    provider: SdkTracerProvider,
    shutdown_timeout: Duration,
}

impl TelemetryGuard {
    /// Flushes buffered spans and shuts the exporter down, giving up after the
    /// configured deadline.
    pub async fn shutdown(self) {
        let provider = self.provider;
        let flush = tokio::task::spawn_blocking(move || provider.shutdown());

        match tokio::time::timeout(self.shutdown_timeout, flush).await {
            Ok(Ok(Ok(()))) => tracing::info!("Trace exporter flushed"),
            Ok(Ok(Err(e))) => tracing::warn!(error = %e, "Trace exporter shutdown failed"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Trace exporter shutdown task failed"),
            Err(_) => tracing::warn!(
                timeout_secs = self.shutdown_timeout.as_secs(),
                "Trace exporter shutdown timed out"
            ),
        }
    }
}

/// Builds the log output layer.
///
/// `filter` applies to this layer only. Spans stay enabled for the other
/// layers whatever the log level, so trace export and propagation do not
/// depend on `RUST_LOG`.
pub fn log_layer<S>(format: LogFormat, filter: EnvFilter) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_filter(filter)
            .boxed(),
    }
}

/// Installs the global `tracing` subscriber with OTLP span export.
///
/// The collector connection is established lazily, so startup does not wait
/// for the collector to be reachable. Must be called from within a Tokio
/// runtime.
///
/// # Errors
///
/// Returns an error if:
/// - The collector endpoint cannot be parsed
/// - The span exporter cannot be created
/// - A global subscriber is already installed
pub fn init(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let channel = Endpoint::from_shared(config.collector_endpoint.clone())?
        .connect_timeout(config.connect_timeout)
        .connect_lazy();

    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_channel(channel)
        .with_timeout(config.export_timeout)
        .build()?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(Sampler::AlwaysOn)
        .with_resource(
            Resource::builder()
                .with_service_name(config.service_name.clone())
                .build(),
        )
        .build();

    let tracer = provider.tracer(config.service_name.clone());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(log_layer::<Registry>(config.log_format, filter))
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()?;

    tracing::info!(
        service = %config.service_name,
        collector = %config.collector_endpoint,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        provider,
        shutdown_timeout: config.shutdown_timeout,
    })
}
