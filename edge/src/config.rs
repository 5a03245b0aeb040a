//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::Result;
use reqwest::Url;
use shared::config;
use shared::server::DEFAULT_SHUTDOWN_GRACE;
use shared::telemetry::TelemetryConfig;
use std::net::SocketAddr;
use std::time::Duration;

/// Default backend endpoint.
pub const DEFAULT_BACKEND_URL: &str = "http://service-b:8000/";

/// Edge service configuration.
///
/// Configuration values can be set via environment variables:
/// - `EDGE_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `EDGE_PORT`: The port to listen on (default: 8080)
/// - `BACKEND_URL`: Backend endpoint receiving `?cep=` (default: `http://service-b:8000/`)
/// - `UPSTREAM_TIMEOUT_SECS`: Timeout for the backend call (default: 10)
/// - `REQUEST_TIMEOUT_SECS`: Deadline for a whole inbound request (default: 15)
/// - `SHUTDOWN_GRACE_SECS`: Drain period for in-flight requests (default: 30)
/// - `MAX_BODY_BYTES`: Largest accepted request body (default: 16384)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Backend endpoint the postal code is forwarded to.
    pub backend_url: Url,
    /// Timeout applied to the backend call.
    pub upstream_timeout: Duration,
    /// Deadline for handling one inbound request.
    pub request_timeout: Duration,
    /// Time given to in-flight requests once shutdown starts.
    pub shutdown_grace: Duration,
    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
    /// Logging and trace export settings.
    pub telemetry: TelemetryConfig,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: config::string_var("EDGE_HOST", "0.0.0.0"),
            port: config::parse_var("EDGE_PORT", 8080)?,
            backend_url: config::url_var("BACKEND_URL", DEFAULT_BACKEND_URL)?,
            upstream_timeout: config::secs_var("UPSTREAM_TIMEOUT_SECS", 10)?,
            request_timeout: config::secs_var("REQUEST_TIMEOUT_SECS", 15)?,
            shutdown_grace: config::secs_var("SHUTDOWN_GRACE_SECS", DEFAULT_SHUTDOWN_GRACE.as_secs())?,
            max_body_bytes: config::parse_var("MAX_BODY_BYTES", 16 * 1024)?,
            telemetry: TelemetryConfig::from_env("service-a")?,
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Panics
    ///
    /// Panics if the host and port combination cannot be parsed as a valid socket address.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address from config")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            backend_url: Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL is valid"),
            upstream_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(15),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            max_body_bytes: 16 * 1024,
            telemetry: TelemetryConfig::new("service-a"),
        }
    }
}
