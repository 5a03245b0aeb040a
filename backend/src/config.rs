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

/// Default geocoding provider base URL (`ViaCEP`).
pub const DEFAULT_GEOCODE_BASE_URL: &str = "http://viacep.com.br/ws/";

/// Default weather provider endpoint (`WeatherAPI` current conditions).
pub const DEFAULT_WEATHER_BASE_URL: &str = "http://api.weatherapi.com/v1/current.json";

/// Backend service configuration.
///
/// Configuration values can be set via environment variables:
/// - `BACKEND_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `BACKEND_PORT`: The port to listen on (default: 8000)
/// - `GEOCODE_BASE_URL`: Geocoding provider base URL
/// - `WEATHER_BASE_URL`: Weather provider endpoint
/// - `WEATHER_API_KEY`: Weather provider API key
/// - `UPSTREAM_TIMEOUT_SECS`: Timeout for each provider call (default: 10)
/// - `REQUEST_TIMEOUT_SECS`: Deadline for a whole inbound request (default: 15)
/// - `SHUTDOWN_GRACE_SECS`: Drain period for in-flight requests (default: 30)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Base URL of the geocoding provider; the postal code is appended as a path segment.
    pub geocode_base_url: Url,
    /// Endpoint of the weather provider.
    pub weather_base_url: Url,
    /// API key sent to the weather provider.
    pub weather_api_key: String,
    /// Timeout applied to every outbound provider call.
    pub upstream_timeout: Duration,
    /// Deadline for handling one inbound request.
    pub request_timeout: Duration,
    /// Time given to in-flight requests once shutdown starts.
    pub shutdown_grace: Duration,
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
            host: config::string_var("BACKEND_HOST", "0.0.0.0"),
            port: config::parse_var("BACKEND_PORT", 8000)?,
            geocode_base_url: config::url_var("GEOCODE_BASE_URL", DEFAULT_GEOCODE_BASE_URL)?,
            weather_base_url: config::url_var("WEATHER_BASE_URL", DEFAULT_WEATHER_BASE_URL)?,
            weather_api_key: config::string_var("WEATHER_API_KEY", ""),
            upstream_timeout: config::secs_var("UPSTREAM_TIMEOUT_SECS", 10)?,
            request_timeout: config::secs_var("REQUEST_TIMEOUT_SECS", 15)?,
            shutdown_grace: config::secs_var("SHUTDOWN_GRACE_SECS", DEFAULT_SHUTDOWN_GRACE.as_secs())?,
            telemetry: TelemetryConfig::from_env("service-b")?,
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
            port: 8000,
            geocode_base_url: Url::parse(DEFAULT_GEOCODE_BASE_URL)
                .expect("default geocode URL is valid"),
            weather_base_url: Url::parse(DEFAULT_WEATHER_BASE_URL)
                .expect("default weather URL is valid"),
            weather_api_key: String::new(),
            upstream_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(15),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            telemetry: TelemetryConfig::new("service-b"),
        }
    }
}
