//! Cep Weather Backend Service
//!
//! This crate provides the backend HTTP service of the Cep Weather pipeline. It
//! resolves a postal code to a locality through a geocoding provider, fetches
//! the locality's current temperature from a weather provider, and answers with
//! the temperature in Celsius, Fahrenheit and Kelvin.
//!
//! # Architecture
//!
//! ```text
//! GET /?cep=...  ->  handle_weather_request
//!                      ├── resolve_location     (geocoding provider)
//!                      └── resolve_temperature  (weather provider)
//! ```
//!
//! The caller's trace context is extracted from the inbound headers and
//! injected into both provider calls, so all spans join the caller's trace.
//!
//! # Example
//!
//! ```no_run
//! use backend::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod error;
pub mod providers;
mod routes;
mod state;

pub use config::Config;
pub use error::{BackendError, INVALID_ZIPCODE, TEMPERATURE_UNAVAILABLE, ZIPCODE_NOT_FOUND};
pub use state::AppState;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Runs the backend service.
///
/// This function loads configuration from environment variables and starts
/// listening for incoming connections. It handles graceful shutdown on
/// SIGTERM/SIGINT signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the backend service with the provided configuration.
///
/// # Errors
///
/// Returns an error if:
/// - The outbound HTTP client cannot be built
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let addr = config.socket_addr();

    tracing::info!(
        host = %config.host,
        port = %config.port,
        geocode_base_url = %config.geocode_base_url,
        weather_base_url = %config.weather_base_url,
        "Backend service starting"
    );

    if config.weather_api_key.is_empty() {
        tracing::warn!("WEATHER_API_KEY is not set, weather lookups will be rejected");
    }

    let state = AppState::from_config(&config)?;
    let app = create_router(state).layer(shared::server::request_timeout(config.request_timeout));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for connections");

    shared::server::serve(
        listener,
        app,
        config.shutdown_grace,
        shared::server::shutdown_signal(),
    )
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::weather_routes(state))
        .layer(TraceLayer::new_for_http())
}
