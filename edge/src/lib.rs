//! Cep Weather Edge Service
//!
//! This crate provides the public entry point of the Cep Weather pipeline. It
//! validates a postal code received as `POST / {"cep": "..."}` and forwards it
//! to the backend service, relaying the backend's answer to the caller.
//!
//! # Architecture
//!
//! ```text
//! POST /  ->  forward_cep  ->  GET <backend>/?cep=...  (traceparent injected)
//! ```
//!
//! A caller-supplied trace context is continued; otherwise the request span
//! starts a new trace.
//!
//! # Example
//!
//! ```no_run
//! use edge::run_server;
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
mod routes;
mod state;

pub use config::Config;
pub use error::{EdgeError, INVALID_ZIPCODE, ZIPCODE_NOT_FOUND};
pub use state::AppState;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Runs the edge service.
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

/// Runs the edge service with the provided configuration.
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
        backend_url = %config.backend_url,
        "Edge service starting"
    );

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
        .merge(routes::forward_routes(state))
        .layer(TraceLayer::new_for_http())
}
