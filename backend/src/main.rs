//! Cep Weather Backend Binary
//!
//! Entry point for the backend service (`service-b`).

#![deny(unsafe_code)]

use anyhow::Result;
use backend::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let telemetry = shared::telemetry::init(&config.telemetry)?;

    let result = backend::run_server_with_config(config).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Backend service failed");
    }

    telemetry.shutdown().await;
    result
}
