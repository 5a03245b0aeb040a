//! Cep Weather Edge Binary
//!
//! Entry point for the edge service (`service-a`).

#![deny(unsafe_code)]

use anyhow::Result;
use edge::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let telemetry = shared::telemetry::init(&config.telemetry)?;

    let result = edge::run_server_with_config(config).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Edge service failed");
    }

    telemetry.shutdown().await;
    result
}
