//! Application state module.
//!
//! Holds the outbound client, backend endpoint and body limit used by the
//! forward handler.
//! Built once at startup from [`Config`] and immutable afterwards.

use crate::config::Config;
use anyhow::Result;
use reqwest::{Client, Url};
use shared::telemetry::Propagator;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    client: Client,
    backend_url: Url,
    propagator: Propagator,
    max_body_bytes: usize,
}

impl AppState {
    /// Creates a new application state.
    #[must_use]
    pub fn new(
        client: Client,
        backend_url: Url,
        propagator: Propagator,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            client,
            backend_url,
            propagator,
            max_body_bytes,
        }
    }

    /// Builds the outbound HTTP client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.upstream_timeout).build()?;
        Ok(Self::new(
            client,
            config.backend_url.clone(),
            Propagator::new(),
            config.max_body_bytes,
        ))
    }

    /// Returns the outbound HTTP client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Returns the backend endpoint.
    #[must_use]
    pub fn backend_url(&self) -> &Url {
        &self.backend_url
    }

    /// Returns the largest accepted request body in bytes.
    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Returns the trace context propagator.
    #[must_use]
    pub fn propagator(&self) -> &Propagator {
        &self.propagator
    }
}
