//! Application state module.
//!
//! Holds the resolvers handed to the request handler. Everything is built once
//! at startup from [`Config`] and is immutable afterwards.

use crate::config::Config;
use crate::providers::{GeocodeResolver, TemperatureResolver};
use anyhow::Result;
use shared::telemetry::Propagator;
use std::sync::Arc;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    geocoder: GeocodeResolver,
    weather: TemperatureResolver,
    propagator: Propagator,
}

impl AppState {
    /// Creates a new application state from already constructed resolvers.
    #[must_use]
    pub fn new(geocoder: GeocodeResolver, weather: TemperatureResolver, propagator: Propagator) -> Self {
        Self {
            inner: Arc::new(Inner {
                geocoder,
                weather,
                propagator,
            }),
        }
    }

    /// Builds the outbound HTTP client and both resolvers from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;
        let propagator = Propagator::new();

        let geocoder = GeocodeResolver::new(
            client.clone(),
            config.geocode_base_url.clone(),
            propagator.clone(),
        );
        let weather = TemperatureResolver::new(
            client,
            config.weather_base_url.clone(),
            config.weather_api_key.clone(),
            propagator.clone(),
        );

        Ok(Self::new(geocoder, weather, propagator))
    }

    /// Returns the geocode resolver.
    #[must_use]
    pub fn geocoder(&self) -> &GeocodeResolver {
        &self.inner.geocoder
    }

    /// Returns the temperature resolver.
    #[must_use]
    pub fn weather(&self) -> &TemperatureResolver {
        &self.inner.weather
    }

    /// Returns the trace context propagator.
    #[must_use]
    pub fn propagator(&self) -> &Propagator {
        &self.inner.propagator
    }
}
