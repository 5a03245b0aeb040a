//! Temperature resolver.

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use shared::telemetry::{Propagator, TraceContext};
use thiserror::Error;
use tracing::Instrument;

/// Errors that can occur while fetching the current temperature.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The request could not be sent or the response could not be read.
    #[error("Weather request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-200 status.
    #[error("Weather provider returned status {0}")]
    ProviderStatus(StatusCode),

    /// The provider answered 200 with a body that is not JSON of the expected shape.
    #[error("Weather response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// The provider answered 200 without a numeric `current.temp_c`.
    #[error("Temperature data not found in weather response")]
    FieldMissing,
}

/// A number from a provider payload that may be encoded as an integer or a
/// float.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProviderNumber {
    /// An integral JSON number such as `28`.
    Integer(i64),
    /// A JSON number with a fraction or exponent such as `28.5`.
    Float(f64),
}

impl From<ProviderNumber> for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from(number: ProviderNumber) -> Self {
        match number {
            ProviderNumber::Integer(value) => value as f64,
            ProviderNumber::Float(value) => value,
        }
    }
}

/// `WeatherAPI` current-conditions body; only the Celsius reading is used.
#[derive(Debug, Deserialize)]
struct WeatherPayload {
    #[serde(default)]
    current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    #[serde(default)]
    temp_c: Option<ProviderNumber>,
}

impl WeatherPayload {
    fn celsius(&self) -> Option<f64> {
        self.current
            .as_ref()
            .and_then(|current| current.temp_c)
            .map(f64::from)
    }
}

/// Fetches current temperatures from the weather provider.
#[derive(Clone)]
pub struct TemperatureResolver {
    client: Client,
    base_url: Url,
    api_key: String,
    propagator: Propagator,
}

impl std::fmt::Debug for TemperatureResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemperatureResolver")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl TemperatureResolver {
    /// Creates a resolver calling `GET <base_url>?key=<api_key>&q=<locality>`.
    #[must_use]
    pub fn new(client: Client, base_url: Url, api_key: impl Into<String>, propagator: Propagator) -> Self {
        Self {
            client,
            base_url,
            api_key: api_key.into(),
            propagator,
        }
    }

    /// Fetches the current temperature in degrees Celsius for `locality`.
    ///
    /// Opens a `resolve_temperature` span as a child of `parent`, closed on
    /// every return path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request fails at the transport level
    /// - The provider answers with a non-200 status
    /// - The body is not JSON or has no numeric `current.temp_c`
    pub async fn resolve(&self, parent: &TraceContext, locality: &str) -> Result<f64, WeatherError> {
        let (span, context) = parent.start_child(tracing::info_span!(
            "resolve_temperature",
            otel.kind = "client",
            locality = %locality,
        ));

        self.fetch(&context, locality).instrument(span).await
    }

    async fn fetch(&self, context: &TraceContext, locality: &str) -> Result<f64, WeatherError> {
        tracing::debug!(url = %self.base_url, "Querying weather provider");

        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[("key", self.api_key.as_str()), ("q", locality)])
            .headers(self.propagator.headers_for(context))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(%status, "Weather provider returned an error");
            return Err(WeatherError::ProviderStatus(status));
        }

        let body = response.bytes().await?;
        let payload: WeatherPayload = serde_json::from_slice(&body)?;
        let celsius = payload.celsius().ok_or(WeatherError::FieldMissing)?;

        tracing::debug!(celsius, "Fetched current temperature");
        Ok(celsius)
    }
}
