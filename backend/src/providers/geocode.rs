//! Geocode resolver.

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use shared::models::PostalCode;
use shared::telemetry::{Propagator, TraceContext};
use thiserror::Error;
use tracing::Instrument;

/// Errors that can occur while resolving a postal code to a locality.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The request could not be sent or the response could not be read.
    #[error("Geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-200 status.
    #[error("Geocoding lookup failed with status {0}")]
    LookupFailed(StatusCode),

    /// The provider answered 200 with a body that is not JSON.
    #[error("Geocoding response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// The provider answered 200 without a locality.
    #[error("Locality not found in geocoding response")]
    LocalityNotFound,

    /// The configured base URL cannot take path segments.
    #[error("Geocoding base URL cannot be a base: {0}")]
    InvalidBaseUrl(Url),
}

impl GeocodeError {
    /// Returns true when the provider was reached but could not resolve the code.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::LookupFailed(_) | Self::LocalityNotFound)
    }
}

/// `ViaCEP` response body. An unknown code is answered `{"erro": true}`.
#[derive(Debug, Deserialize)]
struct GeocodePayload {
    #[serde(default)]
    localidade: Option<String>,
}

/// Resolves postal codes to locality names through the geocoding provider.
#[derive(Debug, Clone)]
pub struct GeocodeResolver {
    client: Client,
    base_url: Url,
    propagator: Propagator,
}

impl GeocodeResolver {
    /// Creates a resolver calling `GET <base_url>/<cep>/json/`.
    #[must_use]
    pub fn new(client: Client, base_url: Url, propagator: Propagator) -> Self {
        Self {
            client,
            base_url,
            propagator,
        }
    }

    /// Resolves `cep` to a locality name.
    ///
    /// Opens a `resolve_location` span as a child of `parent`, closed on every
    /// return path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request fails at the transport level
    /// - The provider answers with a non-200 status
    /// - The body is not JSON or carries no locality
    pub async fn resolve(&self, parent: &TraceContext, cep: &PostalCode) -> Result<String, GeocodeError> {
        let (span, context) = parent.start_child(tracing::info_span!(
            "resolve_location",
            otel.kind = "client",
            cep = %cep,
        ));

        self.lookup(&context, cep).instrument(span).await
    }

    async fn lookup(&self, context: &TraceContext, cep: &PostalCode) -> Result<String, GeocodeError> {
        let url = self.lookup_url(cep)?;
        tracing::debug!(%url, "Querying geocoding provider");

        let response = self
            .client
            .get(url)
            .headers(self.propagator.headers_for(context))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(%status, "Geocoding provider rejected lookup");
            return Err(GeocodeError::LookupFailed(status));
        }

        let body = response.bytes().await?;
        let payload: GeocodePayload = serde_json::from_slice(&body)?;

        match payload.localidade {
            Some(locality) if !locality.trim().is_empty() => {
                tracing::debug!(%locality, "Resolved locality");
                Ok(locality)
            }
            _ => Err(GeocodeError::LocalityNotFound),
        }
    }

    fn lookup_url(&self, cep: &PostalCode) -> Result<Url, GeocodeError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GeocodeError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend([cep.as_str(), "json", ""]);
        Ok(url)
    }
}
