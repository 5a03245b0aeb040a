//! Backend error taxonomy and its HTTP mapping.

use crate::providers::{GeocodeError, WeatherError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Message returned for a postal code of the wrong shape.
pub const INVALID_ZIPCODE: &str = "invalid zipcode";
/// Message returned when the postal code cannot be resolved.
pub const ZIPCODE_NOT_FOUND: &str = "can not find zipcode";
/// Message returned when the temperature cannot be fetched.
pub const TEMPERATURE_UNAVAILABLE: &str = "error fetching temperature";

/// Errors that end a backend request.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The `cep` query parameter is missing or not exactly eight characters.
    #[error("invalid zipcode")]
    InvalidZipcode,

    /// The geocoding step failed.
    #[error("can not find zipcode: {0}")]
    ZipcodeNotFound(#[source] GeocodeError),

    /// The weather step failed.
    #[error("error fetching temperature: {0}")]
    Temperature(#[source] WeatherError),
}

impl BackendError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidZipcode => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ZipcodeNotFound(_) => StatusCode::NOT_FOUND,
            Self::Temperature(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the fixed message sent to the caller.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidZipcode => INVALID_ZIPCODE,
            Self::ZipcodeNotFound(_) => ZIPCODE_NOT_FOUND,
            Self::Temperature(_) => TEMPERATURE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        match &self {
            Self::InvalidZipcode => tracing::info!("Rejected invalid zipcode"),
            Self::ZipcodeNotFound(source) if source.is_unresolved() => {
                tracing::info!(error = %source, "Zipcode could not be resolved");
            }
            Self::ZipcodeNotFound(source) => {
                tracing::warn!(error = %source, "Geocoding provider unavailable");
            }
            Self::Temperature(source) => {
                tracing::error!(error = %source, "Failed to fetch temperature");
            }
        }

        (self.status_code(), self.message()).into_response()
    }
}
