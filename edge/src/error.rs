//! Edge error taxonomy and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Message returned for a body that is not `{"cep": <8 characters>}`.
pub const INVALID_ZIPCODE: &str = "invalid zipcode";
/// Message returned when the backend could not resolve the postal code.
pub const ZIPCODE_NOT_FOUND: &str = "can not find zipcode";

/// Errors that end an edge request.
#[derive(Debug, Error)]
pub enum EdgeError {
    /// The body did not decode or the postal code has the wrong length.
    #[error("invalid zipcode")]
    InvalidZipcode,

    /// The backend answered 404.
    #[error("can not find zipcode")]
    ZipcodeNotFound,

    /// The backend request could not be sent or its response not received.
    #[error("backend request failed: {0}")]
    Forward(#[source] reqwest::Error),

    /// The backend answered 2xx with a body that is not a temperature report.
    #[error("invalid response from backend: {0}")]
    Relay(#[source] reqwest::Error),
}

impl EdgeError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidZipcode => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ZipcodeNotFound => StatusCode::NOT_FOUND,
            Self::Forward(_) | Self::Relay(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for EdgeError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::InvalidZipcode => {
                tracing::info!("Rejected invalid zipcode");
                INVALID_ZIPCODE.to_string()
            }
            Self::ZipcodeNotFound => {
                tracing::info!("Backend could not find zipcode");
                ZIPCODE_NOT_FOUND.to_string()
            }
            Self::Forward(source) => {
                tracing::error!(error = %source, "Failed to reach backend");
                self.to_string()
            }
            Self::Relay(source) => {
                tracing::error!(error = %source, "Backend response could not be relayed");
                self.to_string()
            }
        };

        (self.status_code(), message).into_response()
    }
}
