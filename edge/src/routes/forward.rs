//! Postal code forwarding endpoint.
//!
//! `POST /` with `{"cep": "<8 characters>"}` forwards the postal code to the
//! backend as `GET <backend>?cep=...` with the trace context injected, then
//! relays the backend's answer:
//!
//! - 404 becomes 404 "can not find zipcode"
//! - 2xx is decoded as a [`TemperatureReport`] and re-encoded
//! - any other status is relayed with the backend's body text
//!
//! A body over the configured limit is answered like any other malformed body.

use crate::error::EdgeError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use shared::models::{CepInput, PostalCode, TemperatureReport};
use shared::telemetry::TraceContext;
use tracing::Instrument;

/// Creates the forwarding routes.
pub fn forward_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(forward_cep))
        .layer(DefaultBodyLimit::max(state.max_body_bytes()))
        .with_state(state)
}

async fn forward_cep(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, EdgeError> {
    let parent = state.propagator().extract(&headers);
    let (span, context) = parent.start_child(tracing::info_span!(
        "forward_cep",
        otel.kind = "server",
    ));

    async move {
        tracing::debug!(trace_id = %context.trace_id(), "Handling forward request");
        let body = body.map_err(|rejection| {
            tracing::debug!(error = %rejection, "Request body rejected");
            EdgeError::InvalidZipcode
        })?;
        let cep = parse_cep(&body)?;
        let response = forward(&state, &context, &cep).await?;
        relay(response).await
    }
    .instrument(span)
    .await
}

/// Decodes the body regardless of its content type and validates the code.
fn parse_cep(body: &[u8]) -> Result<PostalCode, EdgeError> {
    let input: CepInput = serde_json::from_slice(body).map_err(|_| EdgeError::InvalidZipcode)?;
    input
        .into_postal_code()
        .map_err(|_| EdgeError::InvalidZipcode)
}

async fn forward(
    state: &AppState,
    context: &TraceContext,
    cep: &PostalCode,
) -> Result<reqwest::Response, EdgeError> {
    tracing::debug!(backend = %state.backend_url(), %cep, "Forwarding to backend");

    state
        .client()
        .get(state.backend_url().clone())
        .query(&[("cep", cep.as_str())])
        .headers(state.propagator().headers_for(context))
        .send()
        .await
        .map_err(EdgeError::Forward)
}

async fn relay(response: reqwest::Response) -> Result<Response, EdgeError> {
    let status = response.status();
    tracing::info!(%status, "Backend responded");

    if status == StatusCode::NOT_FOUND {
        return Err(EdgeError::ZipcodeNotFound);
    }

    if status.is_success() {
        let report: TemperatureReport = response.json().await.map_err(EdgeError::Relay)?;
        return Ok((status, Json(report)).into_response());
    }

    let text = response.text().await.map_err(EdgeError::Forward)?;
    Ok((status, text).into_response())
}
