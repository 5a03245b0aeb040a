//! Postal code to temperature endpoint.
//!
//! `GET /?cep=<8 chars>` resolves the postal code to a locality, fetches the
//! locality's current temperature and answers with a [`TemperatureReport`].
//! The geocoding call always completes before the weather call starts.

use crate::error::BackendError;
use crate::state::AppState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use shared::models::{CepInput, TemperatureReport};
use shared::telemetry::TraceContext;
use tracing::Instrument;

/// Creates the weather routes.
pub fn weather_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_weather))
        .with_state(state)
}

async fn get_weather(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<CepInput>, QueryRejection>,
) -> Result<Json<TemperatureReport>, BackendError> {
    let parent = state.propagator().extract(&headers);
    let (span, context) = parent.start_child(tracing::info_span!(
        "handle_weather_request",
        otel.kind = "server",
    ));

    async move {
        tracing::debug!(trace_id = %context.trace_id(), "Handling weather request");
        let Query(input) = query.map_err(|_| BackendError::InvalidZipcode)?;
        let report = resolve_report(&state, &context, input).await?;
        tracing::info!(city = %report.city, temp_c = report.temp_c, "Temperature resolved");
        Ok(Json(report))
    }
    .instrument(span)
    .await
}

async fn resolve_report(
    state: &AppState,
    context: &TraceContext,
    input: CepInput,
) -> Result<TemperatureReport, BackendError> {
    let cep = input
        .into_postal_code()
        .map_err(|_| BackendError::InvalidZipcode)?;

    let locality = state
        .geocoder()
        .resolve(context, &cep)
        .await
        .map_err(BackendError::ZipcodeNotFound)?;

    let celsius = state
        .weather()
        .resolve(context, &locality)
        .await
        .map_err(BackendError::Temperature)?;

    Ok(TemperatureReport::from_celsius(locality, celsius))
}
