//! End-to-end tests running the edge against the real backend router.
//!
//! The backend is served on a local port and wired to mock geocoding and
//! weather providers, so the whole pipeline runs in-process.

use axum::http::StatusCode;
use reqwest::Url;
use serde_json::json;
use shared::telemetry::testing::SpanCapture;
use std::time::Duration;

use super::common::{
    caller_traceparent, post_json, post_raw, spawn_server, test_app, MockUpstream, CALLER_SPAN_ID,
    CALLER_TRACE_ID,
};

/// Mock providers and the backend wired to them.
struct Pipeline {
    geocoder: MockUpstream,
    weather: MockUpstream,
    backend_url: Url,
}

impl Pipeline {
    async fn start(geocoder: MockUpstream, weather: MockUpstream) -> Self {
        let config = backend::Config {
            geocode_base_url: geocoder.url("/ws/"),
            weather_base_url: weather.url("/v1/current.json"),
            weather_api_key: "test-key".to_string(),
            ..backend::Config::default()
        };
        let router = backend::create_router(backend::AppState::from_config(&config).unwrap());
        let addr = spawn_server(router).await;

        Self {
            geocoder,
            weather,
            backend_url: Url::parse(&format!("http://{addr}/")).unwrap(),
        }
    }
}

fn geocode_body(locality: &str) -> serde_json::Value {
    json!({ "cep": "01001-000", "localidade": locality, "uf": "SP" })
}

fn weather_body(temp_c: f64) -> serde_json::Value {
    json!({ "location": { "name": "Sao Paulo" }, "current": { "temp_c": temp_c } })
}

async fn healthy_pipeline() -> Pipeline {
    Pipeline::start(
        MockUpstream::json(StatusCode::OK, geocode_body("São Paulo")).await,
        MockUpstream::json(StatusCode::OK, weather_body(28.5)).await,
    )
    .await
}

#[tokio::test]
async fn test_pipeline_returns_report() {
    let pipeline = healthy_pipeline().await;
    let app = test_app(pipeline.backend_url.clone());

    let (status, body) = post_json(app, "/", json!({ "cep": "01001000" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"city":"São Paulo","temp_C":28.5,"temp_F":83.3,"temp_K":301.65}"#
    );

    let geocode = pipeline.geocoder.requests();
    assert_eq!(geocode.len(), 1);
    assert_eq!(geocode[0].path, "/ws/01001000/json/");

    let weather = pipeline.weather.requests();
    assert_eq!(weather.len(), 1);
    assert_eq!(weather[0].query["q"], "São Paulo");
    assert_eq!(weather[0].query["key"], "test-key");
}

#[tokio::test]
async fn test_unknown_cep_is_not_found() {
    let pipeline = Pipeline::start(
        MockUpstream::json(StatusCode::OK, json!({ "erro": true })).await,
        MockUpstream::json(StatusCode::OK, weather_body(28.5)).await,
    )
    .await;
    let app = test_app(pipeline.backend_url.clone());

    let (status, body) = post_json(app, "/", json!({ "cep": "99999999" })).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "can not find zipcode");
    assert_eq!(pipeline.weather.request_count(), 0);
}

#[tokio::test]
async fn test_weather_failure_is_relayed() {
    let pipeline = Pipeline::start(
        MockUpstream::json(StatusCode::OK, geocode_body("São Paulo")).await,
        MockUpstream::text(StatusCode::FORBIDDEN, "API key is invalid").await,
    )
    .await;
    let app = test_app(pipeline.backend_url.clone());

    let (status, body) = post_json(app, "/", json!({ "cep": "01001000" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "error fetching temperature");
}

#[tokio::test]
async fn test_invalid_cep_never_reaches_backend() {
    let pipeline = healthy_pipeline().await;
    let app = test_app(pipeline.backend_url.clone());

    let (status, body) = post_json(app, "/", json!({ "cep": "0100100" })).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, "invalid zipcode");
    assert_eq!(pipeline.geocoder.request_count(), 0);
    assert_eq!(pipeline.weather.request_count(), 0);
}

#[tokio::test]
async fn test_single_trace_spans_both_services() {
    let (capture, _guard) = SpanCapture::install();
    let pipeline = healthy_pipeline().await;
    let app = test_app(pipeline.backend_url.clone());

    let traceparent = caller_traceparent();
    let (status, _) = post_raw(
        app,
        "/",
        r#"{"cep":"01001000"}"#,
        &[("traceparent", traceparent.as_str())],
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The backend's server task may still be finishing its spans.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let forward = capture.span_named("forward_cep");
    let request = capture.span_named("handle_weather_request");
    let location = capture.span_named("resolve_location");
    let temperature = capture.span_named("resolve_temperature");

    for span in [&forward, &request, &location, &temperature] {
        assert_eq!(span.span_context.trace_id().to_string(), CALLER_TRACE_ID);
    }
    assert_eq!(forward.parent_span_id.to_string(), CALLER_SPAN_ID);
    assert_eq!(request.parent_span_id, forward.span_context.span_id());
    assert_eq!(location.parent_span_id, request.span_context.span_id());
    assert_eq!(temperature.parent_span_id, request.span_context.span_id());
}
