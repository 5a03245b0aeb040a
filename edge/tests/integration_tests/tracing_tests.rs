//! Integration tests for trace propagation on the forwarding hop.
//!
//! Tests cover:
//! - The request span joining the caller's trace
//! - The trace header sent to the backend carrying the request span
//! - A new trace when the caller sends no context
//! - Every opened span being closed on error paths

use axum::http::StatusCode;
use opentelemetry::trace::SpanId;
use serde_json::json;
use shared::telemetry::testing::SpanCapture;

use super::common::{
    caller_traceparent, post_raw, test_app, unreachable_url, MockUpstream, CALLER_SPAN_ID,
    CALLER_TRACE_ID,
};

fn report() -> serde_json::Value {
    json!({ "city": "São Paulo", "temp_C": 28.5, "temp_F": 83.3, "temp_K": 301.65 })
}

const VALID_BODY: &str = r#"{"cep":"01001000"}"#;

#[tokio::test]
async fn test_request_span_joins_caller_trace() {
    let (capture, _guard) = SpanCapture::install();
    let backend = MockUpstream::json(StatusCode::OK, report()).await;
    let app = test_app(backend.url("/"));

    let traceparent = caller_traceparent();
    let (status, _) = post_raw(app, "/", VALID_BODY, &[("traceparent", traceparent.as_str())]).await;
    assert_eq!(status, StatusCode::OK);

    let span = capture.span_named("forward_cep");
    assert_eq!(span.span_context.trace_id().to_string(), CALLER_TRACE_ID);
    assert_eq!(span.parent_span_id.to_string(), CALLER_SPAN_ID);
}

#[tokio::test]
async fn test_backend_request_carries_request_span() {
    let (capture, _guard) = SpanCapture::install();
    let backend = MockUpstream::json(StatusCode::OK, report()).await;
    let app = test_app(backend.url("/"));

    let traceparent = caller_traceparent();
    post_raw(app, "/", VALID_BODY, &[("traceparent", traceparent.as_str())]).await;

    let span = capture.span_named("forward_cep");
    let header = backend.requests()[0].headers["traceparent"]
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(
        header,
        format!("00-{CALLER_TRACE_ID}-{}-01", span.span_context.span_id())
    );
}

#[tokio::test]
async fn test_request_without_caller_context_starts_new_trace() {
    let (capture, _guard) = SpanCapture::install();
    let backend = MockUpstream::json(StatusCode::OK, report()).await;
    let app = test_app(backend.url("/"));

    let (status, _) = post_raw(app, "/", VALID_BODY, &[]).await;
    assert_eq!(status, StatusCode::OK);

    let span = capture.span_named("forward_cep");
    assert!(span.span_context.is_valid());
    assert_eq!(span.parent_span_id, SpanId::INVALID);

    let header = backend.requests()[0].headers["traceparent"]
        .to_str()
        .unwrap()
        .to_string();
    assert!(header.contains(&span.span_context.trace_id().to_string()));
}

#[tokio::test]
async fn test_malformed_caller_context_is_ignored() {
    let (capture, _guard) = SpanCapture::install();
    let backend = MockUpstream::json(StatusCode::OK, report()).await;
    let app = test_app(backend.url("/"));

    let (status, _) = post_raw(app, "/", VALID_BODY, &[("traceparent", "garbage")]).await;
    assert_eq!(status, StatusCode::OK);

    let span = capture.span_named("forward_cep");
    assert!(span.span_context.is_valid());
    assert_eq!(span.parent_span_id, SpanId::INVALID);
}

#[tokio::test]
async fn test_spans_close_on_invalid_input() {
    let (capture, _guard) = SpanCapture::install();
    let backend = MockUpstream::json(StatusCode::OK, report()).await;
    let app = test_app(backend.url("/"));

    let (status, _) = post_raw(app, "/", r#"{"cep":"123"}"#, &[]).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(capture.spans_named("forward_cep").len(), 1);
    assert_eq!(capture.opened(), capture.closed());
}

#[tokio::test]
async fn test_spans_close_on_not_found() {
    let (capture, _guard) = SpanCapture::install();
    let backend = MockUpstream::text(StatusCode::NOT_FOUND, "can not find zipcode").await;
    let app = test_app(backend.url("/"));

    let (status, _) = post_raw(app, "/", VALID_BODY, &[]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(capture.spans_named("forward_cep").len(), 1);
    assert_eq!(capture.opened(), capture.closed());
}

#[tokio::test]
async fn test_spans_close_on_transport_failure() {
    let (capture, _guard) = SpanCapture::install();
    let app = test_app(unreachable_url().await);

    let (status, _) = post_raw(app, "/", VALID_BODY, &[]).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(capture.spans_named("forward_cep").len(), 1);
    assert_eq!(capture.opened(), capture.closed());
}

#[tokio::test]
async fn test_trace_propagates_when_logs_are_filtered() {
    let (capture, _guard) = SpanCapture::install_with_log_filter("warn");
    let backend = MockUpstream::json(StatusCode::OK, report()).await;
    let app = test_app(backend.url("/"));

    let traceparent = caller_traceparent();
    let (status, _) = post_raw(app, "/", VALID_BODY, &[("traceparent", traceparent.as_str())]).await;
    assert_eq!(status, StatusCode::OK);

    let span = capture.span_named("forward_cep");
    assert_eq!(span.span_context.trace_id().to_string(), CALLER_TRACE_ID);

    let header = backend.requests()[0]
        .headers
        .get("traceparent")
        .expect("backend request carries a trace parent")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(
        header,
        format!("00-{CALLER_TRACE_ID}-{}-01", span.span_context.span_id())
    );
}

#[tokio::test]
async fn test_spans_close_on_oversized_body() {
    let (capture, _guard) = SpanCapture::install();
    let backend = MockUpstream::json(StatusCode::OK, report()).await;
    let app = test_app(backend.url("/"));

    let body = format!(r#"{{"cep":"{}"}}"#, "1".repeat(64 * 1024));
    let (status, _) = post_raw(app, "/", body, &[]).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(capture.spans_named("forward_cep").len(), 1);
    assert_eq!(capture.opened(), capture.closed());
}
