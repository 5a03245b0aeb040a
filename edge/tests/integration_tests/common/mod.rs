//! Common test utilities and helpers for integration tests.
//!
//! This module provides recording mock upstreams, the test app setup, and
//! HTTP request helpers.

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::Query;
use axum::http::{header, HeaderMap, Method, Request, StatusCode, Uri};
use axum::Router;
use edge::{create_router, AppState, Config};
use http_body_util::BodyExt;
use reqwest::Url;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const CALLER_TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
pub const CALLER_SPAN_ID: &str = "00f067aa0ba902b7";

/// Returns the caller's `traceparent` header value.
pub fn caller_traceparent() -> String {
    format!("00-{CALLER_TRACE_ID}-{CALLER_SPAN_ID}-01")
}

/// A request received by a mock upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
}

/// An upstream answering every request with a fixed status and body.
pub struct MockUpstream {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockUpstream {
    /// Starts an upstream on an ephemeral local port.
    pub async fn start(status: StatusCode, content_type: &'static str, body: impl Into<String>) -> Self {
        let body: String = body.into();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        let router = Router::new().fallback(
            move |method: Method,
                  uri: Uri,
                  Query(query): Query<HashMap<String, String>>,
                  headers: HeaderMap| {
                let recorded = Arc::clone(&recorded);
                let body = body.clone();
                async move {
                    recorded.lock().unwrap().push(RecordedRequest {
                        method,
                        path: uri.path().to_string(),
                        query,
                        headers,
                    });
                    (status, [(header::CONTENT_TYPE, content_type)], body)
                }
            },
        );

        Self {
            addr: spawn_server(router).await,
            requests,
        }
    }

    /// Starts an upstream answering with a JSON body.
    pub async fn json(status: StatusCode, body: serde_json::Value) -> Self {
        Self::start(status, "application/json", body.to_string()).await
    }

    /// Starts an upstream answering with a plain-text body.
    pub async fn text(status: StatusCode, body: &str) -> Self {
        Self::start(status, "text/plain; charset=utf-8", body).await
    }

    /// Returns a URL on this upstream.
    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{path}", self.addr)).unwrap()
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Returns the number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Serves `router` on an ephemeral local port.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Returns a URL on a local port with nothing listening.
pub async fn unreachable_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}/")).unwrap()
}

/// Creates a test router forwarding to `backend_url`.
pub fn test_app(backend_url: Url) -> Router {
    let config = Config {
        backend_url,
        ..Config::default()
    };
    create_router(AppState::from_config(&config).unwrap())
}

/// Helper to make a POST request with a raw body and extra headers.
///
/// # Returns
///
/// A tuple containing the response status code and the response body as text.
pub async fn post_raw(
    app: Router,
    uri: &str,
    body: impl Into<Body>,
    headers: &[(&str, &str)],
) -> (StatusCode, String) {
    let mut request = Request::builder().method("POST").uri(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = tower::ServiceExt::oneshot(app, request.body(body.into()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body_bytes.to_vec()).unwrap())
}

/// Helper to make a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, String) {
    post_raw(
        app,
        uri,
        body.to_string(),
        &[(header::CONTENT_TYPE.as_str(), "application/json")],
    )
    .await
}

/// Helper to make a GET request.
pub async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body_bytes.to_vec()).unwrap())
}
