//! Integration tests for the health endpoint.

use axum::http::StatusCode;
use reqwest::Url;

use super::common::{get, test_app_with_urls};

#[tokio::test]
async fn test_health_endpoint() {
    let unused = Url::parse("http://127.0.0.1:9/").unwrap();
    let app = test_app_with_urls(unused.clone(), unused);

    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);

    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["service"], "service-b");
    assert!(health["version"].is_string());
}
