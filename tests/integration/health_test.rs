//! Integration tests for the HTTP surface.

use axum::http::StatusCode;

use crate::helpers;

#[tokio::test]
async fn test_health_check() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"].as_str(), Some("ok"));
    assert!(response.body["version"].is_string());
    assert_eq!(response.body["listen_addr"].as_str(), Some("127.0.0.1:0"));
    assert_eq!(response.body["metrics"]["connections_active"].as_u64(), Some(0));
    assert_eq!(response.body["metrics"]["messages_received"].as_u64(), Some(0));
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/ws").await;

    assert!(
        response.status.is_client_error(),
        "Expected a 4xx for a plain GET, got {}",
        response.status
    );
    assert_eq!(app.relay.metrics().connections_total, 0);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/anything").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
