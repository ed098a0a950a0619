mod common;

use common::TestApp;
use http::{Method, StatusCode};
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_session_lifecycle() {
    let app = TestApp::new().await;
    let vendor = app.vendor("Maria").await;

    let res = app.post("/api/vendor-session", json!({ "vendor_id": vendor.id })).await;
    assert_eq!(res.status, StatusCode::CREATED);
    let body = res.json();
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["vendor"]["name"], "Maria");
    assert!(body.get("expires_at").is_none());

    let res = app.call(Method::GET, "/api/vendor-session", None, Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["vendor"]["id"], vendor.id.to_string());

    let res = app.call(Method::DELETE, "/api/vendor-session", None, Some(&token)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app.call(Method::GET, "/api/vendor-session", None, Some(&token)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.code(), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_session_requires_active_vendor() {
    let app = TestApp::new().await;
    let vendor = app.vendor("Maria").await;
    app.admin(Method::PATCH, &format!("/api/vendors/{}", vendor.id), Some(json!({ "active": false })))
        .await;

    let res = app.post("/api/vendor-session", json!({ "vendor_id": vendor.id })).await;
    assert_eq!(res.code(), "INVALID_VENDOR");

    let res = app.post("/api/vendor-session", json!({})).await;
    assert_eq!(res.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_session_expires_after_ttl() {
    let app = TestApp::with_config(|c| c.vendor_session_ttl = Some(Duration::from_millis(50))).await;
    let vendor = app.vendor("Maria").await;

    let res = app.post("/api/vendor-session", json!({ "vendor_id": vendor.id })).await;
    let body = res.json();
    assert!(body["expires_at"].is_string());
    let token = body["token"].as_str().unwrap().to_string();

    tokio::time::sleep(Duration::from_millis(80)).await;
    let res = app.call(Method::GET, "/api/vendor-session", None, Some(&token)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.code(), "SESSION_EXPIRED");

    // Expired sessions are dropped
    let res = app.call(Method::GET, "/api/vendor-session", None, Some(&token)).await;
    assert_eq!(res.code(), "UNAUTHORIZED");
}
