mod common;

use axum::body::Body;
use common::TestApp;
use http::{Method, Request, StatusCode, header};
use pastel_server::live::CatalogEvent;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = TestApp::new().await;

    let res = app.post("/api/flavors", json!({ "name": "Carne" })).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["error"], true);

    let res = app
        .call(Method::PATCH, "/api/settings", Some(json!({ "pastel_price_cents": 1 })), Some("bogus"))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    // Reads stay public
    assert_eq!(app.get("/api/flavors").await.status, StatusCode::OK);
    assert_eq!(app.get("/api/settings").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_flavor_name_unique_among_active() {
    let app = TestApp::new().await;

    let res = app.admin(Method::POST, "/api/flavors", Some(json!({ "name": " Carne " }))).await;
    assert_eq!(res.status, StatusCode::CREATED);
    let first = res.json()["flavor"].clone();
    assert_eq!(first["name"], "Carne");
    assert_eq!(first["price_cents"], 500);

    let res = app.admin(Method::POST, "/api/flavors", Some(json!({ "name": "carne" }))).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), "DUPLICATE_NAME");

    // Only an inactive namesake left: allowed
    let first_uri = format!("/api/flavors/{}", first["id"].as_str().unwrap());
    app.admin(Method::PATCH, &first_uri, Some(json!({ "active": false }))).await;
    let res = app.admin(Method::POST, "/api/flavors", Some(json!({ "name": "CARNE" }))).await;
    assert_eq!(res.status, StatusCode::CREATED);

    // Reactivating the old one would collide
    let res = app.admin(Method::PATCH, &first_uri, Some(json!({ "active": true }))).await;
    assert_eq!(res.code(), "DUPLICATE_NAME");
}

#[tokio::test]
async fn test_flavor_validation() {
    let app = TestApp::new().await;

    let res = app.admin(Method::POST, "/api/flavors", Some(json!({ "name": "A" }))).await;
    assert_eq!(res.code(), "VALIDATION_ERROR");

    let res = app
        .admin(Method::POST, "/api/flavors", Some(json!({ "name": "Pizza", "price_cents": -1 })))
        .await;
    assert_eq!(res.code(), "VALIDATION_ERROR");

    let res = app
        .admin(Method::POST, "/api/flavors", Some(json!({ "name": "Pizza", "price_cents": 650 })))
        .await;
    assert_eq!(res.json()["flavor"]["price_cents"], 650);

    let res = app
        .admin(Method::PATCH, &format!("/api/flavors/{}", uuid::Uuid::new_v4()), Some(json!({ "name": "Nova" })))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_new_flavor_defaults_to_current_price() {
    let app = TestApp::new().await;
    app.set_price(800).await;

    let res = app.admin(Method::POST, "/api/flavors", Some(json!({ "name": "Frango" }))).await;
    assert_eq!(res.json()["flavor"]["price_cents"], 800);
}

#[tokio::test]
async fn test_delete_soft_when_referenced_hard_otherwise() {
    let app = TestApp::new().await;
    let vendor = app.vendor("Maria").await;
    let sold = app.flavor("Carne").await;
    let unsold = app.flavor("Queijo").await;
    app.order_id(&vendor, &[(&sold, 1)], false).await;

    let res = app.admin(Method::DELETE, &format!("/api/flavors/{}", sold.id), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["outcome"], "deactivated");
    assert_eq!(res.json()["flavor"]["active"], false);

    let res = app.admin(Method::DELETE, &format!("/api/flavors/{}", unsold.id), None).await;
    assert_eq!(res.json()["outcome"], "deleted");

    let all = app.get("/api/flavors").await.json();
    let names: Vec<&str> = all["flavors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Carne"]);

    let active = app.get("/api/flavors?active_only=true").await.json();
    assert!(active["flavors"].as_array().unwrap().is_empty());

    let res = app.admin(Method::DELETE, &format!("/api/flavors/{}", unsold.id), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_changes_are_published() {
    let app = TestApp::new().await;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let subscription = app.state.hub.subscribe(move |event| sink.lock().push(event));

    app.admin(Method::POST, "/api/flavors", Some(json!({ "name": "Carne" }))).await;
    app.set_price(600).await;
    assert_eq!(*seen.lock(), vec![CatalogEvent::FlavorsChanged, CatalogEvent::SettingsChanged]);

    assert!(subscription.cancel());
    assert!(!subscription.cancel());
    app.set_price(650).await;
    assert_eq!(seen.lock().len(), 2);
}

#[tokio::test]
async fn test_catalog_lists_active_flavors_and_price() {
    let app = TestApp::new().await;
    app.flavor("Queijo").await;
    app.flavor("Carne").await;
    let hidden = app.flavor("Palmito").await;
    app.admin(Method::PATCH, &format!("/api/flavors/{}", hidden.id), Some(json!({ "active": false })))
        .await;
    app.set_price(550).await;

    let res = app.get("/api/catalog").await;
    assert_eq!(res.headers[header::CACHE_CONTROL], "no-store");
    let body = res.json();
    assert_eq!(body["unit_price_cents"], 550);
    let names: Vec<&str> = body["flavors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Carne", "Queijo"]);
}

#[tokio::test]
async fn test_vendor_admin() {
    let app = TestApp::new().await;

    let res = app
        .admin(Method::POST, "/api/vendors", Some(json!({ "name": "João", "phone": "11-9998-7766" })))
        .await;
    assert_eq!(res.code(), "VALIDATION_ERROR");

    let res = app
        .admin(Method::POST, "/api/vendors", Some(json!({ "name": "João", "phone": "11999887766" })))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.json()["vendor"]["id"].as_str().unwrap().to_string();

    let res = app.admin(Method::POST, "/api/vendors", Some(json!({ "name": "joão" }))).await;
    assert_eq!(res.code(), "DUPLICATE_NAME");

    let res = app
        .admin(Method::PATCH, &format!("/api/vendors/{id}"), Some(json!({ "phone": null, "active": false })))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["vendor"]["phone"], serde_json::Value::Null);

    let active = app.get("/api/vendors").await.json();
    assert!(active["vendors"].as_array().unwrap().is_empty());
    let all = app.get("/api/vendors?include_inactive=true").await.json();
    assert_eq!(all["vendors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_settings_update_and_clear() {
    let app = TestApp::new().await;

    let res = app
        .admin(Method::PATCH, "/api/settings", Some(json!({ "pix_key_text": " chave@pix " })))
        .await;
    assert_eq!(res.json()["settings"]["pix_key_text"], "chave@pix");

    let res = app.admin(Method::PATCH, "/api/settings", Some(json!({ "pix_key_text": "" }))).await;
    assert_eq!(res.json()["settings"]["pix_key_text"], serde_json::Value::Null);

    let res = app
        .admin(Method::PATCH, "/api/settings", Some(json!({ "pastel_price_cents": -10 })))
        .await;
    assert_eq!(res.code(), "VALIDATION_ERROR");

    let res = app.get("/api/settings").await.json();
    assert_eq!(res["settings"]["pastel_price_cents"], 500);
    assert_eq!(res["settings"]["id"], 1);
}

fn multipart(content_type: &str, file_name: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "pastel-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

async fn upload(app: &TestApp, content_type: &str, file_name: &str, bytes: &[u8]) -> common::TestResponse {
    let (header_value, body) = multipart(content_type, file_name, bytes);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/settings/upload-qr")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.admin_token))
        .header(header::CONTENT_TYPE, header_value)
        .body(Body::from(body))
        .unwrap();
    app.send(request).await
}

#[tokio::test]
async fn test_qr_upload_and_serve() {
    let app = TestApp::new().await;
    let png = b"\x89PNG\r\n\x1a\nfake";

    let res = upload(&app, "image/png", "qr.png", png).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.json());
    let body = res.json();
    let path = body["path"].as_str().unwrap();
    assert!(path.starts_with("qr-codes/pix-qr-code-"));
    assert!(path.ends_with(".png"));
    assert_eq!(body["url"], format!("http://localhost/assets/{path}"));

    let served = app.get(&format!("/assets/{path}")).await;
    assert_eq!(served.status, StatusCode::OK);
    assert_eq!(served.headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(served.body, png);

    // Saving the path exposes the URL on settings and catalog
    app.admin(Method::PATCH, "/api/settings", Some(json!({ "pix_qr_image_path": path })))
        .await;
    let catalog = app.get("/api/catalog").await.json();
    assert_eq!(catalog["pix_qr_url"], body["url"]);
}

#[tokio::test]
async fn test_qr_upload_rejects_bad_files() {
    let app = TestApp::new().await;

    let res = upload(&app, "text/plain", "qr.txt", b"hello").await;
    assert_eq!(res.code(), "VALIDATION_ERROR");

    let big = vec![0u8; 2 * 1024 * 1024 + 1];
    let res = upload(&app, "image/png", "qr.png", &big).await;
    assert_eq!(res.code(), "VALIDATION_ERROR");

    assert_eq!(app.get("/assets/qr-codes/missing.png").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let res = app.get("/health").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "ok");
    assert!(res.headers.contains_key("x-request-id"));
}
