//! Shared harness: in-memory store, temp blob dir, oneshot requests

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use pastel_server::auth::create_token;
use pastel_server::db::{MemoryStore, Store};
use pastel_server::{AppState, Config, build_app};
use serde_json::Value;
use shared::models::{Flavor, Vendor};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub admin_token: String,
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    /// `code` of an error body
    pub fn code(&self) -> String {
        self.json()["code"].as_str().unwrap_or_default().to_string()
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(tweak: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::for_tests(dir.path().to_path_buf());
        tweak(&mut config);

        let store = Arc::new(MemoryStore::new());
        let state = AppState::with_store(&config, store.clone()).await.unwrap();
        let admin_token = create_token("admin-1", Some("admin@pastel.app"), &config.admin_jwt_secret).unwrap();

        Self {
            app: build_app(state.clone()),
            state,
            store,
            admin_token,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        TestResponse { status, headers, body }
    }

    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.call(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.call(Method::POST, uri, Some(body), None).await
    }

    pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        self.call(method, uri, body, Some(&self.admin_token)).await
    }

    // ── Seeding through the store ──

    pub async fn vendor(&self, name: &str) -> Vendor {
        self.store.insert_vendor(name, None).await.unwrap()
    }

    pub async fn flavor(&self, name: &str) -> Flavor {
        self.store.insert_flavor(name, 500).await.unwrap()
    }

    pub async fn set_price(&self, cents: i64) {
        let res = self
            .admin(Method::PATCH, "/api/settings", Some(serde_json::json!({ "pastel_price_cents": cents })))
            .await;
        assert_eq!(res.status, StatusCode::OK, "{}", res.json());
    }

    /// Submit an order through the API; returns the response
    pub async fn order(&self, vendor: &Vendor, lines: &[(&Flavor, u32)], mark_as_paid: bool) -> TestResponse {
        let items: Vec<Value> = lines
            .iter()
            .map(|(flavor, qty)| serde_json::json!({ "flavor_id": flavor.id, "quantity": qty }))
            .collect();
        self.post(
            "/api/orders",
            serde_json::json!({
                "vendor_id": vendor.id,
                "customer": { "name": "Cliente", "phone": "11999887766" },
                "items": items,
                "payment_method": "PIX",
                "mark_as_paid": mark_as_paid,
            }),
        )
        .await
    }

    /// Submit an order and return its id
    pub async fn order_id(&self, vendor: &Vendor, lines: &[(&Flavor, u32)], mark_as_paid: bool) -> String {
        let res = self.order(vendor, lines, mark_as_paid).await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.json());
        res.json()["order_id"].as_str().unwrap().to_string()
    }
}
