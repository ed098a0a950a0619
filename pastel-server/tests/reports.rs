mod common;

use chrono::{Duration, TimeZone, Utc};
use common::TestApp;
use http::{Method, StatusCode};
use pastel_server::db::FailPoint;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_admin_reports_paginate_newest_first() {
    let app = TestApp::new().await;
    let vendor = app.vendor("Maria").await;
    let carne = app.flavor("Carne").await;

    let mut ids = Vec::new();
    for minutes in [30, 20, 10] {
        let id = app.order_id(&vendor, &[(&carne, 1)], true).await;
        app.store
            .set_order_created_at(Uuid::parse_str(&id).unwrap(), Utc::now() - Duration::minutes(minutes));
        ids.push(id);
    }

    let res = app.admin(Method::GET, "/api/admin-reports?limit=2", None).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["total_count"], 3);
    assert_eq!(body["limit"], 2);
    let sales = body["sales"].as_array().unwrap();
    assert_eq!(sales.len(), 2);
    assert_eq!(sales[0]["id"], ids[2].as_str());
    assert_eq!(sales[1]["id"], ids[1].as_str());
    assert_eq!(sales[0]["vendor_name"], "Maria");
    assert_eq!(sales[0]["customer_name"], "Cliente");

    let res = app.admin(Method::GET, "/api/admin-reports?limit=2&offset=2", None).await;
    let sales = res.json()["sales"].as_array().unwrap().clone();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0]["id"], ids[0].as_str());
}

#[tokio::test]
async fn test_admin_reports_filters_apply_to_count() {
    let app = TestApp::new().await;
    let maria = app.vendor("Maria").await;
    let joao = app.vendor("João").await;
    let carne = app.flavor("Carne").await;
    let queijo = app.flavor("Queijo").await;

    app.order_id(&maria, &[(&carne, 1)], true).await;
    app.order_id(&maria, &[(&queijo, 2)], true).await;
    app.order_id(&joao, &[(&queijo, 1), (&carne, 1)], true).await;

    let res = app
        .admin(Method::GET, &format!("/api/admin-reports?flavor_id={}", queijo.id), None)
        .await;
    assert_eq!(res.json()["total_count"], 2);

    let res = app
        .admin(Method::GET, &format!("/api/admin-reports?vendor_id={}", maria.id), None)
        .await;
    assert_eq!(res.json()["total_count"], 2);

    let res = app.admin(Method::GET, "/api/admin-reports?search=MARIA", None).await;
    assert_eq!(res.json()["total_count"], 2);

    let res = app.admin(Method::GET, "/api/admin-reports?search=queijo", None).await;
    assert_eq!(res.json()["total_count"], 2);

    let res = app.admin(Method::GET, "/api/admin-reports?vendor_id=nope", None).await;
    assert_eq!(res.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_end_date_is_inclusive_local_day() {
    let app = TestApp::new().await;
    let vendor = app.vendor("Maria").await;
    let carne = app.flavor("Carne").await;

    // 2024-03-10 23:30 in São Paulo is 2024-03-11 02:30 UTC
    let late = app.order_id(&vendor, &[(&carne, 1)], true).await;
    app.store.set_order_created_at(
        Uuid::parse_str(&late).unwrap(),
        Utc.with_ymd_and_hms(2024, 3, 11, 2, 30, 0).unwrap(),
    );
    let next_day = app.order_id(&vendor, &[(&carne, 1)], true).await;
    app.store.set_order_created_at(
        Uuid::parse_str(&next_day).unwrap(),
        Utc.with_ymd_and_hms(2024, 3, 11, 3, 0, 0).unwrap(),
    );

    let res = app
        .admin(Method::GET, "/api/admin-reports?start_date=2024-03-10&end_date=2024-03-10", None)
        .await;
    let body = res.json();
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["sales"][0]["id"], late.as_str());
}

#[tokio::test]
async fn test_summary_excludes_cancelled_over_full_set() {
    let app = TestApp::new().await;
    let vendor = app.vendor("Maria").await;
    let carne = app.flavor("Carne").await;
    let queijo = app.flavor("Queijo").await;

    app.order_id(&vendor, &[(&carne, 2), (&queijo, 1)], true).await;
    let flip = app.order_id(&vendor, &[(&queijo, 3)], true).await;
    app.order_id(&vendor, &[(&carne, 1)], false).await;

    let summary = app.admin(Method::GET, "/api/admin-reports/summary?limit=1", None).await.json();
    assert_eq!(summary["total_sales_cents"], 3500);
    assert_eq!(summary["total_units"], 7);
    assert_eq!(summary["order_count"], 3);
    assert_eq!(summary["today_order_count"], 3);
    assert_eq!(summary["ranking"][0]["flavor_name"], "Queijo");
    assert_eq!(summary["ranking"][0]["quantity"], 4);

    let uri = format!("/api/orders/{flip}/status");
    app.admin(Method::PATCH, &uri, Some(json!({ "status": "cancelled" }))).await;
    let summary = app.admin(Method::GET, "/api/admin-reports/summary", None).await.json();
    assert_eq!(summary["total_sales_cents"], 2000);
    assert_eq!(summary["total_units"], 4);
    assert_eq!(summary["cancelled_count"], 1);
    assert_eq!(summary["ranking"][0]["flavor_name"], "Carne");

    app.admin(Method::PATCH, &uri, Some(json!({ "status": "paid" }))).await;
    let summary = app.admin(Method::GET, "/api/admin-reports/summary", None).await.json();
    assert_eq!(summary["total_sales_cents"], 3500);
}

#[tokio::test]
async fn test_report_storage_failures() {
    let app = TestApp::new().await;

    app.store.fail(FailPoint::CountSales);
    let res = app.admin(Method::GET, "/api/admin-reports", None).await;
    assert_eq!(res.code(), "COUNT_ERROR");

    app.store.clear_failures();
    app.store.fail(FailPoint::ListSales);
    let res = app.admin(Method::GET, "/api/admin-reports", None).await;
    assert_eq!(res.code(), "FETCH_ERROR");
}

#[tokio::test]
async fn test_transient_read_failures_are_retried() {
    let app = TestApp::with_config(|c| c.retry_max_attempts = 2).await;
    app.store.fail_times(FailPoint::ListSales, 2);

    let res = app.admin(Method::GET, "/api/admin-reports", None).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.json());
}

#[tokio::test]
async fn test_vendor_sales() {
    let app = TestApp::new().await;
    let maria = app.vendor("Maria").await;
    let joao = app.vendor("João").await;
    let carne = app.flavor("Carne").await;
    app.order_id(&maria, &[(&carne, 1)], true).await;
    app.order_id(&joao, &[(&carne, 1)], true).await;

    let res = app.get("/api/vendor-sales").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.code(), "VALIDATION_ERROR");

    let res = app.get(&format!("/api/vendor-sales?vendor_id={}", Uuid::new_v4())).await;
    assert_eq!(res.code(), "INVALID_VENDOR");

    let res = app.get(&format!("/api/vendor-sales?vendor_id={}", maria.id)).await;
    let body = res.json();
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["sales"][0]["customer_phone"], "11999887766");

    let summary = app
        .get(&format!("/api/vendor-sales/summary?vendor_id={}", maria.id))
        .await
        .json();
    assert_eq!(summary["total_sales_cents"], 500);
}

#[tokio::test]
async fn test_vendor_sales_scoped_by_session() {
    let app = TestApp::new().await;
    let maria = app.vendor("Maria").await;
    let joao = app.vendor("João").await;
    let carne = app.flavor("Carne").await;
    app.order_id(&maria, &[(&carne, 2)], true).await;
    app.order_id(&joao, &[(&carne, 1)], true).await;

    let res = app.post("/api/vendor-session", json!({ "vendor_id": maria.id })).await;
    let token = res.json()["token"].as_str().unwrap().to_string();

    let res = app.call(Method::GET, "/api/vendor-sales", None, Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["total_count"], 1);

    let summary = app
        .call(Method::GET, "/api/vendor-sales/summary", None, Some(&token))
        .await
        .json();
    assert_eq!(summary["total_sales_cents"], 1000);

    let res = app
        .call(Method::GET, &format!("/api/vendor-sales?vendor_id={}", joao.id), None, Some(&token))
        .await;
    assert_eq!(res.code(), "INVALID_VENDOR");

    let res = app.call(Method::GET, "/api/vendor-sales", None, Some("stale-token")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}
