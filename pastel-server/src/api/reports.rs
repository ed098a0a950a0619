//! Sales report endpoints

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use shared::error::AppError;

use super::NO_STORE;
use crate::auth::CurrentSession;
use crate::services;
use crate::services::reports::ReportQuery;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/vendor-sales", get(vendor_sales))
        .route("/api/vendor-sales/summary", get(vendor_summary))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/api/admin-reports", get(admin_reports))
        .route("/api/admin-reports/summary", get(admin_summary))
}

/// GET /api/admin-reports: one page of sales, newest first
pub async fn admin_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = services::reports::admin_sales(&state, &query).await?;
    Ok((NO_STORE, Json(page)))
}

/// GET /api/admin-reports/summary: KPIs over every matching order
pub async fn admin_summary(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let summary = services::reports::admin_summary(&state, &query).await?;
    Ok((NO_STORE, Json(summary)))
}

/// GET /api/vendor-sales: the session's vendor, or `?vendor_id=`
pub async fn vendor_sales(
    State(state): State<AppState>,
    session: Option<CurrentSession>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let session = session.map(|CurrentSession(s)| s);
    let page = services::reports::vendor_sales(&state, session.as_ref(), &query).await?;
    Ok((NO_STORE, Json(page)))
}

pub async fn vendor_summary(
    State(state): State<AppState>,
    session: Option<CurrentSession>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let session = session.map(|CurrentSession(s)| s);
    let summary = services::reports::vendor_summary(&state, session.as_ref(), &query).await?;
    Ok((NO_STORE, Json(summary)))
}
