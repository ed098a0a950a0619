//! Vendor endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::models::{Vendor, VendorCreate, VendorUpdate};

use super::ApiJson;
use crate::services;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub include_inactive: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VendorList {
    pub vendors: Vec<Vendor>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VendorBody {
    pub vendor: Vendor,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/vendors", get(list_vendors))
        .route("/api/vendors/{id}", get(get_vendor))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/api/vendors", post(create_vendor))
        .route("/api/vendors/{id}", patch(update_vendor))
}

/// GET /api/vendors: active vendors, or all with `include_inactive=true`
pub async fn list_vendors(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<VendorList>, AppError> {
    let include_inactive = query.include_inactive.as_deref() == Some("true");
    let vendors = services::vendors::list(&state, include_inactive).await?;
    Ok(Json(VendorList { vendors }))
}

pub async fn get_vendor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VendorBody>, AppError> {
    let vendor = services::vendors::get(&state, &id).await?;
    Ok(Json(VendorBody { vendor }))
}

pub async fn create_vendor(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<VendorCreate>,
) -> Result<(StatusCode, Json<VendorBody>), AppError> {
    let vendor = services::vendors::create(&state, &data).await?;
    Ok((StatusCode::CREATED, Json(VendorBody { vendor })))
}

pub async fn update_vendor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(data): ApiJson<VendorUpdate>,
) -> Result<Json<VendorBody>, AppError> {
    let vendor = services::vendors::update(&state, &id, &data).await?;
    Ok(Json(VendorBody { vendor }))
}
