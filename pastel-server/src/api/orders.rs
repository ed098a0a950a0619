//! Order endpoints

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use shared::error::AppError;
use shared::order::{CreateOrderRequest, CreateOrderResponse, SaleRecord, UpdateStatusRequest, UpdateStatusResponse};

use super::ApiJson;
use crate::auth::{AdminIdentity, CurrentSession};
use crate::services;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, AppError>;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", post(create_order))
        .route("/api/orders/{id}", get(get_order))
}

pub fn admin_router() -> Router<AppState> {
    Router::new().route("/api/orders/{id}/status", patch(update_status))
}

/// POST /api/orders: `vendor_id` may come from the vendor session instead
pub async fn create_order(
    State(state): State<AppState>,
    session: Option<CurrentSession>,
    ApiJson(request): ApiJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), AppError> {
    let session = session.map(|CurrentSession(s)| s);
    let response = services::orders::submit_order(&state, session.as_ref(), &request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<SaleRecord> {
    Ok(Json(services::orders::get_order(&state, &id).await?))
}

/// PATCH /api/orders/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminIdentity>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateStatusRequest>,
) -> ApiResult<UpdateStatusResponse> {
    tracing::debug!(admin_id = %admin.admin_id, order_id = %id, "Status change requested");
    Ok(Json(services::orders::update_status(&state, &id, &request).await?))
}
