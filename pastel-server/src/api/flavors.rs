//! Flavor endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::models::{Flavor, FlavorCreate, FlavorRemoval, FlavorUpdate};

use super::{ApiJson, NO_STORE};
use crate::services;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub active_only: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlavorList {
    pub flavors: Vec<Flavor>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlavorBody {
    pub flavor: Flavor,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlavorDeleted {
    #[serde(flatten)]
    pub removal: FlavorRemoval,
    pub message: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/flavors", get(list_flavors))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/api/flavors", post(create_flavor))
        .route("/api/flavors/{id}", patch(update_flavor).delete(delete_flavor))
}

/// GET /api/flavors?active_only=true
pub async fn list_flavors(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let active_only = query.active_only.as_deref() == Some("true");
    let flavors = services::flavors::list(&state, active_only).await?;
    Ok((NO_STORE, Json(FlavorList { flavors })))
}

pub async fn create_flavor(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<FlavorCreate>,
) -> Result<(StatusCode, Json<FlavorBody>), AppError> {
    let flavor = services::flavors::create(&state, &data).await?;
    Ok((StatusCode::CREATED, Json(FlavorBody { flavor })))
}

pub async fn update_flavor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(data): ApiJson<FlavorUpdate>,
) -> Result<Json<FlavorBody>, AppError> {
    let flavor = services::flavors::update(&state, &id, &data).await?;
    Ok(Json(FlavorBody { flavor }))
}

pub async fn delete_flavor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FlavorDeleted>, AppError> {
    let removal = services::flavors::remove(&state, &id).await?;
    let message = match removal {
        FlavorRemoval::Deleted { .. } => "Sabor excluído",
        FlavorRemoval::Deactivated { .. } => "Sabor possui pedidos e foi desativado",
    };
    Ok(Json(FlavorDeleted {
        removal,
        message: message.to_string(),
    }))
}
