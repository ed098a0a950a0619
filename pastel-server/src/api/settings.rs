//! Settings endpoints

use axum::{
    Json, Router,
    extract::{Multipart, State},
    response::IntoResponse,
    routing::{get, patch, post},
};
use shared::error::AppError;
use shared::models::{SettingsUpdate, UploadedAsset};

use super::{ApiJson, NO_STORE};
use crate::services;
use crate::services::settings::{SettingsView, UploadedFile};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/settings", get(get_settings))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/api/settings", patch(update_settings))
        .route("/api/settings/upload-qr", post(upload_qr))
}

pub async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let view = services::settings::get(&state).await?;
    Ok((NO_STORE, Json(view)))
}

pub async fn update_settings(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<SettingsUpdate>,
) -> Result<Json<SettingsView>, AppError> {
    Ok(Json(services::settings::update(&state, &data).await?))
}

/// POST /api/settings/upload-qr (multipart field `file`)
pub async fn upload_qr(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadedAsset>, AppError> {
    let malformed = |e: axum::extract::multipart::MultipartError| {
        AppError::validation("Envio de arquivo inválido").with_detail("multipart", e.body_text())
    };

    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(malformed)?;
        file = Some(UploadedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let file = file.ok_or_else(|| {
        AppError::validation("Nenhum arquivo enviado").with_detail("field", "file")
    })?;
    Ok(Json(services::settings::upload_qr(&state, file).await?))
}
