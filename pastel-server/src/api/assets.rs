//! Public assets served from the blob store

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use shared::error::AppError;

use crate::blob::BlobError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/assets/{*path}", get(get_asset))
}

/// GET /assets/{*path}
pub async fn get_asset(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bytes = match state.blobs.get(&path).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) | Err(BlobError::InvalidPath(_)) => return Err(AppError::not_found("Arquivo")),
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Asset read failed");
            return Err(AppError::internal("Falha ao ler arquivo"));
        }
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.to_string())], bytes))
}
