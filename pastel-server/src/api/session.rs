//! Vendor session endpoints

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use shared::error::AppError;
use shared::session::{SessionResponse, StartSessionRequest};

use super::ApiJson;
use crate::auth::CurrentSession;
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/vendor-session",
        post(start_session).get(current_session).delete(end_session),
    )
}

/// POST /api/vendor-session: pick an active vendor
pub async fn start_session(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<StartSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session = services::session::start(&state, &request).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/vendor-session
pub async fn current_session(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Json<SessionResponse> {
    Json(services::session::describe(&state, session))
}

/// DELETE /api/vendor-session
pub async fn end_session(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> StatusCode {
    services::session::end(&state, &session);
    StatusCode::NO_CONTENT
}
