//! Vendor session lifecycle

use chrono::Utc;
use shared::error::{AppError, ErrorCode};
use shared::session::{SessionResponse, StartSessionRequest, VendorSession};
use uuid::Uuid;

use crate::error::{ServiceResult, step};
use crate::state::AppState;

fn response(state: &AppState, session: VendorSession) -> SessionResponse {
    SessionResponse {
        expires_at: session.expires_at(state.sessions.ttl()),
        session,
    }
}

/// Open a session for an active vendor
pub async fn start(state: &AppState, request: &StartSessionRequest) -> ServiceResult<SessionResponse> {
    let Some(raw) = request.vendor_id.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
        return Err(AppError::validation("Vendedor é obrigatório")
            .with_detail("field", "vendor_id")
            .into());
    };
    let vendor_id = Uuid::parse_str(raw).map_err(|_| AppError::new(ErrorCode::InvalidVendor))?;

    let store = state.store.as_ref();
    let vendor = state
        .retry
        .read(move || store.get_vendor(vendor_id))
        .await
        .map_err(step(ErrorCode::FetchError))?
        .filter(|v| v.active)
        .ok_or_else(|| AppError::new(ErrorCode::InvalidVendor))?;

    let session = state.sessions.start(&vendor, Utc::now());
    Ok(response(state, session))
}

pub fn describe(state: &AppState, session: VendorSession) -> SessionResponse {
    response(state, session)
}

/// Vendor a vendor-side call acts for.
///
/// With a session the session's vendor is used; a supplied id naming a
/// different vendor is refused. Without one the supplied id is passed on.
pub(crate) fn scoped_vendor_id(
    session: Option<&VendorSession>,
    supplied: Option<&str>,
) -> Result<Option<String>, AppError> {
    let supplied = supplied.map(str::trim).filter(|v| !v.is_empty());
    let Some(session) = session else {
        return Ok(supplied.map(str::to_string));
    };
    match supplied {
        Some(raw) if Uuid::parse_str(raw).ok() != Some(session.vendor.id) => {
            Err(AppError::new(ErrorCode::InvalidVendor)
                .with_detail("vendor_id", "Vendedor diferente do da sessão"))
        }
        _ => Ok(Some(session.vendor.id.to_string())),
    }
}

pub fn end(state: &AppState, session: &VendorSession) {
    if state.sessions.end(&session.token) {
        tracing::info!(vendor_id = %session.vendor.id, "Vendor session ended");
    }
}
