//! Service-layer error bridging
//!
//! `ServiceError` carries either a storage failure or an already-classified
//! `AppError`. Storage failures are logged once and mapped to the error code
//! of the step that failed (`FETCH_ERROR`, `ORDER_ERROR`, ...).

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::db::StoreError;

#[derive(Debug)]
pub enum ServiceError {
    /// Storage or blob failure, tagged with the code of the failed step
    Store { code: ErrorCode, source: StoreError },
    /// Business-rule error (already an AppError with the correct ErrorCode)
    App(AppError),
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Store { code, source } => {
                if let StoreError::Timeout(after) = source {
                    tracing::error!(step = %code, timeout_ms = after.as_millis() as u64, "Storage call timed out");
                    return AppError::new(ErrorCode::TimeoutError).with_detail("step", code.as_str());
                }
                if let StoreError::Duplicate(ref what) = source {
                    tracing::warn!(step = %code, what = %what, "Unique constraint violated");
                    return AppError::new(ErrorCode::DuplicateName);
                }
                tracing::error!(step = %code, error = %source, "Storage error");
                AppError::new(code)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Tag a storage failure with the code of the step it happened in.
///
/// ```ignore
/// store.get_settings().await.map_err(step(ErrorCode::SettingsError))?;
/// ```
pub fn step(code: ErrorCode) -> impl FnOnce(StoreError) -> ServiceError {
    move |source| ServiceError::Store { code, source }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
