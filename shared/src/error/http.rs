//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::NotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::DuplicateName | Self::InvalidTransition => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::Unauthorized | Self::SessionExpired => StatusCode::UNAUTHORIZED,

            // 503 Service Unavailable (transient, client can retry reads)
            Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::FetchError
            | Self::CountError
            | Self::CheckError
            | Self::SettingsError
            | Self::CustomerError
            | Self::OrderError
            | Self::OrderItemsError
            | Self::InsertError
            | Self::UploadError
            | Self::UpdateError
            | Self::DeleteError
            | Self::DeactivateError
            | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request
            Self::ValidationError
            | Self::InvalidVendor
            | Self::InvalidFlavors
            | Self::InvalidQuantity => StatusCode::BAD_REQUEST,
        }
    }
}
