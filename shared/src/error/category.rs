//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification by origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Caller supplied data that fails a precondition
    Validation,
    /// A uniqueness or state invariant would be violated
    Conflict,
    /// Referenced entity does not exist
    NotFound,
    /// Authentication / session errors
    Auth,
    /// External storage or blob layer failed
    Dependency,
    /// Unclassified internal failure
    System,
}

impl ErrorCategory {
    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::Auth => "auth",
            Self::Dependency => "dependency",
            Self::System => "system",
        }
    }

    /// Whether errors of this category come from the server side
    pub fn is_server_side(&self) -> bool {
        matches!(self, Self::Dependency | Self::System)
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError
            | Self::InvalidVendor
            | Self::InvalidFlavors
            | Self::InvalidQuantity => ErrorCategory::Validation,

            Self::DuplicateName | Self::InvalidTransition => ErrorCategory::Conflict,

            Self::NotFound => ErrorCategory::NotFound,

            Self::Unauthorized | Self::SessionExpired => ErrorCategory::Auth,

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
            | Self::TimeoutError => ErrorCategory::Dependency,

            Self::InternalError => ErrorCategory::System,
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_error_code() {
        assert_eq!(ErrorCode::InvalidQuantity.category(), ErrorCategory::Validation);
        assert_eq!(ErrorCode::DuplicateName.category(), ErrorCategory::Conflict);
        assert_eq!(ErrorCode::NotFound.category(), ErrorCategory::NotFound);
        assert_eq!(ErrorCode::SessionExpired.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::OrderItemsError.category(), ErrorCategory::Dependency);
        assert_eq!(ErrorCode::InternalError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_server_side() {
        assert!(ErrorCategory::Dependency.is_server_side());
        assert!(ErrorCategory::System.is_server_side());
        assert!(!ErrorCategory::Validation.is_server_side());
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::NotFound).unwrap();
        assert_eq!(json, "\"not_found\"");
    }
}
