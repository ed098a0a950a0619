//! Unified error system
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes (wire strings such as `INVALID_FLAVORS`)
//! - [`ErrorCategory`]: Classification of errors by origin
//! - [`AppError`]: Rich error type with code, localized message and details
//! - [`ErrorResponse`]: The `{error, message, code, details}` body sent to clients
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ErrorResponse};
//!
//! let err = AppError::validation("Nome é obrigatório").with_detail("field", "name");
//! assert_eq!(err.code, ErrorCode::ValidationError);
//!
//! let body = ErrorResponse::from(&err);
//! assert!(body.error);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorResponse};
