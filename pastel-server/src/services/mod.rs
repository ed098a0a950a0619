//! Business operations
//!
//! Handlers stay thin: each service function takes the shared [`AppState`],
//! runs validation before any write, wraps storage calls in the retry policy
//! (reads only) and tags storage failures with the code of the failed step.
//!
//! [`AppState`]: crate::state::AppState

pub mod catalog;
pub mod flavors;
pub mod orders;
pub mod reports;
pub mod session;
pub mod settings;
pub mod vendors;

use shared::error::AppError;
use uuid::Uuid;

/// Parse a path or body id; malformed ids read as "not found"
pub(crate) fn parse_id(raw: &str, resource: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::not_found(resource))
}
