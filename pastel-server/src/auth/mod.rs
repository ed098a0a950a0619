//! Authentication: admin JWT and vendor sessions

pub mod admin_auth;
pub mod vendor_session;

pub use admin_auth::{AdminIdentity, admin_auth_middleware, create_token};
pub use vendor_session::{CurrentSession, SessionRegistry};

/// Token of an `Authorization: Bearer <token>` header
pub(crate) fn bearer_token(headers: &http::HeaderMap) -> Option<&str> {
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
