//! Admin JWT authentication
//!
//! Admin sessions are issued by an external provider that signs HS256 tokens
//! with the shared `ADMIN_JWT_SECRET`. This server only verifies them.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

use crate::state::AppState;

/// JWT claims of an admin session
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Admin user ID
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated admin extracted from the JWT
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub admin_id: String,
    pub email: Option<String>,
}

const JWT_EXPIRY_HOURS: i64 = 12;

/// Sign an admin token (used by tooling and tests in place of the provider)
pub fn create_token(
    admin_id: &str,
    email: Option<&str>,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = AdminClaims {
        sub: admin_id.to_string(),
        email: email.map(str::to_string),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token and return the admin identity
pub fn verify_token(token: &str, secret: &str) -> Result<AdminIdentity, AppError> {
    let token_data = jsonwebtoken::decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("Admin JWT validation failed: {e}");
        AppError::unauthorized().with_detail("reason", "invalid_or_expired_token")
    })?;

    Ok(AdminIdentity {
        admin_id: token_data.claims.sub,
        email: token_data.claims.email,
    })
}

/// Middleware that verifies the admin JWT from the Authorization header
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = super::bearer_token(request.headers())
        .ok_or_else(|| AppError::unauthorized().with_detail("reason", "missing_token"))?;

    let identity = verify_token(token, &state.admin_jwt_secret)?;
    tracing::debug!(admin_id = %identity.admin_id, "Admin authenticated");

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn test_token_roundtrip() {
        let token = create_token("admin-1", Some("adm@pastel.app"), "secret").unwrap();
        let identity = verify_token(&token, "secret").unwrap();
        assert_eq!(identity.admin_id, "admin-1");
        assert_eq!(identity.email.as_deref(), Some("adm@pastel.app"));
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let token = create_token("admin-1", None, "secret").unwrap();
        let err = verify_token(&token, "other").unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert!(verify_token("garbage", "secret").is_err());
    }
}
