//! Vendor session registry
//!
//! Sessions live server-side, keyed by an opaque bearer token. With no TTL
//! configured a session lasts until it is ended explicitly.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use http::request::Parts;
use shared::error::{AppError, ErrorCode};
use shared::models::Vendor;
use shared::session::{SessionVendor, VendorSession};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::state::AppState;

/// Concurrent sessions one vendor may hold
pub const MAX_SESSIONS_PER_VENDOR: usize = 8;

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<String, VendorSession>>,
    ttl: Option<chrono::Duration>,
}

impl SessionRegistry {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl: ttl.and_then(|d| chrono::Duration::from_std(d).ok()),
        }
    }

    pub fn ttl(&self) -> Option<chrono::Duration> {
        self.ttl
    }

    /// Open a session for `vendor` (caller checks it is active)
    ///
    /// Expired sessions are swept first, and a vendor keeps at most
    /// [`MAX_SESSIONS_PER_VENDOR`] sessions: the oldest ones are dropped.
    pub fn start(&self, vendor: &Vendor, now: DateTime<Utc>) -> VendorSession {
        self.sweep_expired(now);
        self.evict_oldest(vendor.id, MAX_SESSIONS_PER_VENDOR - 1);

        let session = VendorSession {
            token: Uuid::new_v4().simple().to_string(),
            vendor: SessionVendor {
                id: vendor.id,
                name: vendor.name.clone(),
            },
            login_time: now,
        };
        self.sessions.insert(session.token.clone(), session.clone());
        tracing::info!(vendor_id = %vendor.id, "Vendor session started");
        session
    }

    /// Look a session up; expired sessions are removed and reported
    pub fn lookup(&self, token: &str, now: DateTime<Utc>) -> Result<VendorSession, AppError> {
        let session = self
            .sessions
            .get(token)
            .map(|entry| entry.value().clone())
            .ok_or_else(AppError::unauthorized)?;

        if session.is_expired(now, self.ttl) {
            self.sessions.remove(token);
            tracing::info!(vendor_id = %session.vendor.id, "Vendor session expired");
            return Err(AppError::new(ErrorCode::SessionExpired));
        }
        Ok(session)
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired(now, Some(ttl)));
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::debug!(removed, "Swept expired vendor sessions");
        }
        removed
    }

    /// Keep only the `keep` most recent sessions of one vendor
    fn evict_oldest(&self, vendor_id: Uuid, keep: usize) {
        let mut held: Vec<(DateTime<Utc>, String)> = self
            .sessions
            .iter()
            .filter(|entry| entry.vendor.id == vendor_id)
            .map(|entry| (entry.login_time, entry.key().clone()))
            .collect();
        if held.len() <= keep {
            return;
        }
        held.sort();
        let excess = held.len() - keep;
        for (_, token) in held.into_iter().take(excess) {
            self.sessions.remove(&token);
        }
        tracing::debug!(vendor_id = %vendor_id, evicted = excess, "Evicted oldest vendor sessions");
    }

    pub fn end(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Extractor for the caller's vendor session (`Authorization: Bearer <token>`)
pub struct CurrentSession(pub VendorSession);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = super::bearer_token(&parts.headers).ok_or_else(AppError::unauthorized)?;
        state.sessions.lookup(token, Utc::now()).map(CurrentSession)
    }
}

/// `Option<CurrentSession>`: no `Authorization` header is `None`, while an
/// unknown or expired token is still rejected
impl OptionalFromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match super::bearer_token(&parts.headers) {
            None => Ok(None),
            Some(token) => state.sessions.lookup(token, Utc::now()).map(|s| Some(CurrentSession(s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendor() -> Vendor {
        let now = Utc::now();
        Vendor {
            id: Uuid::new_v4(),
            name: "Maria".into(),
            phone: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_session_without_ttl_persists() {
        let registry = SessionRegistry::new(None);
        let login = Utc::now();
        let session = registry.start(&vendor(), login);

        let later = login + chrono::Duration::days(400);
        assert_eq!(registry.lookup(&session.token, later).unwrap(), session);
    }

    #[test]
    fn test_expired_session_is_removed() {
        let registry = SessionRegistry::new(Some(Duration::from_secs(60)));
        let login = Utc::now();
        let session = registry.start(&vendor(), login);

        assert!(registry.lookup(&session.token, login + chrono::Duration::seconds(30)).is_ok());
        let err = registry
            .lookup(&session.token, login + chrono::Duration::seconds(60))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionExpired);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_end_and_unknown_token() {
        let registry = SessionRegistry::new(None);
        let session = registry.start(&vendor(), Utc::now());
        assert!(registry.end(&session.token));
        assert!(!registry.end(&session.token));
        assert_eq!(
            registry.lookup(&session.token, Utc::now()).unwrap_err().code,
            ErrorCode::Unauthorized
        );
    }

    #[test]
    fn test_start_sweeps_expired_sessions() {
        let registry = SessionRegistry::new(Some(Duration::from_secs(1)));
        let login = Utc::now();
        for _ in 0..500 {
            registry.start(&vendor(), login);
        }
        assert_eq!(registry.len(), 500);

        let session = registry.start(&vendor(), login + chrono::Duration::hours(1));
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup(&session.token, login + chrono::Duration::hours(1)).is_ok());
    }

    #[test]
    fn test_sweep_without_ttl_keeps_everything() {
        let registry = SessionRegistry::new(None);
        registry.start(&vendor(), Utc::now());
        assert_eq!(registry.sweep_expired(Utc::now() + chrono::Duration::days(30)), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_vendor_session_count_is_capped() {
        let registry = SessionRegistry::new(None);
        let maria = vendor();
        let login = Utc::now();
        let sessions: Vec<VendorSession> = (0..20)
            .map(|i| registry.start(&maria, login + chrono::Duration::seconds(i)))
            .collect();
        let other = registry.start(&vendor(), login);

        assert_eq!(registry.len(), MAX_SESSIONS_PER_VENDOR + 1);
        let now = login + chrono::Duration::minutes(1);
        assert_eq!(
            registry.lookup(&sessions[0].token, now).unwrap_err().code,
            ErrorCode::Unauthorized
        );
        for session in &sessions[20 - MAX_SESSIONS_PER_VENDOR..] {
            assert!(registry.lookup(&session.token, now).is_ok());
        }
        assert!(registry.lookup(&other.token, now).is_ok());
    }
}
