//! Vendor session
//!
//! A vendor "logs in" by picking an active vendor; the session is then passed
//! explicitly to every vendor-side call via its token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionVendor {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorSession {
    pub token: String,
    pub vendor: SessionVendor,
    pub login_time: DateTime<Utc>,
}

impl VendorSession {
    /// `None` TTL means the session never expires.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Option<Duration>) -> bool {
        match ttl {
            Some(ttl) => now >= self.login_time + ttl,
            None => false,
        }
    }

    pub fn expires_at(&self, ttl: Option<Duration>) -> Option<DateTime<Utc>> {
        ttl.map(|ttl| self.login_time + ttl)
    }
}

/// POST /api/vendor-session body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartSessionRequest {
    #[serde(default)]
    pub vendor_id: Option<String>,
}

/// Session as returned to the vendor client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: VendorSession,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}
