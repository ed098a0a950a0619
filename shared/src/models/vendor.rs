//! Vendor Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Vendor entity
///
/// Vendors are never hard-deleted; order history references them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create vendor payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorCreate {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Update vendor payload
///
/// `phone: null` clears the phone, an absent key leaves it untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::util::double_option")]
    pub phone: Option<Option<String>>,
    pub active: Option<bool>,
}
