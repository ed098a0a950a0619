//! Flavor Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flavor entity
///
/// At most one *active* flavor may carry a given name (case-insensitive).
/// Flavors referenced by order lines are deactivated instead of deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Flavor {
    pub id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create flavor payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlavorCreate {
    pub name: Option<String>,
    /// Defaults to the current settings price when absent
    pub price_cents: Option<i64>,
}

/// Update flavor payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlavorUpdate {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub active: Option<bool>,
}

/// Outcome of a flavor deletion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FlavorRemoval {
    /// Row removed, no order referenced it
    Deleted { id: Uuid },
    /// Flavor has order history and was set inactive
    Deactivated { flavor: Flavor },
}
