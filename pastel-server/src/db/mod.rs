//! Storage layer
//!
//! [`Store`] covers exactly the reads and writes the services need. Two
//! backends implement it: [`pg::PgStore`] (PostgreSQL via sqlx) and
//! [`memory::MemoryStore`] (process memory, used in development and tests).

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::models::{AppSettings, Customer, Flavor, FlavorUpdate, SettingsUpdate, Vendor, VendorUpdate};
use shared::order::{Order, OrderItem, OrderStatus, PaymentMethod, SaleRecord};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

pub use memory::{FailPoint, MemoryStore};
pub use pg::PgStore;

/// Storage error types
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique index rejected the write
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// Foreign key / check constraint rejected the write
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Connection could not be obtained or was lost
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Whether retrying the same idempotent call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some("23505") => StoreError::Duplicate(db.constraint().unwrap_or("unique").to_string()),
                Some("23503") | Some("23514") => StoreError::Constraint(db.message().to_string()),
                // admin_shutdown / cannot_connect_now / too_many_connections
                Some("57P01") | Some("57P03") | Some("53300") => {
                    StoreError::Unavailable(db.message().to_string())
                }
                _ => StoreError::Database(err.to_string()),
            },
            sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Database(err.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// New order row; the id and timestamp are assigned by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub vendor_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub total_cents: i64,
}

/// Filters shared by the paginated listing, its count and the summary scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub vendor_id: Option<Uuid>,
    /// Orders having at least one line of this flavor
    pub flavor_id: Option<Uuid>,
    /// Inclusive lower bound
    pub created_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound
    pub created_before: Option<DateTime<Utc>>,
    /// Lowercased substring of vendor, customer or flavor names
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

/// Storage operations used by the services
#[async_trait]
pub trait Store: Send + Sync {
    // ── Vendors ──
    async fn list_vendors(&self, include_inactive: bool) -> StoreResult<Vec<Vendor>>;
    async fn get_vendor(&self, id: Uuid) -> StoreResult<Option<Vendor>>;
    /// Whether an active vendor other than `exclude` has this name (case-insensitive)
    async fn active_vendor_name_exists(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool>;
    async fn insert_vendor(&self, name: &str, phone: Option<&str>) -> StoreResult<Vendor>;
    async fn update_vendor(&self, id: Uuid, patch: &VendorUpdate) -> StoreResult<Option<Vendor>>;

    // ── Flavors ──
    async fn list_flavors(&self, active_only: bool) -> StoreResult<Vec<Flavor>>;
    async fn get_flavor(&self, id: Uuid) -> StoreResult<Option<Flavor>>;
    /// Active flavors among `ids`
    async fn find_active_flavors(&self, ids: &[Uuid]) -> StoreResult<Vec<Flavor>>;
    async fn active_flavor_name_exists(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool>;
    async fn insert_flavor(&self, name: &str, price_cents: i64) -> StoreResult<Flavor>;
    async fn update_flavor(&self, id: Uuid, patch: &FlavorUpdate) -> StoreResult<Option<Flavor>>;
    /// Whether any order line references the flavor
    async fn flavor_has_order_items(&self, id: Uuid) -> StoreResult<bool>;
    async fn delete_flavor(&self, id: Uuid) -> StoreResult<bool>;

    // ── Settings ──
    async fn get_settings(&self) -> StoreResult<Option<AppSettings>>;
    /// Insert the singleton row when missing
    async fn ensure_settings(&self, default_price_cents: i64) -> StoreResult<AppSettings>;
    async fn update_settings(&self, patch: &SettingsUpdate) -> StoreResult<Option<AppSettings>>;

    // ── Customers ──
    /// First customer with exactly this phone
    async fn find_customer_by_phone(&self, phone: &str) -> StoreResult<Option<Customer>>;
    async fn insert_customer(&self, name: &str, phone: Option<&str>) -> StoreResult<Customer>;

    // ── Orders ──
    async fn insert_order(&self, order: &NewOrder) -> StoreResult<Order>;
    /// Insert all lines of one order in a single statement
    async fn insert_order_items(&self, items: &[OrderItem]) -> StoreResult<()>;
    /// Delete an order and its lines
    async fn delete_order(&self, id: Uuid) -> StoreResult<bool>;
    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>>;
    async fn get_order_items(&self, order_id: Uuid) -> StoreResult<Vec<OrderItem>>;
    async fn get_sale(&self, id: Uuid) -> StoreResult<Option<SaleRecord>>;
    /// Set the status. With `expected`, only while the order still has that
    /// status; `None` covers both a missing order and a lost race.
    async fn update_order_status(
        &self,
        id: Uuid,
        expected: Option<OrderStatus>,
        status: OrderStatus,
    ) -> StoreResult<Option<Order>>;

    // ── Reports ──
    /// Newest first
    async fn list_sales(&self, filter: &OrderFilter, page: Page) -> StoreResult<Vec<SaleRecord>>;
    async fn count_sales(&self, filter: &OrderFilter) -> StoreResult<i64>;
    /// Full scan with no pagination, for aggregation
    async fn scan_sales(&self, filter: &OrderFilter) -> StoreResult<Vec<SaleRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::Unavailable("x".into()).is_transient());
        assert!(StoreError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(!StoreError::Duplicate("x".into()).is_transient());
        assert!(!StoreError::Database("x".into()).is_transient());
    }

    #[test]
    fn test_pool_timeout_is_transient() {
        assert!(StoreError::from(sqlx::Error::PoolTimedOut).is_transient());
        assert!(!StoreError::from(sqlx::Error::RowNotFound).is_transient());
    }
}
