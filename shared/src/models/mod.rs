//! Data models
//!
//! Shared between the server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All entity IDs are UUIDs.

pub mod customer;
pub mod flavor;
pub mod settings;
pub mod vendor;

// Re-exports
pub use customer::*;
pub use flavor::*;
pub use settings::*;
pub use vendor::*;
