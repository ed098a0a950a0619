//! pastel-server: order lifecycle backend for a pastel stand
//!
//! # Architecture
//!
//! - **Catalog** (`services::catalog`): active flavors + unit price, read live
//! - **Orders** (`services::orders`): validated submission with frozen unit
//!   price, compensating rollback, status updates
//! - **Admin** (`services::{flavors, vendors, settings}`): CRUD with
//!   active-name uniqueness and soft delete
//! - **Reports** (`services::reports`): paginated listing and full-scan KPIs
//! - **Live** (`live`): catalog change notifications (SSE)
//!
//! ```text
//! pastel-server/src/
//! ├── api/        # axum routes and handlers
//! ├── auth/       # admin JWT, vendor sessions
//! ├── services/   # business operations
//! ├── db/         # Store trait, PostgreSQL and in-memory backends
//! ├── blob.rs     # public asset storage
//! ├── live/       # ChangeHub
//! └── retry.rs    # storage deadlines and read retries
//! ```

pub mod api;
pub mod auth;
pub mod blob;
pub mod config;
pub mod db;
pub mod error;
pub mod live;
pub mod logger;
pub mod retry;
pub mod services;
pub mod state;

pub use api::{build_app, build_router};
pub use config::Config;
pub use state::AppState;
