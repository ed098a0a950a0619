//! Shared domain for the pastelaria point of sale
//!
//! Pure types and rules used by the server and its clients: entity models,
//! integer-cents money, the vendor cart, order status and pricing rules,
//! sales aggregation, input validation and the unified error type.

pub mod cart;
pub mod catalog;
pub mod error;
pub mod models;
pub mod money;
pub mod order;
pub mod report;
pub mod session;
pub mod util;
pub mod validation;

// Re-exports
pub use axum::Json;
pub use error::{AppError, AppResult, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
