//! Order entities and API payloads

use crate::models::CustomerInput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Enums
// ============================================================================

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Created,
        OrderStatus::Paid,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Paid => "paid",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether orders in this status count toward sales figures
    pub fn counts_as_sale(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized status or payment method string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownValue(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownValue(s.to_string()))
    }
}

/// Payment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// PIX instant payment (QR code / key)
    Pix,
    /// Paid in person
    Local,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pix => "PIX",
            Self::Local => "LOCAL",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PIX" => Ok(Self::Pix),
            "LOCAL" => Ok(Self::Local),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// Persisted order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    /// Always equals the sum of the items' `line_total_cents`
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Persisted order line
///
/// `unit_price_cents` is the settings price frozen at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub flavor_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// Order line joined with the flavor name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub flavor_id: Uuid,
    pub flavor_name: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// Order with vendor/customer names and its lines (reports, detail views)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub vendor_name: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub items: Vec<OrderLine>,
}

// ============================================================================
// API payloads
// ============================================================================

/// One requested cart line
///
/// Fields are loose so that malformed values map to the submission error
/// codes instead of a generic body rejection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderItemInput {
    #[serde(default)]
    pub flavor_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
}

/// POST /api/orders body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub vendor_id: Option<String>,
    #[serde(default)]
    pub customer: Option<CustomerInput>,
    #[serde(default)]
    pub items: Option<Vec<OrderItemInput>>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub mark_as_paid: bool,
}

/// Line of a submission result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineSummary {
    pub flavor_name: String,
    pub quantity: i32,
    pub line_total_cents: i64,
}

impl From<&OrderLine> for OrderLineSummary {
    fn from(line: &OrderLine) -> Self {
        Self {
            flavor_name: line.flavor_name.clone(),
            quantity: line.quantity,
            line_total_cents: line.line_total_cents,
        }
    }
}

/// POST /api/orders 201 body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: Uuid,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub items: Vec<OrderLineSummary>,
}

impl From<&SaleRecord> for CreateOrderResponse {
    fn from(record: &SaleRecord) -> Self {
        Self {
            order_id: record.id,
            total_cents: record.total_cents,
            status: record.status,
            items: record.items.iter().map(OrderLineSummary::from).collect(),
        }
    }
}

/// PATCH /api/orders/{id}/status body
///
/// Kept as a string so unknown values surface as `VALIDATION_ERROR`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// PATCH /api/orders/{id}/status 200 body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatusResponse {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub previous_status: OrderStatus,
}
