//! Order pricing
//!
//! Totals are computed here at write time: every line is priced with the
//! single unit price resolved for the order, and the order total is the sum
//! of the line totals.

use super::types::{OrderItem, OrderStatus};
use crate::error::{AppError, ErrorCode};
use uuid::Uuid;

/// Upper bound for a single line quantity
pub const MAX_LINE_QUANTITY: i32 = 9999;

/// Cart line with a validated quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRequest {
    pub flavor_id: Uuid,
    pub quantity: i32,
}

/// Line with its frozen unit price and computed total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub flavor_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// Result of pricing a whole order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedOrder {
    pub unit_price_cents: i64,
    pub total_cents: i64,
    pub lines: Vec<PricedLine>,
}

impl PricedOrder {
    /// Materialize persisted rows for `order_id`.
    pub fn to_items(&self, order_id: Uuid) -> Vec<OrderItem> {
        self.lines
            .iter()
            .map(|line| OrderItem {
                id: Uuid::new_v4(),
                order_id,
                flavor_id: line.flavor_id,
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: line.line_total_cents,
            })
            .collect()
    }
}

/// Price every line at `unit_price_cents` and sum the order total.
///
/// Arithmetic overflow is reported as `VALIDATION_ERROR`.
pub fn price_lines(lines: &[LineRequest], unit_price_cents: i64) -> Result<PricedOrder, AppError> {
    let overflow = || {
        AppError::with_message(ErrorCode::ValidationError, "Valor do pedido excede o limite")
    };

    let mut total_cents: i64 = 0;
    let mut priced = Vec::with_capacity(lines.len());
    for line in lines {
        let line_total_cents = unit_price_cents
            .checked_mul(i64::from(line.quantity))
            .ok_or_else(overflow)?;
        total_cents = total_cents.checked_add(line_total_cents).ok_or_else(overflow)?;
        priced.push(PricedLine {
            flavor_id: line.flavor_id,
            quantity: line.quantity,
            unit_price_cents,
            line_total_cents,
        });
    }

    Ok(PricedOrder {
        unit_price_cents,
        total_cents,
        lines: priced,
    })
}

/// Validate a raw requested quantity: a whole number in `1..=MAX_LINE_QUANTITY`.
pub fn validate_quantity(raw: Option<f64>) -> Result<i32, AppError> {
    match raw {
        Some(q) if q.fract() == 0.0 && q >= 1.0 && q <= f64::from(MAX_LINE_QUANTITY) => Ok(q as i32),
        _ => Err(AppError::new(ErrorCode::InvalidQuantity).with_detail(
            "quantity",
            format!("Todas as quantidades devem ser inteiras entre 1 e {MAX_LINE_QUANTITY}"),
        )),
    }
}

/// Initial status of a submitted order
pub fn initial_status(mark_as_paid: bool) -> OrderStatus {
    if mark_as_paid {
        OrderStatus::Paid
    } else {
        OrderStatus::Created
    }
}

/// Check `total == Σ line_total` and `line_total == quantity * unit_price` for persisted rows.
pub fn totals_consistent(total_cents: i64, items: &[OrderItem]) -> bool {
    let lines_ok = items
        .iter()
        .all(|i| i64::from(i.quantity) * i.unit_price_cents == i.line_total_cents);
    lines_ok && items.iter().map(|i| i.line_total_cents).sum::<i64>() == total_cents
}
