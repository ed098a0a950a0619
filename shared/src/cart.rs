//! In-memory cart of flavor selections
//!
//! The cart total is advisory: it uses the flavor prices of the catalog
//! snapshot it is evaluated against. The price charged is resolved again
//! when the order is submitted.

use crate::catalog::CatalogSnapshot;
use crate::order::OrderItemInput;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub flavor_id: Uuid,
    pub quantity: u32,
}

/// Flavor → quantity, in insertion order. Quantities are always ≥ 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a line quantity. Negative is ignored, zero removes the line.
    pub fn set_quantity(&mut self, flavor_id: Uuid, quantity: i64) {
        if quantity < 0 {
            return;
        }
        if quantity == 0 {
            self.lines.retain(|l| l.flavor_id != flavor_id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.lines.iter_mut().find(|l| l.flavor_id == flavor_id) {
            Some(line) => line.quantity = quantity,
            None => self.lines.push(CartLine {
                flavor_id,
                quantity,
            }),
        }
    }

    pub fn increment(&mut self, flavor_id: Uuid) {
        let current = self.quantity(flavor_id);
        self.set_quantity(flavor_id, i64::from(current) + 1);
    }

    /// Decrement by one; reaching zero removes the line.
    pub fn decrement(&mut self, flavor_id: Uuid) {
        let current = self.quantity(flavor_id);
        self.set_quantity(flavor_id, (i64::from(current) - 1).max(0));
    }

    pub fn quantity(&self, flavor_id: Uuid) -> u32 {
        self.lines
            .iter()
            .find(|l| l.flavor_id == flavor_id)
            .map_or(0, |l| l.quantity)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Advisory total in cents. Flavors missing from the snapshot count as 0.
    pub fn total(&self, catalog: &CatalogSnapshot) -> i64 {
        self.lines
            .iter()
            .map(|line| {
                let price = catalog.flavor(line.flavor_id).map_or(0, |f| f.price_cents);
                i64::from(line.quantity).saturating_mul(price)
            })
            .fold(0_i64, i64::saturating_add)
    }

    /// Lines as order submission input
    pub fn to_order_items(&self) -> Vec<OrderItemInput> {
        self.lines
            .iter()
            .map(|l| OrderItemInput {
                flavor_id: Some(l.flavor_id.to_string()),
                quantity: Some(f64::from(l.quantity)),
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
