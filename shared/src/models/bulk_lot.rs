//! Bulk lot model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A received batch of raw stock, tracked in base units until repacked
///
/// `current_quantity` only moves through the allocation and reversal
/// engines; bulk lots are soft-deleted, never removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkLot {
    pub id: i32,
    /// Supplier batch code (e.g., "B-2025-0381")
    pub batch_no: String,
    pub sku: Option<String>,
    /// Cost of one purchased unit (a sack, a case)
    pub cost_per_unit: Decimal,
    pub price_per_unit: Decimal,
    /// Base units received
    pub initial_quantity: i32,
    /// Base units still in stock
    pub current_quantity: i32,
    pub product_id: i32,
    pub supplier_id: i32,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

impl BulkLot {
    /// Base units consumed so far
    pub fn total_sold(&self) -> i32 {
        self.initial_quantity - self.current_quantity
    }

    /// Remove base units from stock
    pub fn debit(&mut self, base_units: i32) {
        self.current_quantity -= base_units;
    }

    /// Return base units to stock
    pub fn credit(&mut self, base_units: i32) {
        self.current_quantity += base_units;
    }

    /// `0 <= current_quantity <= initial_quantity`
    pub fn invariants_hold(&self) -> bool {
        self.current_quantity >= 0 && self.current_quantity <= self.initial_quantity
    }
}
