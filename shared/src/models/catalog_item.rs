//! Catalog item model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The POS-facing product entry a cashier sees
///
/// Aggregates the POS-visible quantity of every retail lot sharing a SKU;
/// not lot-specific.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i32,
    pub name: String,
    pub sku: String,
    pub price_per_unit: Decimal,
    pub qty_displayed: i32,
    pub qty_sold: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

impl CatalogItem {
    /// Consume displayed units on a sale
    pub fn apply_sale(&mut self, qty: i32) {
        self.qty_sold += qty;
        self.qty_displayed -= qty;
    }

    /// Return units on a void/refund
    pub fn restore_sale(&mut self, qty: i32) {
        self.qty_sold -= qty;
        self.qty_displayed += qty;
    }

    /// Pull refunded units out of the catalog entirely; both counters floor at 0
    pub fn remove_stock(&mut self, qty: i32) {
        self.qty_displayed = (self.qty_displayed - qty).max(0);
        self.qty_sold = (self.qty_sold - qty).max(0);
    }

    pub fn invariants_hold(&self) -> bool {
        self.qty_displayed >= 0 && self.qty_sold >= 0
    }
}
