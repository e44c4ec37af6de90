//! Retail lot model and counter arithmetic

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// A repacked, sellable quantity derived from a bulk lot
///
/// Three display counters split the lot across channels and must satisfy
/// `quantity_displayed = quantity_displayed_to_pos +
/// quantity_displayed_to_inventory` after every mutation. `created_at` is the
/// FIFO ordering key for allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetailLot {
    pub id: i32,
    pub bulk_lot_id: i32,
    pub product_id: i32,
    /// Variant SKU sold at the POS; shared by lots repacked the same way
    pub variant_sku: String,
    pub price_per_unit: Decimal,
    /// Base units of bulk stock consumed per retail unit
    pub quantity_value: i32,
    /// Retail units produced by the repack
    pub initial_qty: i32,
    pub sold_qty: i32,
    /// Units visible to any channel
    pub quantity_displayed: i32,
    pub quantity_displayed_to_pos: i32,
    pub quantity_displayed_to_inventory: i32,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

impl RetailLot {
    /// Retail units not yet sold
    pub fn remaining(&self) -> i32 {
        self.initial_qty - self.sold_qty
    }

    /// Units a POS sale may take from this lot
    pub fn pos_available(&self) -> i32 {
        self.quantity_displayed_to_pos.min(self.quantity_displayed)
    }

    /// Consume units through the POS channel
    pub fn apply_sale(&mut self, qty: i32) {
        self.quantity_displayed_to_pos -= qty;
        self.quantity_displayed -= qty;
        self.sold_qty += qty;
    }

    /// Return units to the POS channel (void/refund); sold quantity floors at 0
    pub fn restore_sale(&mut self, qty: i32) {
        self.quantity_displayed_to_pos += qty;
        self.quantity_displayed += qty;
        self.sold_qty = (self.sold_qty - qty).max(0);
    }

    /// Take units back off the POS channel entirely
    ///
    /// Used when refunded units must not stay sellable; they can be
    /// re-staged on the inventory channel afterwards.
    pub fn unstage_pos(&mut self, qty: i32) {
        self.quantity_displayed -= qty;
        self.quantity_displayed_to_pos -= qty;
    }

    /// Stage units on the inventory-display channel
    pub fn stage_display(&mut self, qty: i32) -> Result<(), LedgerError> {
        let available = self.remaining();
        let new_total = self.quantity_displayed + qty;
        if available <= 0 || qty <= 0 || new_total > available {
            return Err(LedgerError::DisplayExceedsStock { available });
        }
        self.quantity_displayed_to_inventory += qty;
        self.quantity_displayed = new_total;
        Ok(())
    }

    /// Stage units on the POS channel
    pub fn stage_pos(&mut self, qty: i32) -> Result<(), LedgerError> {
        let available = self.remaining();
        let new_total = self.quantity_displayed + qty;
        if available <= 0 || qty <= 0 || new_total > available {
            return Err(LedgerError::DisplayExceedsStock { available });
        }
        self.quantity_displayed_to_pos += qty;
        self.quantity_displayed = new_total;
        Ok(())
    }

    /// Consume units released from the inventory-display channel
    pub fn apply_display_release(&mut self, qty: i32) {
        self.quantity_displayed_to_inventory -= qty;
        self.sold_qty += qty;
        self.quantity_displayed -= qty;
    }

    /// Channel split and stock bounds hold
    pub fn invariants_hold(&self) -> bool {
        self.quantity_displayed
            == self.quantity_displayed_to_pos + self.quantity_displayed_to_inventory
            && self.sold_qty <= self.initial_qty
            && self.sold_qty + self.quantity_displayed <= self.initial_qty
            && self.sold_qty >= 0
            && self.quantity_displayed >= 0
    }
}

/// Human-readable variant code, e.g. "B-2025-0381--Tuna Flakes--250-g"
pub fn variant_code(batch_no: &str, product_name: &str, quantity_value: i32, unit: &str) -> String {
    format!("{}--{}--{}-{}", batch_no, product_name, quantity_value, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_code_joins_identity_fields() {
        assert_eq!(
            variant_code("B-01", "Tuna Flakes", 250, "g"),
            "B-01--Tuna Flakes--250-g"
        );
    }
}
