//! Display entry model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// A batch of retail units staged on the inventory-display channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayEntry {
    pub id: i32,
    pub retail_lot_id: i32,
    pub quantity_displayed: i32,
    pub quantity_sold: i32,
    pub is_sold_out: bool,
    pub displayed_on: DateTime<Utc>,
    pub displayed_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

impl DisplayEntry {
    /// Release units from this entry; flips the sold-out flag when drained
    pub fn release(&mut self, qty: i32) -> Result<(), LedgerError> {
        if self.quantity_displayed < qty {
            return Err(LedgerError::ReleaseExceedsDisplay {
                displayed: self.quantity_displayed,
            });
        }
        self.quantity_displayed -= qty;
        self.quantity_sold += qty;
        if self.quantity_displayed == 0 {
            self.is_sold_out = true;
        }
        Ok(())
    }
}
