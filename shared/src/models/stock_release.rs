//! Stock release model and capital pricing

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A quantity released out of display inventory through a sales channel
///
/// Releases through the "Out Items" channel are write-offs: `total_price`
/// carries the capital lost, not revenue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRelease {
    pub id: i32,
    pub bulk_lot_id: Option<i32>,
    pub retail_lot_id: Option<i32>,
    pub display_entry_id: Option<i32>,
    pub quantity: i32,
    pub total_price: Decimal,
    pub sales_channel: String,
    pub reason: Option<String>,
    pub released_by: String,
    pub released_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

/// Capital tied up in one retail unit
///
/// The bulk cost covers `unit_volume` base units; a retail unit consumes
/// `quantity_value` of them.
pub fn unit_capital(cost_per_unit: Decimal, unit_volume: i32, quantity_value: i32) -> Decimal {
    (cost_per_unit / Decimal::from(unit_volume)) * Decimal::from(quantity_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn unit_capital_scales_cost_by_pack_size() {
        // A 1000 g sack costing 200.00 repacked into 250 g retail units
        let capital = unit_capital(Decimal::from_str("200.00").unwrap(), 1000, 250);
        assert_eq!(capital, Decimal::from_str("50.00").unwrap());
    }
}
