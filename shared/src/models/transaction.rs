//! POS transaction models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A completed POS receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionHeader {
    pub id: i32,
    /// Official receipt number, unique per terminal sequence
    pub or_number: String,
    pub transaction_date: DateTime<Utc>,
    pub payment_method: String,
    pub regular_discount: Decimal,
    pub statutory_discount: Decimal,
    pub vat_included: Decimal,
    pub vat_excluded: Decimal,
    pub total_amount: Decimal,
    pub amount_tendered: Decimal,
    pub change_amount: Decimal,
    pub cashier_name: String,
    pub terminal_id: String,
    /// Raw cart snapshot as submitted by the terminal
    pub cart: serde_json::Value,
    pub is_voided: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

/// One line of a POS receipt
///
/// Only regular-item lines move stock; discount lines ride along for the
/// receipt total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub id: i32,
    pub transaction_header_id: i32,
    pub name: String,
    pub sku: String,
    pub qty: Decimal,
    pub price_per_unit: Decimal,
    pub is_regular_item: bool,
    pub is_discount: bool,
    pub is_statutory_discountable: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

/// Next receipt sequence after the latest issued OR number
///
/// OR numbers end in a dash-separated numeric segment
/// (e.g. "SC01-001-000000123"); an unparseable latest number restarts at 1.
pub fn next_receipt_sequence(last_or_number: Option<&str>) -> i64 {
    last_or_number
        .and_then(|n| n.rsplit('-').next())
        .and_then(|n| n.parse::<i64>().ok())
        .map(|n| n + 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_sequence_parses_last_segment() {
        assert_eq!(next_receipt_sequence(Some("SC01-001-000000123")), 124);
        assert_eq!(next_receipt_sequence(None), 1);
        assert_eq!(next_receipt_sequence(Some("no-numeric-tail")), 1);
    }
}
