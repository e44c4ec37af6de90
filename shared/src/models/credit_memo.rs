//! Credit memo model and numbering

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// A refund record, optionally tied to a compensating write-off sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditMemo {
    pub id: i32,
    /// Sequential human-readable number, e.g. "CM-000000042"
    pub memo_number: String,
    pub transaction_detail_id: i32,
    /// Receipt number of the originating sale
    pub or_number: String,
    pub sku: String,
    pub product_name: String,
    /// Set only when a broken-item refund produced an "Out Items" write-off
    pub sale_id: Option<i32>,
    pub qty: i32,
    /// Unit price refunded
    pub amount: Decimal,
    pub total_amount: Decimal,
    pub reason: Option<String>,
    pub is_broken: bool,
    pub is_voided: bool,
    pub issued_by: String,
    pub issued_at: DateTime<Utc>,
}

impl CreditMemo {
    /// A memo can be reverted only once, and never for a written-off item
    pub fn ensure_revertible(&self) -> Result<(), LedgerError> {
        if self.is_broken {
            return Err(LedgerError::BrokenItemNotRevertible {
                memo_number: self.memo_number.clone(),
            });
        }
        if self.is_voided {
            return Err(LedgerError::AlreadyVoided {
                what: format!("credit memo {}", self.memo_number),
            });
        }
        Ok(())
    }
}

/// Next memo number after the latest issued one
///
/// Numbers are "CM-" followed by a zero-padded 9-digit sequence; an
/// unparseable latest number restarts the sequence at 1.
pub fn next_memo_number(last: Option<&str>) -> String {
    let next = last
        .and_then(|n| n.strip_prefix("CM-"))
        .and_then(|n| n.parse::<u32>().ok())
        .map(|n| n + 1)
        .unwrap_or(1);
    format!("CM-{:09}", next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memo_numbers_are_sequential() {
        assert_eq!(next_memo_number(None), "CM-000000001");
        assert_eq!(next_memo_number(Some("CM-000000041")), "CM-000000042");
    }

    #[test]
    fn unparseable_memo_number_restarts_sequence() {
        assert_eq!(next_memo_number(Some("garbage")), "CM-000000001");
    }
}
