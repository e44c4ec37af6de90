//! Pure FIFO allocation and reversal arithmetic
//!
//! The storage services load rows, hand them to these functions, and write
//! the mutated counters back inside one transaction. Keeping the arithmetic
//! here keeps the quantity invariants testable without a database.

use thiserror::Error;

use crate::models::{BulkLot, CatalogItem, RetailLot};

/// Business-rule failures raised by the ledger arithmetic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Requested quantity must be positive, got {0}.")]
    InvalidQuantity(i32),

    #[error("Not enough stock for SKU {sku}. Remaining qty: {remaining}")]
    InsufficientStock { sku: String, remaining: i32 },

    #[error("Refund quantity exceeds allocated quantity.")]
    RefundExceedsAllocation,

    #[error("{what} is already voided.")]
    AlreadyVoided { what: String },

    #[error("Credit memo {memo_number} covers a written-off item and cannot be reverted.")]
    BrokenItemNotRevertible { memo_number: String },

    #[error("Quantity exceeds the available stock. Available: {available}")]
    DisplayExceedsStock { available: i32 },

    #[error("Item to be released exceeds the displayed quantity. Displayed: {displayed}")]
    ReleaseExceedsDisplay { displayed: i32 },
}

/// One step of a FIFO allocation plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAllocation {
    pub retail_lot_id: i32,
    pub qty: i32,
}

/// Plan a FIFO allocation of `requested_qty` units across `lots`
///
/// Candidates are consumed oldest-first with the lot id as a deterministic
/// tie-break. A lot contributes `min(quantity_displayed_to_pos,
/// quantity_displayed)` units. Planning is all-or-nothing: if the candidates
/// run dry before the request is satisfied, no plan is returned.
pub fn plan_fifo(
    sku: &str,
    lots: &[RetailLot],
    requested_qty: i32,
) -> Result<Vec<PlannedAllocation>, LedgerError> {
    if requested_qty <= 0 {
        return Err(LedgerError::InvalidQuantity(requested_qty));
    }

    let mut candidates: Vec<&RetailLot> = lots
        .iter()
        .filter(|l| l.deleted_at.is_none() && l.variant_sku == sku)
        .filter(|l| l.quantity_displayed_to_pos > 0 && l.remaining() > 0)
        .collect();
    candidates.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let mut remaining = requested_qty;
    let mut plan = Vec::new();

    for lot in candidates {
        let available = lot.pos_available();
        if available <= 0 {
            continue;
        }
        let allocate = available.min(remaining);
        plan.push(PlannedAllocation {
            retail_lot_id: lot.id,
            qty: allocate,
        });
        remaining -= allocate;
        if remaining == 0 {
            break;
        }
    }

    if remaining > 0 {
        return Err(LedgerError::InsufficientStock {
            sku: sku.to_string(),
            remaining,
        });
    }

    Ok(plan)
}

/// Debit all three counters for one allocation step
///
/// The bulk lot moves in base units (`qty * quantity_value`) and never
/// independently of the retail lot.
pub fn apply_allocation(lot: &mut RetailLot, catalog: &mut CatalogItem, bulk: &mut BulkLot, qty: i32) {
    lot.apply_sale(qty);
    catalog.apply_sale(qty);
    bulk.debit(qty * lot.quantity_value);
}

/// Credit all three counters back for one allocation step (void/refund)
pub fn reverse_allocation(
    lot: &mut RetailLot,
    catalog: &mut CatalogItem,
    bulk: &mut BulkLot,
    qty: i32,
) {
    lot.restore_sale(qty);
    catalog.restore_sale(qty);
    bulk.credit(qty * lot.quantity_value);
}

/// Cumulative-refund guard for a partial void
///
/// `existing_refunded` is the quantity already covered by non-voided credit
/// memos for the detail. The line is marked fully voided only once the
/// cumulative refunds consume its whole allocation.
pub fn check_refund_bound(
    existing_refunded: i32,
    refund_qty: i32,
    allocated_qty: i32,
) -> Result<bool, LedgerError> {
    let total_voided = existing_refunded + refund_qty;
    if total_voided > allocated_qty {
        return Err(LedgerError::RefundExceedsAllocation);
    }
    Ok(total_voided == allocated_qty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn lot(id: i32, created_offset_s: i64, to_pos: i32, initial: i32) -> RetailLot {
        RetailLot {
            id,
            bulk_lot_id: 1,
            product_id: 1,
            variant_sku: "SKU-1".into(),
            price_per_unit: Decimal::from(80),
            quantity_value: 10,
            initial_qty: initial,
            sold_qty: 0,
            quantity_displayed: to_pos,
            quantity_displayed_to_pos: to_pos,
            quantity_displayed_to_inventory: 0,
            created_at: Utc.timestamp_opt(1_700_000_000 + created_offset_s, 0).unwrap(),
            created_by: "tester".into(),
            updated_at: None,
            updated_by: None,
            deleted_at: None,
            deleted_by: None,
        }
    }

    #[test]
    fn oldest_lot_is_consumed_first() {
        let lots = vec![lot(2, 60, 5, 5), lot(1, 0, 5, 5)];
        let plan = plan_fifo("SKU-1", &lots, 3).unwrap();
        assert_eq!(plan, vec![PlannedAllocation { retail_lot_id: 1, qty: 3 }]);
    }

    #[test]
    fn equal_timestamps_break_ties_by_id() {
        let lots = vec![lot(9, 0, 5, 5), lot(3, 0, 5, 5)];
        let plan = plan_fifo("SKU-1", &lots, 2).unwrap();
        assert_eq!(plan[0].retail_lot_id, 3);
    }

    #[test]
    fn request_spills_over_to_the_next_lot() {
        let lots = vec![lot(1, 0, 2, 2), lot(2, 60, 5, 5)];
        let plan = plan_fifo("SKU-1", &lots, 4).unwrap();
        assert_eq!(
            plan,
            vec![
                PlannedAllocation { retail_lot_id: 1, qty: 2 },
                PlannedAllocation { retail_lot_id: 2, qty: 2 },
            ]
        );
    }

    #[test]
    fn exhausted_candidates_fail_with_remainder() {
        let lots = vec![lot(1, 0, 2, 2)];
        let err = plan_fifo("SKU-1", &lots, 5).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientStock { sku: "SKU-1".into(), remaining: 3 }
        );
    }

    #[test]
    fn non_positive_requests_are_rejected() {
        let lots = vec![lot(1, 0, 5, 5)];
        assert_eq!(plan_fifo("SKU-1", &lots, 0).unwrap_err(), LedgerError::InvalidQuantity(0));
        assert_eq!(plan_fifo("SKU-1", &lots, -4).unwrap_err(), LedgerError::InvalidQuantity(-4));
    }

    #[test]
    fn deleted_lots_are_never_candidates() {
        let mut dead = lot(1, 0, 5, 5);
        dead.deleted_at = Some(Utc.timestamp_opt(1_700_000_100, 0).unwrap());
        let lots = vec![dead, lot(2, 60, 5, 5)];
        let plan = plan_fifo("SKU-1", &lots, 3).unwrap();
        assert_eq!(plan[0].retail_lot_id, 2);
    }

    #[test]
    fn refund_bound_marks_line_voided_at_full_consumption() {
        assert_eq!(check_refund_bound(1, 2, 3).unwrap(), true);
        assert_eq!(check_refund_bound(0, 2, 3).unwrap(), false);
        assert_eq!(
            check_refund_bound(2, 2, 3).unwrap_err(),
            LedgerError::RefundExceedsAllocation
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// A successful plan always sums to the request
            #[test]
            fn prop_plan_total_equals_request(
                staged in proptest::collection::vec(1i32..=15, 1..5),
                requested in 1i32..=40
            ) {
                let lots: Vec<RetailLot> = staged
                    .iter()
                    .enumerate()
                    .map(|(i, &s)| lot(i as i32 + 1, i as i64 * 30, s, s))
                    .collect();

                if let Ok(plan) = plan_fifo("SKU-1", &lots, requested) {
                    prop_assert_eq!(plan.iter().map(|p| p.qty).sum::<i32>(), requested);
                }
            }
        }
    }
}
