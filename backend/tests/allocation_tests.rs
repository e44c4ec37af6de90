//! FIFO allocation tests
//!
//! Exercises the allocation arithmetic the engine applies inside its
//! transaction: candidate ordering, spill-over, all-or-nothing failure,
//! and the linked four-counter debit.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use pos_ledger_backend::models::{BulkLot, CatalogItem, RetailLot};
use shared::ledger::{apply_allocation, plan_fifo, LedgerError, PlannedAllocation};

const SKU: &str = "TUNA-250G";

fn ts(offset_min: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap() + Duration::minutes(offset_min)
}

fn bulk_lot(initial: i32) -> BulkLot {
    BulkLot {
        id: 1,
        batch_no: "B-2025-0001".to_string(),
        sku: None,
        cost_per_unit: Decimal::new(20000, 2),
        price_per_unit: Decimal::new(32000, 2),
        initial_quantity: initial,
        current_quantity: initial,
        product_id: 1,
        supplier_id: 1,
        expiry_date: None,
        created_at: ts(0),
        created_by: "receiver".to_string(),
        deleted_at: None,
        deleted_by: None,
    }
}

/// A lot with `staged` units staged on the POS channel
fn retail_lot(id: i32, offset_min: i64, quantity_value: i32, initial: i32, staged: i32) -> RetailLot {
    RetailLot {
        id,
        bulk_lot_id: 1,
        product_id: 1,
        variant_sku: SKU.to_string(),
        price_per_unit: Decimal::new(8000, 2),
        quantity_value,
        initial_qty: initial,
        sold_qty: 0,
        quantity_displayed: staged,
        quantity_displayed_to_pos: staged,
        quantity_displayed_to_inventory: 0,
        created_at: ts(offset_min),
        created_by: "repacker".to_string(),
        updated_at: None,
        updated_by: None,
        deleted_at: None,
        deleted_by: None,
    }
}

fn catalog(displayed: i32) -> CatalogItem {
    CatalogItem {
        id: 1,
        name: "B-2025-0001--Tuna Flakes--250-g".to_string(),
        sku: SKU.to_string(),
        price_per_unit: Decimal::new(8000, 2),
        qty_displayed: displayed,
        qty_sold: 0,
        is_active: true,
        created_at: ts(0),
        created_by: Some("repacker".to_string()),
        deleted_at: None,
        deleted_by: None,
    }
}

#[test]
fn allocation_debits_all_four_counters_together() {
    // 100 base units of bulk stock, one lot of 5 retail units at 10 base
    // units apiece, all staged on the POS channel.
    let mut bulk = bulk_lot(100);
    let mut lot = retail_lot(1, 0, 10, 5, 5);
    let mut item = catalog(5);

    let plan = plan_fifo(SKU, std::slice::from_ref(&lot), 3).unwrap();
    assert_eq!(plan, vec![PlannedAllocation { retail_lot_id: 1, qty: 3 }]);

    apply_allocation(&mut lot, &mut item, &mut bulk, 3);

    assert_eq!(lot.sold_qty, 3);
    assert_eq!(lot.quantity_displayed, 2);
    assert_eq!(lot.quantity_displayed_to_pos, 2);
    assert_eq!(item.qty_sold, 3);
    assert_eq!(item.qty_displayed, 2);
    assert_eq!(bulk.current_quantity, 70);

    assert!(lot.invariants_hold());
    assert!(item.invariants_hold());
    assert!(bulk.invariants_hold());
}

#[test]
fn request_satisfiable_by_oldest_lot_never_touches_newer_ones() {
    let older = retail_lot(7, 0, 10, 5, 5);
    let newer = retail_lot(2, 90, 10, 5, 5);
    let plan = plan_fifo(SKU, &[newer, older], 5).unwrap();

    assert_eq!(plan, vec![PlannedAllocation { retail_lot_id: 7, qty: 5 }]);
}

#[test]
fn oversized_request_spills_across_lots_in_creation_order() {
    let lots = vec![
        retail_lot(1, 0, 10, 2, 2),
        retail_lot(2, 30, 10, 4, 4),
        retail_lot(3, 60, 10, 4, 4),
    ];
    let plan = plan_fifo(SKU, &lots, 7).unwrap();

    assert_eq!(
        plan,
        vec![
            PlannedAllocation { retail_lot_id: 1, qty: 2 },
            PlannedAllocation { retail_lot_id: 2, qty: 4 },
            PlannedAllocation { retail_lot_id: 3, qty: 1 },
        ]
    );
}

#[test]
fn inventory_channel_units_are_not_sellable_at_pos() {
    // 5 displayed, but only 3 staged on the POS channel
    let mut lot = retail_lot(1, 0, 10, 5, 3);
    lot.quantity_displayed_to_inventory = 2;
    lot.quantity_displayed = 5;
    assert!(lot.invariants_hold());

    let err = plan_fifo(SKU, std::slice::from_ref(&lot), 4).unwrap_err();
    assert_eq!(
        err,
        LedgerError::InsufficientStock { sku: SKU.to_string(), remaining: 1 }
    );
}

#[test]
fn exhausted_candidates_fail_without_a_partial_plan() {
    let lots = vec![retail_lot(1, 0, 10, 2, 2), retail_lot(2, 30, 10, 2, 2)];
    let err = plan_fifo(SKU, &lots, 10).unwrap_err();

    assert_eq!(
        err,
        LedgerError::InsufficientStock { sku: SKU.to_string(), remaining: 6 }
    );
}

#[test]
fn zero_and_negative_requests_are_rejected() {
    let lots = vec![retail_lot(1, 0, 10, 5, 5)];
    assert_eq!(plan_fifo(SKU, &lots, 0).unwrap_err(), LedgerError::InvalidQuantity(0));
    assert_eq!(plan_fifo(SKU, &lots, -2).unwrap_err(), LedgerError::InvalidQuantity(-2));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A successful plan covers the request exactly and never overdraws a lot
    #[test]
    fn prop_plan_covers_request_within_lot_bounds(
        staged in prop::collection::vec(1i32..=20, 1..6),
        requested in 1i32..=60
    ) {
        let lots: Vec<RetailLot> = staged
            .iter()
            .enumerate()
            .map(|(i, &s)| retail_lot(i as i32 + 1, i as i64 * 10, 10, s, s))
            .collect();

        match plan_fifo(SKU, &lots, requested) {
            Ok(plan) => {
                let total: i32 = plan.iter().map(|p| p.qty).sum();
                prop_assert_eq!(total, requested);
                for step in &plan {
                    let lot = lots.iter().find(|l| l.id == step.retail_lot_id).unwrap();
                    prop_assert!(step.qty > 0);
                    prop_assert!(step.qty <= lot.pos_available());
                }
            }
            Err(LedgerError::InsufficientStock { remaining, .. }) => {
                let available: i32 = lots.iter().map(|l| l.pos_available()).sum();
                prop_assert_eq!(remaining, requested - available);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
        }
    }

    /// Planned consumption follows the (created_at, id) total order
    #[test]
    fn prop_plan_respects_fifo_order(
        staged in prop::collection::vec(1i32..=10, 2..6),
        requested in 1i32..=30
    ) {
        let lots: Vec<RetailLot> = staged
            .iter()
            .enumerate()
            .map(|(i, &s)| retail_lot(i as i32 + 1, i as i64 * 10, 10, s, s))
            .collect();

        if let Ok(plan) = plan_fifo(SKU, &lots, requested) {
            // Every lot before the last planned one must be drained
            for window in plan.windows(2) {
                let first = lots.iter().find(|l| l.id == window[0].retail_lot_id).unwrap();
                prop_assert_eq!(window[0].qty, first.pos_available());
                prop_assert!(window[0].retail_lot_id < window[1].retail_lot_id);
            }
        }
    }

    /// Repeated sell-out never pushes sold quantities past the repacked stock
    #[test]
    fn prop_total_allocated_never_exceeds_initial_stock(
        staged in prop::collection::vec(1i32..=10, 1..5),
        requests in prop::collection::vec(1i32..=8, 1..10)
    ) {
        let mut bulk = bulk_lot(10_000);
        let mut item = catalog(staged.iter().sum());
        let mut lots: Vec<RetailLot> = staged
            .iter()
            .enumerate()
            .map(|(i, &s)| retail_lot(i as i32 + 1, i as i64 * 10, 10, s, s))
            .collect();

        for &requested in &requests {
            let plan = match plan_fifo(SKU, &lots, requested) {
                Ok(plan) => plan,
                Err(_) => continue,
            };
            for step in plan {
                let lot = lots.iter_mut().find(|l| l.id == step.retail_lot_id).unwrap();
                apply_allocation(lot, &mut item, &mut bulk, step.qty);
            }
        }

        let total_sold: i32 = lots.iter().map(|l| l.sold_qty).sum();
        let total_initial: i32 = lots.iter().map(|l| l.initial_qty).sum();
        prop_assert!(total_sold <= total_initial);
        for lot in &lots {
            prop_assert!(lot.invariants_hold());
        }
        prop_assert!(item.invariants_hold());
        prop_assert!(bulk.invariants_hold());
    }
}
