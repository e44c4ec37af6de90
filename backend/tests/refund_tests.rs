//! Refund composition tests
//!
//! Walks the broken-item write-off path counter by counter, and covers
//! memo numbering, display staging guards and write-off pricing.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use pos_ledger_backend::models::{
    next_memo_number, unit_capital, BulkLot, CatalogItem, DisplayEntry, Product, RetailLot,
};
use shared::ledger::{apply_allocation, reverse_allocation, LedgerError};

const SKU: &str = "TUNA-250G";

fn ts(offset_min: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap() + Duration::minutes(offset_min)
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn bulk_lot(initial: i32) -> BulkLot {
    BulkLot {
        id: 1,
        batch_no: "B-2025-0001".to_string(),
        sku: None,
        cost_per_unit: dec("200.00"),
        price_per_unit: dec("320.00"),
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

fn retail_lot(staged: i32) -> RetailLot {
    RetailLot {
        id: 1,
        bulk_lot_id: 1,
        product_id: 1,
        variant_sku: SKU.to_string(),
        price_per_unit: dec("80.00"),
        quantity_value: 10,
        initial_qty: staged,
        sold_qty: 0,
        quantity_displayed: staged,
        quantity_displayed_to_pos: staged,
        quantity_displayed_to_inventory: 0,
        created_at: ts(0),
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
        price_per_unit: dec("80.00"),
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
fn broken_item_refund_writes_the_quantity_off_without_returning_it_to_pos() {
    let mut bulk = bulk_lot(100);
    let mut lot = retail_lot(5);
    let mut item = catalog(5);

    // Sale of 3 units
    apply_allocation(&mut lot, &mut item, &mut bulk, 3);
    assert_eq!(bulk.current_quantity, 70);

    // Refund 2 broken units. Step 1: restore the counters the sale debited.
    reverse_allocation(&mut lot, &mut item, &mut bulk, 2);
    assert!(lot.invariants_hold());

    // Step 2: the units will never be resold, pull them from the catalog.
    item.remove_stock(2);
    assert_eq!(item.qty_displayed, 2);
    assert_eq!(item.qty_sold, 0);

    // Step 3: take them off the POS channel.
    lot.unstage_pos(2);
    assert!(lot.invariants_hold());
    assert_eq!(lot.quantity_displayed_to_pos, 2);

    // Step 4: stage them on the inventory-display channel.
    lot.stage_display(2).unwrap();
    assert!(lot.invariants_hold());
    let mut entry = DisplayEntry {
        id: 1,
        retail_lot_id: lot.id,
        quantity_displayed: 2,
        quantity_sold: 0,
        is_sold_out: false,
        displayed_on: ts(120),
        displayed_by: "cashier1".to_string(),
        deleted_at: None,
        deleted_by: None,
    };

    // Step 5: release them through the "Out Items" write-off channel.
    entry.release(2).unwrap();
    lot.apply_display_release(2);
    bulk.debit(2 * lot.quantity_value);

    assert!(entry.is_sold_out);
    assert!(lot.invariants_hold());

    // The written-off units are sold from the ledger's point of view and
    // never reappear on the POS channel.
    assert_eq!(lot.sold_qty, 3);
    assert_eq!(lot.quantity_displayed, 2);
    assert_eq!(lot.quantity_displayed_to_pos, 2);
    assert_eq!(lot.quantity_displayed_to_inventory, 0);
    assert_eq!(bulk.current_quantity, 70);
    assert_eq!(item.qty_displayed, 2);
}

#[test]
fn write_off_is_priced_at_capital_not_retail() {
    let bulk = bulk_lot(100);
    let lot = retail_lot(5);
    // One purchased sack holds 100 base units; a retail unit consumes 10.
    let product = Product {
        id: 1,
        name: "Tuna Flakes".to_string(),
        unit_of_measure: "g".to_string(),
        unit_volume: 100,
        created_at: ts(0),
        created_by: "admin".to_string(),
        deleted_at: None,
        deleted_by: None,
    };

    let capital = unit_capital(bulk.cost_per_unit, product.unit_volume, lot.quantity_value);
    assert_eq!(capital, dec("20.00"));

    let write_off_total = Decimal::from(2) * capital;
    assert_eq!(write_off_total, dec("40.00"));
    assert_ne!(write_off_total, Decimal::from(2) * lot.price_per_unit);
}

#[test]
fn memo_numbers_continue_the_sequence() {
    assert_eq!(next_memo_number(None), "CM-000000001");
    assert_eq!(next_memo_number(Some("CM-000000009")), "CM-000000010");
    assert_eq!(next_memo_number(Some("CM-000000999")), "CM-000001000");
}

#[test]
fn staging_more_than_unsold_stock_is_rejected() {
    let mut lot = retail_lot(5);
    lot.sold_qty = 4;
    lot.quantity_displayed = 1;
    lot.quantity_displayed_to_pos = 1;

    let err = lot.stage_display(2).unwrap_err();
    assert_eq!(err, LedgerError::DisplayExceedsStock { available: 1 });
}

#[test]
fn releasing_more_than_displayed_is_rejected() {
    let mut entry = DisplayEntry {
        id: 1,
        retail_lot_id: 1,
        quantity_displayed: 1,
        quantity_sold: 0,
        is_sold_out: false,
        displayed_on: ts(0),
        displayed_by: "cashier1".to_string(),
        deleted_at: None,
        deleted_by: None,
    };

    let err = entry.release(2).unwrap_err();
    assert_eq!(err, LedgerError::ReleaseExceedsDisplay { displayed: 1 });
    assert_eq!(entry.quantity_displayed, 1);
    assert_eq!(entry.quantity_sold, 0);
}

#[test]
fn catalog_removal_floors_both_counters_at_zero() {
    let mut item = catalog(1);
    item.qty_sold = 1;
    item.remove_stock(3);
    assert_eq!(item.qty_displayed, 0);
    assert_eq!(item.qty_sold, 0);
}
