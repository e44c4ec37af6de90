//! Shared row access for the allocation and reversal engines
//!
//! All reads here lock the row (`FOR UPDATE`) so concurrent operations on
//! the same stock serialize inside the storage layer, and all writes carry
//! the actor stamp.

use sqlx::{Postgres, Transaction};

use crate::error::{AppError, AppResult};
use crate::models::{BulkLot, BulkLotRow, CatalogItem, CatalogItemRow, RetailLot, RetailLotRow};

pub(crate) async fn fetch_retail_lot_for_update(
    tx: &mut Transaction<'static, Postgres>,
    retail_lot_id: i32,
) -> AppResult<RetailLot> {
    let row = sqlx::query_as::<_, RetailLotRow>(
        r#"
        SELECT id, bulk_lot_id, product_id, variant_sku, price_per_unit, quantity_value,
               initial_qty, sold_qty, quantity_displayed, quantity_displayed_to_pos,
               quantity_displayed_to_inventory, created_at, created_by, updated_at,
               updated_by, deleted_at, deleted_by
        FROM retail_lots
        WHERE id = $1 AND deleted_at IS NULL
        FOR UPDATE
        "#,
    )
    .bind(retail_lot_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Retail lot".to_string()))?;

    Ok(row.into())
}

pub(crate) async fn fetch_bulk_lot_for_update(
    tx: &mut Transaction<'static, Postgres>,
    bulk_lot_id: i32,
) -> AppResult<BulkLot> {
    let row = sqlx::query_as::<_, BulkLotRow>(
        r#"
        SELECT id, batch_no, sku, cost_per_unit, price_per_unit, initial_quantity,
               current_quantity, product_id, supplier_id, expiry_date, created_at,
               created_by, deleted_at, deleted_by
        FROM bulk_lots
        WHERE id = $1 AND deleted_at IS NULL
        FOR UPDATE
        "#,
    )
    .bind(bulk_lot_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Bulk lot".to_string()))?;

    Ok(row.into())
}

pub(crate) async fn fetch_catalog_item_for_update(
    tx: &mut Transaction<'static, Postgres>,
    sku: &str,
) -> AppResult<Option<CatalogItem>> {
    let row = sqlx::query_as::<_, CatalogItemRow>(
        r#"
        SELECT id, name, sku, price_per_unit, qty_displayed, qty_sold, is_active,
               created_at, created_by, deleted_at, deleted_by
        FROM catalog_items
        WHERE sku = $1 AND deleted_at IS NULL
        ORDER BY id DESC
        LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(sku)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(Into::into))
}

pub(crate) async fn update_retail_lot_counters(
    tx: &mut Transaction<'static, Postgres>,
    lot: &RetailLot,
    actor: &str,
) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE retail_lots
        SET sold_qty = $2,
            quantity_displayed = $3,
            quantity_displayed_to_pos = $4,
            quantity_displayed_to_inventory = $5,
            updated_at = NOW(),
            updated_by = $6
        WHERE id = $1
        "#,
    )
    .bind(lot.id)
    .bind(lot.sold_qty)
    .bind(lot.quantity_displayed)
    .bind(lot.quantity_displayed_to_pos)
    .bind(lot.quantity_displayed_to_inventory)
    .bind(actor)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub(crate) async fn update_bulk_lot_quantity(
    tx: &mut Transaction<'static, Postgres>,
    bulk: &BulkLot,
) -> AppResult<()> {
    sqlx::query("UPDATE bulk_lots SET current_quantity = $2 WHERE id = $1")
        .bind(bulk.id)
        .bind(bulk.current_quantity)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

pub(crate) async fn update_catalog_counters(
    tx: &mut Transaction<'static, Postgres>,
    item: &CatalogItem,
) -> AppResult<()> {
    sqlx::query("UPDATE catalog_items SET qty_displayed = $2, qty_sold = $3 WHERE id = $1")
        .bind(item.id)
        .bind(item.qty_displayed)
        .bind(item.qty_sold)
        .execute(&mut **tx)
        .await?;

    Ok(())
}
