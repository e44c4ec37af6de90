//! Display channels: staging stock for sale and releasing it

use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

use shared::models::{unit_capital, variant_code, DisplayEntry, StockRelease};
use shared::types::SalesChannel;

use crate::error::{AppError, AppResult};
use crate::models::{DisplayEntryRow, StockReleaseRow};
use crate::services::stock;

/// Stage units of a retail lot on the POS channel, mirroring them into the
/// catalog
///
/// Creates the catalog entry on first display of a SKU; later displays of
/// the same active SKU only top up its displayed quantity. Returns the
/// catalog item id.
pub async fn add_to_pos(
    tx: &mut Transaction<'static, Postgres>,
    retail_lot_id: i32,
    qty: i32,
    actor: &str,
) -> AppResult<i32> {
    let mut lot = stock::fetch_retail_lot_for_update(tx, retail_lot_id).await?;
    lot.stage_pos(qty)?;
    stock::update_retail_lot_counters(tx, &lot, actor).await?;

    match stock::fetch_catalog_item_for_update(tx, &lot.variant_sku).await? {
        Some(mut item) if item.is_active => {
            item.qty_displayed += qty;
            stock::update_catalog_counters(tx, &item).await?;
            Ok(item.id)
        }
        _ => {
            let (batch_no, product_name, unit): (String, String, String) = sqlx::query_as(
                r#"
                SELECT b.batch_no, p.name, p.unit_of_measure
                FROM bulk_lots b
                JOIN products p ON p.id = b.product_id
                WHERE b.id = $1
                "#,
            )
            .bind(lot.bulk_lot_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Bulk lot".to_string()))?;

            let name = variant_code(&batch_no, &product_name, lot.quantity_value, &unit);
            let id = sqlx::query_scalar::<_, i32>(
                r#"
                INSERT INTO catalog_items (name, sku, price_per_unit, qty_displayed, qty_sold,
                                           is_active, created_by)
                VALUES ($1, $2, $3, $4, 0, TRUE, $5)
                RETURNING id
                "#,
            )
            .bind(&name)
            .bind(&lot.variant_sku)
            .bind(lot.price_per_unit)
            .bind(qty)
            .bind(actor)
            .fetch_one(&mut **tx)
            .await?;

            tracing::debug!(sku = %lot.variant_sku, catalog_item_id = id, "new SKU added to POS catalog");
            Ok(id)
        }
    }
}

/// Stage units of a retail lot on the inventory-display channel
///
/// Returns the id of the display entry created for this batch.
pub async fn mark_displayed(
    tx: &mut Transaction<'static, Postgres>,
    retail_lot_id: i32,
    qty: i32,
    actor: &str,
) -> AppResult<i32> {
    let mut lot = stock::fetch_retail_lot_for_update(tx, retail_lot_id).await?;
    lot.stage_display(qty)?;
    stock::update_retail_lot_counters(tx, &lot, actor).await?;

    let id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO display_entries (retail_lot_id, quantity_displayed, quantity_sold,
                                     is_sold_out, displayed_by)
        VALUES ($1, $2, 0, FALSE, $3)
        RETURNING id
        "#,
    )
    .bind(retail_lot_id)
    .bind(qty)
    .bind(actor)
    .fetch_one(&mut **tx)
    .await?;

    Ok(id)
}

/// Release units from a display entry through a sales channel
///
/// Debits the display entry, the lot's inventory channel and the bulk lot,
/// and records a stock release priced at capital: releases through
/// `SalesChannel::OutItems` represent loss, not revenue.
pub async fn release_stock(
    tx: &mut Transaction<'static, Postgres>,
    display_entry_id: i32,
    qty: i32,
    channel: SalesChannel,
    reason: Option<&str>,
    actor: &str,
) -> AppResult<StockRelease> {
    let entry_row = sqlx::query_as::<_, DisplayEntryRow>(
        r#"
        SELECT id, retail_lot_id, quantity_displayed, quantity_sold, is_sold_out,
               displayed_on, displayed_by, deleted_at, deleted_by
        FROM display_entries
        WHERE id = $1 AND deleted_at IS NULL
        FOR UPDATE
        "#,
    )
    .bind(display_entry_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Display item".to_string()))?;
    let mut entry: DisplayEntry = entry_row.into();

    let mut lot = stock::fetch_retail_lot_for_update(tx, entry.retail_lot_id).await?;
    if lot.sold_qty + qty > lot.initial_qty {
        return Err(AppError::Validation {
            field: "quantity".to_string(),
            message: "Cannot sell more than the available repacked quantity.".to_string(),
        });
    }

    let mut bulk = stock::fetch_bulk_lot_for_update(tx, lot.bulk_lot_id).await?;
    let required = qty * lot.quantity_value;
    if bulk.current_quantity < required {
        return Err(AppError::InsufficientStock {
            sku: lot.variant_sku.clone(),
            remaining: required - bulk.current_quantity,
        });
    }

    entry.release(qty)?;
    lot.apply_display_release(qty);
    bulk.debit(required);

    sqlx::query(
        r#"
        UPDATE display_entries
        SET quantity_displayed = $2, quantity_sold = $3, is_sold_out = $4
        WHERE id = $1
        "#,
    )
    .bind(entry.id)
    .bind(entry.quantity_displayed)
    .bind(entry.quantity_sold)
    .bind(entry.is_sold_out)
    .execute(&mut **tx)
    .await?;

    stock::update_retail_lot_counters(tx, &lot, actor).await?;
    stock::update_bulk_lot_quantity(tx, &bulk).await?;

    let unit_volume = sqlx::query_scalar::<_, i32>(
        "SELECT unit_volume FROM products WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(lot.product_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

    let capital = unit_capital(bulk.cost_per_unit, unit_volume, lot.quantity_value);
    let total_price = Decimal::from(qty) * capital;

    let release = sqlx::query_as::<_, StockReleaseRow>(
        r#"
        INSERT INTO stock_releases (bulk_lot_id, retail_lot_id, display_entry_id, quantity,
                                    total_price, sales_channel, reason, released_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, bulk_lot_id, retail_lot_id, display_entry_id, quantity, total_price,
                  sales_channel, reason, released_by, released_at, deleted_at, deleted_by
        "#,
    )
    .bind(bulk.id)
    .bind(lot.id)
    .bind(entry.id)
    .bind(qty)
    .bind(total_price)
    .bind(channel.as_str())
    .bind(reason)
    .bind(actor)
    .fetch_one(&mut **tx)
    .await?;

    tracing::debug!(
        sku = %lot.variant_sku,
        qty,
        channel = %channel,
        %total_price,
        "released stock from display"
    );
    Ok(release.into())
}
