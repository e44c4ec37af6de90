//! FIFO allocation engine

use sqlx::{Postgres, Transaction};

use shared::ledger;
use shared::models::{AllocationLine, RetailLot};

use crate::error::{AppError, AppResult};
use crate::models::{AllocationLineRow, RetailLotRow};
use crate::services::stock;

/// Allocate `requested_qty` units of `sku` to a transaction detail,
/// consuming retail lots oldest-first
///
/// Candidate lots are locked before the plan is computed so two concurrent
/// sales of the same SKU serialize on the storage layer. The retail lot,
/// catalog item and bulk lot counters move together; one allocation line is
/// emitted per lot touched. On `InsufficientStock` the enclosing atomic
/// unit discards every mutation made here.
pub async fn allocate_fifo(
    tx: &mut Transaction<'static, Postgres>,
    transaction_detail_id: i32,
    sku: &str,
    requested_qty: i32,
    actor: &str,
) -> AppResult<Vec<AllocationLine>> {
    let lot_rows = sqlx::query_as::<_, RetailLotRow>(
        r#"
        SELECT id, bulk_lot_id, product_id, variant_sku, price_per_unit, quantity_value,
               initial_qty, sold_qty, quantity_displayed, quantity_displayed_to_pos,
               quantity_displayed_to_inventory, created_at, created_by, updated_at,
               updated_by, deleted_at, deleted_by
        FROM retail_lots
        WHERE variant_sku = $1
          AND quantity_displayed_to_pos > 0
          AND initial_qty - sold_qty > 0
          AND deleted_at IS NULL
        ORDER BY created_at ASC, id ASC
        FOR UPDATE
        "#,
    )
    .bind(sku)
    .fetch_all(&mut **tx)
    .await?;

    let mut lots: Vec<RetailLot> = lot_rows.into_iter().map(Into::into).collect();
    let plan = ledger::plan_fifo(sku, &lots, requested_qty)?;

    let mut catalog = stock::fetch_catalog_item_for_update(tx, sku)
        .await?
        .ok_or_else(|| AppError::NotFound("Catalog item".to_string()))?;

    let mut allocations = Vec::with_capacity(plan.len());

    for step in plan {
        let lot = lots
            .iter_mut()
            .find(|l| l.id == step.retail_lot_id)
            .ok_or_else(|| AppError::NotFound("Retail lot".to_string()))?;

        let mut bulk = stock::fetch_bulk_lot_for_update(tx, lot.bulk_lot_id).await?;
        ledger::apply_allocation(lot, &mut catalog, &mut bulk, step.qty);

        stock::update_retail_lot_counters(tx, lot, actor).await?;
        stock::update_bulk_lot_quantity(tx, &bulk).await?;

        let line = sqlx::query_as::<_, AllocationLineRow>(
            r#"
            INSERT INTO allocation_lines (transaction_detail_id, retail_lot_id, allocated_qty, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, transaction_detail_id, retail_lot_id, allocated_qty, is_voided,
                      created_at, created_by, updated_at, updated_by, deleted_at, deleted_by
            "#,
        )
        .bind(transaction_detail_id)
        .bind(step.retail_lot_id)
        .bind(step.qty)
        .bind(actor)
        .fetch_one(&mut **tx)
        .await?;

        tracing::debug!(
            sku,
            retail_lot_id = step.retail_lot_id,
            qty = step.qty,
            "allocated retail lot to transaction detail {transaction_detail_id}"
        );
        allocations.push(line.into());
    }

    stock::update_catalog_counters(tx, &catalog).await?;

    Ok(allocations)
}
