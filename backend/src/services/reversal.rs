//! Reversal engine: voids, partial refunds and credit-memo reversal

use sqlx::{Postgres, Transaction};

use shared::ledger;
use shared::models::{AllocationLine, CreditMemo};

use crate::error::{AppError, AppResult};
use crate::models::AllocationLineRow;
use crate::services::stock;

/// Fully reverse every allocation line tied to a transaction detail
///
/// Used when an entire sale is voided; the caller is responsible for
/// checking that no credit memo references the receipt. A detail with no
/// allocation lines (a discount line) is a no-op.
pub async fn void_transaction_detail(
    tx: &mut Transaction<'static, Postgres>,
    transaction_detail_id: i32,
    actor: &str,
) -> AppResult<()> {
    let lines = fetch_lines_for_update(tx, transaction_detail_id).await?;
    if lines.is_empty() {
        return Ok(());
    }

    for line in &lines {
        restore_counters(tx, line, line.allocated_qty, actor).await?;
        mark_line_voided(tx, line.id, true, actor).await?;
    }

    tracing::debug!(
        transaction_detail_id,
        lines = lines.len(),
        "voided transaction detail"
    );
    Ok(())
}

/// Reverse a bounded quantity of a detail's allocations for a refund
///
/// The cumulative quantity across non-voided credit memos plus this refund
/// must not exceed the allocated quantity; a line is flagged voided only
/// once the cumulative refunds consume its whole allocation.
pub async fn partial_void_for_refund(
    tx: &mut Transaction<'static, Postgres>,
    transaction_detail_id: i32,
    refund_qty: i32,
    actor: &str,
) -> AppResult<()> {
    let lines = fetch_lines_for_update(tx, transaction_detail_id).await?;
    if lines.is_empty() {
        return Ok(());
    }

    let existing_refunded = refunded_qty(tx, transaction_detail_id).await?;

    for line in &lines {
        let fully_voided =
            ledger::check_refund_bound(existing_refunded, refund_qty, line.allocated_qty)?;
        restore_counters(tx, line, refund_qty, actor).await?;
        mark_line_voided(tx, line.id, fully_voided, actor).await?;
    }

    Ok(())
}

/// Re-debit the quantities a credit memo had credited back, then flag the
/// memo voided
///
/// The inverse of [`partial_void_for_refund`]. Refuses broken memos (the
/// stock was written off, not restored) and memos already voided.
pub async fn revert_credit_memo(
    tx: &mut Transaction<'static, Postgres>,
    memo: &CreditMemo,
    actor: &str,
) -> AppResult<()> {
    memo.ensure_revertible()?;

    let lines = fetch_lines_for_update(tx, memo.transaction_detail_id).await?;
    if lines.is_empty() {
        return Err(AppError::NotFound("Allocation for credit memo".to_string()));
    }

    // The memo is still non-voided here, so the sum includes it; subtracting
    // its quantity yields the refunded total that remains after the revert.
    let existing_refunded = refunded_qty(tx, memo.transaction_detail_id).await?;
    let remaining_refunded = existing_refunded - memo.qty;
    if remaining_refunded < 0 {
        return Err(AppError::RefundExceedsAllocation);
    }

    for line in &lines {
        redebit_counters(tx, line, memo.qty, actor).await?;
        mark_line_voided(tx, line.id, remaining_refunded == line.allocated_qty, actor).await?;
    }

    sqlx::query("UPDATE credit_memos SET is_voided = TRUE WHERE id = $1")
        .bind(memo.id)
        .execute(&mut **tx)
        .await?;

    tracing::debug!(memo_number = %memo.memo_number, "reverted credit memo");
    Ok(())
}

/// Pull refunded units out of the catalog entry for a SKU
///
/// Part of the broken-item path: the units will never be resold, so both
/// catalog counters drop (floored at zero). Missing catalog entries are
/// tolerated; the SKU may have been retired since the sale.
pub async fn remove_from_catalog(
    tx: &mut Transaction<'static, Postgres>,
    sku: &str,
    qty: i32,
) -> AppResult<()> {
    if let Some(mut item) = stock::fetch_catalog_item_for_update(tx, sku).await? {
        item.remove_stock(qty);
        stock::update_catalog_counters(tx, &item).await?;
    }
    Ok(())
}

/// Quantity already covered by non-voided credit memos for a detail
async fn refunded_qty(
    tx: &mut Transaction<'static, Postgres>,
    transaction_detail_id: i32,
) -> AppResult<i32> {
    let sum = sqlx::query_scalar::<_, Option<i64>>(
        r#"
        SELECT SUM(qty)
        FROM credit_memos
        WHERE transaction_detail_id = $1 AND is_voided = FALSE
        "#,
    )
    .bind(transaction_detail_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(sum.unwrap_or(0) as i32)
}

async fn fetch_lines_for_update(
    tx: &mut Transaction<'static, Postgres>,
    transaction_detail_id: i32,
) -> AppResult<Vec<AllocationLine>> {
    let rows = sqlx::query_as::<_, AllocationLineRow>(
        r#"
        SELECT id, transaction_detail_id, retail_lot_id, allocated_qty, is_voided,
               created_at, created_by, updated_at, updated_by, deleted_at, deleted_by
        FROM allocation_lines
        WHERE transaction_detail_id = $1 AND deleted_at IS NULL
        ORDER BY id ASC
        FOR UPDATE
        "#,
    )
    .bind(transaction_detail_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Return `qty` units of a line's lot to stock, crediting the catalog and
/// bulk counters alongside
async fn restore_counters(
    tx: &mut Transaction<'static, Postgres>,
    line: &AllocationLine,
    qty: i32,
    actor: &str,
) -> AppResult<()> {
    let mut lot = stock::fetch_retail_lot_for_update(tx, line.retail_lot_id).await?;
    lot.restore_sale(qty);
    stock::update_retail_lot_counters(tx, &lot, actor).await?;

    let mut bulk = stock::fetch_bulk_lot_for_update(tx, lot.bulk_lot_id).await?;
    bulk.credit(qty * lot.quantity_value);
    stock::update_bulk_lot_quantity(tx, &bulk).await?;

    if let Some(mut item) = stock::fetch_catalog_item_for_update(tx, &lot.variant_sku).await? {
        item.restore_sale(qty);
        stock::update_catalog_counters(tx, &item).await?;
    }

    Ok(())
}

/// Take `qty` units of a line's lot back out of stock (credit-memo revert)
async fn redebit_counters(
    tx: &mut Transaction<'static, Postgres>,
    line: &AllocationLine,
    qty: i32,
    actor: &str,
) -> AppResult<()> {
    let mut lot = stock::fetch_retail_lot_for_update(tx, line.retail_lot_id).await?;
    lot.apply_sale(qty);
    stock::update_retail_lot_counters(tx, &lot, actor).await?;

    let mut bulk = stock::fetch_bulk_lot_for_update(tx, lot.bulk_lot_id).await?;
    bulk.debit(qty * lot.quantity_value);
    stock::update_bulk_lot_quantity(tx, &bulk).await?;

    if let Some(mut item) = stock::fetch_catalog_item_for_update(tx, &lot.variant_sku).await? {
        item.apply_sale(qty);
        stock::update_catalog_counters(tx, &item).await?;
    }

    Ok(())
}

async fn mark_line_voided(
    tx: &mut Transaction<'static, Postgres>,
    line_id: i32,
    is_voided: bool,
    actor: &str,
) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE allocation_lines
        SET is_voided = $2, updated_at = NOW(), updated_by = $3
        WHERE id = $1
        "#,
    )
    .bind(line_id)
    .bind(is_voided)
    .bind(actor)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
