//! Refund composition and credit-memo voiding

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use validator::Validate;

use shared::models::{next_memo_number, AllocationLine, CreditMemo, TransactionDetail, TransactionHeader};
use shared::types::{AuditAction, SalesChannel};
use shared::validation::validate_actor;

use crate::config::RetryConfig;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{
    AllocationLineRow, CreditMemoRow, TransactionDetailRow, TransactionHeaderRow,
};
use crate::services::{audit, display, reversal, stock};

/// A refund request against one line of a completed sale
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefundRequest {
    pub transaction_header_id: i32,
    #[validate(length(min = 1))]
    pub sku: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(length(min = 1, max = 500))]
    pub reason: Option<String>,
    /// Broken items are written off at cost instead of returning to stock
    pub is_broken: bool,
}

/// Coordinator for refunds and credit-memo reversal
#[derive(Clone)]
pub struct RefundService {
    db: PgPool,
    retry: RetryConfig,
}

impl RefundService {
    pub fn new(db: PgPool, retry: RetryConfig) -> Self {
        Self { db, retry }
    }

    /// Issue a refund for one sale line, dispatching on the broken flag
    ///
    /// Still-sellable refunds return the quantity to POS stock and issue a
    /// credit memo. Broken-item refunds additionally remove the quantity
    /// from the catalog, shift it to the inventory-display channel and
    /// release it through the "Out Items" write-off channel; the memo then
    /// points at the write-off sale. Returns the credit memo id.
    pub async fn create_refund(&self, request: &RefundRequest, actor: &str) -> AppResult<i32> {
        request.validate()?;
        validate_actor(actor).map_err(|m| AppError::Validation {
            field: "actor".to_string(),
            message: m.to_string(),
        })?;

        let memo_id = db::run_atomic(&self.db, self.retry, async move |tx| {
            let header = fetch_header(tx, request.transaction_header_id).await?;
                if header.is_voided {
                    return Err(AppError::AlreadyVoided(format!(
                        "Transaction receipt {} has already been voided.",
                        header.or_number
                    )));
                }

                let detail = fetch_detail(tx, header.id, &request.sku).await?;
                let line = fetch_allocation_line(tx, detail.id).await?;
                if line.is_voided {
                    return Err(AppError::AlreadyVoided(
                        "This item has already been voided.".to_string(),
                    ));
                }

                let memo_id = if request.is_broken {
                    refund_broken_item(tx, &header, &detail, &line, request, actor).await?
                } else {
                    refund_still_sellable(tx, &header, &detail, request, actor).await?
                };

                let id_str = memo_id.to_string();
                audit::append(
                    tx,
                    AuditAction::Create,
                    "CreditMemo",
                    Some(&id_str),
                    &format!("{} has been refunded by {}", request.sku, actor),
                    actor,
                )
                .await?;

                Ok(memo_id)
        })
        .await?;

        tracing::info!(sku = %request.sku, qty = request.quantity, memo_id, "refund issued");
        Ok(memo_id)
    }

    /// Void a credit memo, re-debiting the stock its refund had restored
    ///
    /// Fails for broken-item memos (the stock was written off, not
    /// restored) and for memos already voided; counters are untouched in
    /// both cases.
    pub async fn void_credit_memo(&self, credit_memo_id: i32, actor: &str) -> AppResult<()> {
        validate_actor(actor).map_err(|m| AppError::Validation {
            field: "actor".to_string(),
            message: m.to_string(),
        })?;

        db::run_atomic(&self.db, self.retry, async move |tx| {
            let memo = fetch_memo(tx, credit_memo_id).await?;
                reversal::revert_credit_memo(tx, &memo, actor).await?;

                let id_str = memo.id.to_string();
                audit::append(
                    tx,
                    AuditAction::Void,
                    "CreditMemo",
                    Some(&id_str),
                    &format!("{} has been voided by {}", memo.memo_number, actor),
                    actor,
                )
                .await?;

                Ok(())
        })
        .await?;

        tracing::info!(credit_memo_id, "credit memo voided");
        Ok(())
    }
}

/// Quantity returns to sellable POS stock; the memo carries no write-off sale
pub async fn refund_still_sellable(
    tx: &mut Transaction<'static, Postgres>,
    header: &TransactionHeader,
    detail: &TransactionDetail,
    request: &RefundRequest,
    actor: &str,
) -> AppResult<i32> {
    reversal::partial_void_for_refund(tx, detail.id, request.quantity, actor).await?;
    add_credit_memo(tx, header, detail, request, None, actor).await
}

/// Quantity is written off as loss through the "Out Items" channel
pub async fn refund_broken_item(
    tx: &mut Transaction<'static, Postgres>,
    header: &TransactionHeader,
    detail: &TransactionDetail,
    line: &AllocationLine,
    request: &RefundRequest,
    actor: &str,
) -> AppResult<i32> {
    let qty = request.quantity;

    // Restore the counters the sale debited, then walk the quantity out of
    // the POS channel again: it must never be resellable.
    reversal::partial_void_for_refund(tx, detail.id, qty, actor).await?;
    reversal::remove_from_catalog(tx, &detail.sku, qty).await?;

    let mut lot = stock::fetch_retail_lot_for_update(tx, line.retail_lot_id).await?;
    lot.unstage_pos(qty);
    stock::update_retail_lot_counters(tx, &lot, actor).await?;

    let display_entry_id = display::mark_displayed(tx, line.retail_lot_id, qty, actor).await?;

    let reason = request.reason.clone().unwrap_or_else(|| {
        "System generated: Item marked as defective or unsuitable for resale.".to_string()
    });
    let write_off = display::release_stock(
        tx,
        display_entry_id,
        qty,
        SalesChannel::OutItems,
        Some(&reason),
        actor,
    )
    .await?;

    add_credit_memo(tx, header, detail, request, Some(write_off.id), actor).await
}

async fn add_credit_memo(
    tx: &mut Transaction<'static, Postgres>,
    header: &TransactionHeader,
    detail: &TransactionDetail,
    request: &RefundRequest,
    sale_id: Option<i32>,
    actor: &str,
) -> AppResult<i32> {
    let last_number = sqlx::query_scalar::<_, String>(
        "SELECT memo_number FROM credit_memos ORDER BY id DESC LIMIT 1",
    )
    .fetch_optional(&mut **tx)
    .await?;

    let memo_number = next_memo_number(last_number.as_deref());
    let total_amount = detail.price_per_unit * Decimal::from(request.quantity);

    let memo_id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO credit_memos
            (memo_number, transaction_detail_id, or_number, sku, product_name, sale_id,
             qty, amount, total_amount, reason, is_broken, issued_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING id
        "#,
    )
    .bind(&memo_number)
    .bind(detail.id)
    .bind(&header.or_number)
    .bind(&detail.sku)
    .bind(&detail.name)
    .bind(sale_id)
    .bind(request.quantity)
    .bind(detail.price_per_unit)
    .bind(total_amount)
    .bind(&request.reason)
    .bind(request.is_broken)
    .bind(actor)
    .fetch_one(&mut **tx)
    .await?;

    Ok(memo_id)
}

async fn fetch_header(
    tx: &mut Transaction<'static, Postgres>,
    transaction_header_id: i32,
) -> AppResult<TransactionHeader> {
    let row = sqlx::query_as::<_, TransactionHeaderRow>(
        r#"
        SELECT id, or_number, transaction_date, payment_method, regular_discount,
               statutory_discount, vat_included, vat_excluded, total_amount,
               amount_tendered, change_amount, cashier_name, terminal_id, cart,
               is_voided, created_at, created_by, deleted_at, deleted_by
        FROM transaction_headers
        WHERE id = $1 AND deleted_at IS NULL
        FOR UPDATE
        "#,
    )
    .bind(transaction_header_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Transaction".to_string()))?;

    Ok(row.into())
}

async fn fetch_detail(
    tx: &mut Transaction<'static, Postgres>,
    transaction_header_id: i32,
    sku: &str,
) -> AppResult<TransactionDetail> {
    let row = sqlx::query_as::<_, TransactionDetailRow>(
        r#"
        SELECT id, transaction_header_id, name, sku, qty, price_per_unit,
               is_regular_item, is_discount, is_statutory_discountable,
               deleted_at, deleted_by
        FROM transaction_details
        WHERE transaction_header_id = $1 AND sku = $2 AND deleted_at IS NULL
        ORDER BY id ASC
        LIMIT 1
        "#,
    )
    .bind(transaction_header_id)
    .bind(sku)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Item in this transaction".to_string()))?;

    Ok(row.into())
}

async fn fetch_allocation_line(
    tx: &mut Transaction<'static, Postgres>,
    transaction_detail_id: i32,
) -> AppResult<AllocationLine> {
    let row = sqlx::query_as::<_, AllocationLineRow>(
        r#"
        SELECT id, transaction_detail_id, retail_lot_id, allocated_qty, is_voided,
               created_at, created_by, updated_at, updated_by, deleted_at, deleted_by
        FROM allocation_lines
        WHERE transaction_detail_id = $1 AND deleted_at IS NULL
        ORDER BY id ASC
        LIMIT 1
        "#,
    )
    .bind(transaction_detail_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Allocation for this transaction".to_string()))?;

    Ok(row.into())
}

async fn fetch_memo(
    tx: &mut Transaction<'static, Postgres>,
    credit_memo_id: i32,
) -> AppResult<CreditMemo> {
    let row = sqlx::query_as::<_, CreditMemoRow>(
        r#"
        SELECT id, memo_number, transaction_detail_id, or_number, sku, product_name,
               sale_id, qty, amount, total_amount, reason, is_broken, is_voided,
               issued_by, issued_at
        FROM credit_memos
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(credit_memo_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Credit memo".to_string()))?;

    Ok(row.into())
}
