//! Sale completion and voiding

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use shared::types::AuditAction;
use shared::validation::{validate_actor, validate_or_number};

use crate::config::RetryConfig;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::TransactionHeaderRow;
use crate::services::{allocation, audit, reversal};

/// A completed POS transaction as submitted by the terminal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRequest {
    pub header: SaleHeaderInput,
    pub items: Vec<SaleLineInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaleHeaderInput {
    #[validate(length(min = 1))]
    pub or_number: String,
    pub transaction_date: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub payment_method: String,
    pub regular_discount: Decimal,
    pub statutory_discount: Decimal,
    pub vat_included: Decimal,
    pub vat_excluded: Decimal,
    pub total_amount: Decimal,
    pub amount_tendered: Decimal,
    pub change_amount: Decimal,
    #[validate(length(min = 1))]
    pub cashier_name: String,
    #[validate(length(min = 1))]
    pub terminal_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLineInput {
    pub name: String,
    pub sku: String,
    pub qty: Decimal,
    pub price_per_unit: Decimal,
    pub is_regular_item: bool,
    pub is_discount: bool,
    pub is_statutory_discountable: bool,
}

/// Coordinator for sale completion and whole-sale voids
#[derive(Clone)]
pub struct SalesService {
    db: PgPool,
    retry: RetryConfig,
}

impl SalesService {
    pub fn new(db: PgPool, retry: RetryConfig) -> Self {
        Self { db, retry }
    }

    /// Persist a completed sale and allocate stock for every regular line
    ///
    /// Header, details, FIFO allocations and the audit record commit as one
    /// atomic unit; any failure (including insufficient stock on the last
    /// line) discards the whole sale. Returns the new header id.
    pub async fn complete_sale(&self, request: &SaleRequest, actor: &str) -> AppResult<i32> {
        request.header.validate()?;
        validate_or_number(&request.header.or_number).map_err(|m| AppError::Validation {
            field: "or_number".to_string(),
            message: m.to_string(),
        })?;
        validate_actor(actor).map_err(|m| AppError::Validation {
            field: "actor".to_string(),
            message: m.to_string(),
        })?;
        if request.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Invalid transaction data.".to_string(),
            });
        }

        let header_id = db::run_atomic(&self.db, self.retry, async move |tx| {
            let cart = serde_json::to_value(&request.items)
                    .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;

                let header_id = sqlx::query_scalar::<_, i32>(
                    r#"
                    INSERT INTO transaction_headers
                        (or_number, transaction_date, payment_method, regular_discount,
                         statutory_discount, vat_included, vat_excluded, total_amount,
                         amount_tendered, change_amount, cashier_name, terminal_id, cart,
                         created_by)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                    RETURNING id
                    "#,
                )
                .bind(&request.header.or_number)
                .bind(request.header.transaction_date)
                .bind(&request.header.payment_method)
                .bind(request.header.regular_discount)
                .bind(request.header.statutory_discount)
                .bind(request.header.vat_included)
                .bind(request.header.vat_excluded)
                .bind(request.header.total_amount)
                .bind(request.header.amount_tendered)
                .bind(request.header.change_amount)
                .bind(&request.header.cashier_name)
                .bind(&request.header.terminal_id)
                .bind(cart)
                .bind(actor)
                .fetch_one(&mut **tx)
                .await?;

                for item in &request.items {
                    let detail_id = sqlx::query_scalar::<_, i32>(
                        r#"
                        INSERT INTO transaction_details
                            (transaction_header_id, name, sku, qty, price_per_unit,
                             is_regular_item, is_discount, is_statutory_discountable)
                        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                        RETURNING id
                        "#,
                    )
                    .bind(header_id)
                    .bind(&item.name)
                    .bind(&item.sku)
                    .bind(item.qty)
                    .bind(item.price_per_unit)
                    .bind(item.is_regular_item)
                    .bind(item.is_discount)
                    .bind(item.is_statutory_discountable)
                    .fetch_one(&mut **tx)
                    .await?;

                    if item.is_regular_item {
                        let qty = item.qty.trunc().to_i32().ok_or_else(|| {
                            AppError::Validation {
                                field: "qty".to_string(),
                                message: format!(
                                    "Line quantity {} is not a sellable unit count",
                                    item.qty
                                ),
                            }
                        })?;
                        allocation::allocate_fifo(tx, detail_id, &item.sku, qty, actor).await?;
                    }
                }

                let id_str = header_id.to_string();
                audit::append(
                    tx,
                    AuditAction::Create,
                    "TransactionHeader",
                    Some(&id_str),
                    &format!(
                        "Transaction {} has been created by {}",
                        request.header.or_number, actor
                    ),
                    actor,
                )
                .await?;

                Ok(header_id)
        })
        .await?;

        tracing::info!(
            or_number = %request.header.or_number,
            header_id,
            "sale completed"
        );
        Ok(header_id)
    }

    /// Void an entire sale, reversing every detail's allocations
    ///
    /// Refused while any non-voided credit memo references the receipt
    /// number; a partially refunded sale must have its memos voided first.
    pub async fn void_sale(&self, transaction_header_id: i32, actor: &str) -> AppResult<()> {
        validate_actor(actor).map_err(|m| AppError::Validation {
            field: "actor".to_string(),
            message: m.to_string(),
        })?;

        db::run_atomic(&self.db, self.retry, async move |tx| {
            let header = sqlx::query_as::<_, TransactionHeaderRow>(
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

                let memo = sqlx::query_scalar::<_, String>(
                    r#"
                    SELECT memo_number FROM credit_memos
                    WHERE or_number = $1 AND is_voided = FALSE
                    ORDER BY id ASC
                    LIMIT 1
                    "#,
                )
                .bind(&header.or_number)
                .fetch_optional(&mut **tx)
                .await?;
                if let Some(memo_number) = memo {
                    return Err(AppError::Validation {
                        field: "credit_memo".to_string(),
                        message: format!(
                            "Cannot void transaction with existing credit memo {}.",
                            memo_number
                        ),
                    });
                }

                if header.is_voided {
                    return Err(AppError::AlreadyVoided(
                        "Transaction already voided.".to_string(),
                    ));
                }

                let detail_ids = sqlx::query_scalar::<_, i32>(
                    r#"
                    SELECT id FROM transaction_details
                    WHERE transaction_header_id = $1 AND deleted_at IS NULL
                    ORDER BY id ASC
                    "#,
                )
                .bind(transaction_header_id)
                .fetch_all(&mut **tx)
                .await?;

                for detail_id in detail_ids {
                    reversal::void_transaction_detail(tx, detail_id, actor).await?;
                }

                sqlx::query("UPDATE transaction_headers SET is_voided = TRUE WHERE id = $1")
                    .bind(transaction_header_id)
                    .execute(&mut **tx)
                    .await?;

                let id_str = transaction_header_id.to_string();
                audit::append(
                    tx,
                    AuditAction::Void,
                    "TransactionHeader",
                    Some(&id_str),
                    &format!("{} has been voided by {}", header.or_number, actor),
                    actor,
                )
                .await?;

                Ok(())
        })
        .await?;

        tracing::info!(transaction_header_id, "sale voided");
        Ok(())
    }
}
