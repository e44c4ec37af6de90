//! Row mappings between the database and the shared domain models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use shared::models::{
    AllocationLine, BulkLot, CatalogItem, CreditMemo, DisplayEntry, RetailLot, StockRelease,
    TransactionDetail, TransactionHeader,
};

#[derive(Debug, Clone, FromRow)]
pub struct RetailLotRow {
    pub id: i32,
    pub bulk_lot_id: i32,
    pub product_id: i32,
    pub variant_sku: String,
    pub price_per_unit: Decimal,
    pub quantity_value: i32,
    pub initial_qty: i32,
    pub sold_qty: i32,
    pub quantity_displayed: i32,
    pub quantity_displayed_to_pos: i32,
    pub quantity_displayed_to_inventory: i32,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

impl From<RetailLotRow> for RetailLot {
    fn from(r: RetailLotRow) -> Self {
        RetailLot {
            id: r.id,
            bulk_lot_id: r.bulk_lot_id,
            product_id: r.product_id,
            variant_sku: r.variant_sku,
            price_per_unit: r.price_per_unit,
            quantity_value: r.quantity_value,
            initial_qty: r.initial_qty,
            sold_qty: r.sold_qty,
            quantity_displayed: r.quantity_displayed,
            quantity_displayed_to_pos: r.quantity_displayed_to_pos,
            quantity_displayed_to_inventory: r.quantity_displayed_to_inventory,
            created_at: r.created_at,
            created_by: r.created_by,
            updated_at: r.updated_at,
            updated_by: r.updated_by,
            deleted_at: r.deleted_at,
            deleted_by: r.deleted_by,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct BulkLotRow {
    pub id: i32,
    pub batch_no: String,
    pub sku: Option<String>,
    pub cost_per_unit: Decimal,
    pub price_per_unit: Decimal,
    pub initial_quantity: i32,
    pub current_quantity: i32,
    pub product_id: i32,
    pub supplier_id: i32,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

impl From<BulkLotRow> for BulkLot {
    fn from(r: BulkLotRow) -> Self {
        BulkLot {
            id: r.id,
            batch_no: r.batch_no,
            sku: r.sku,
            cost_per_unit: r.cost_per_unit,
            price_per_unit: r.price_per_unit,
            initial_quantity: r.initial_quantity,
            current_quantity: r.current_quantity,
            product_id: r.product_id,
            supplier_id: r.supplier_id,
            expiry_date: r.expiry_date,
            created_at: r.created_at,
            created_by: r.created_by,
            deleted_at: r.deleted_at,
            deleted_by: r.deleted_by,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CatalogItemRow {
    pub id: i32,
    pub name: String,
    pub sku: String,
    pub price_per_unit: Decimal,
    pub qty_displayed: i32,
    pub qty_sold: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

impl From<CatalogItemRow> for CatalogItem {
    fn from(r: CatalogItemRow) -> Self {
        CatalogItem {
            id: r.id,
            name: r.name,
            sku: r.sku,
            price_per_unit: r.price_per_unit,
            qty_displayed: r.qty_displayed,
            qty_sold: r.qty_sold,
            is_active: r.is_active,
            created_at: r.created_at,
            created_by: r.created_by,
            deleted_at: r.deleted_at,
            deleted_by: r.deleted_by,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AllocationLineRow {
    pub id: i32,
    pub transaction_detail_id: i32,
    pub retail_lot_id: i32,
    pub allocated_qty: i32,
    pub is_voided: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

impl From<AllocationLineRow> for AllocationLine {
    fn from(r: AllocationLineRow) -> Self {
        AllocationLine {
            id: r.id,
            transaction_detail_id: r.transaction_detail_id,
            retail_lot_id: r.retail_lot_id,
            allocated_qty: r.allocated_qty,
            is_voided: r.is_voided,
            created_at: r.created_at,
            created_by: r.created_by,
            updated_at: r.updated_at,
            updated_by: r.updated_by,
            deleted_at: r.deleted_at,
            deleted_by: r.deleted_by,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CreditMemoRow {
    pub id: i32,
    pub memo_number: String,
    pub transaction_detail_id: i32,
    pub or_number: String,
    pub sku: String,
    pub product_name: String,
    pub sale_id: Option<i32>,
    pub qty: i32,
    pub amount: Decimal,
    pub total_amount: Decimal,
    pub reason: Option<String>,
    pub is_broken: bool,
    pub is_voided: bool,
    pub issued_by: String,
    pub issued_at: DateTime<Utc>,
}

impl From<CreditMemoRow> for CreditMemo {
    fn from(r: CreditMemoRow) -> Self {
        CreditMemo {
            id: r.id,
            memo_number: r.memo_number,
            transaction_detail_id: r.transaction_detail_id,
            or_number: r.or_number,
            sku: r.sku,
            product_name: r.product_name,
            sale_id: r.sale_id,
            qty: r.qty,
            amount: r.amount,
            total_amount: r.total_amount,
            reason: r.reason,
            is_broken: r.is_broken,
            is_voided: r.is_voided,
            issued_by: r.issued_by,
            issued_at: r.issued_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DisplayEntryRow {
    pub id: i32,
    pub retail_lot_id: i32,
    pub quantity_displayed: i32,
    pub quantity_sold: i32,
    pub is_sold_out: bool,
    pub displayed_on: DateTime<Utc>,
    pub displayed_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

impl From<DisplayEntryRow> for DisplayEntry {
    fn from(r: DisplayEntryRow) -> Self {
        DisplayEntry {
            id: r.id,
            retail_lot_id: r.retail_lot_id,
            quantity_displayed: r.quantity_displayed,
            quantity_sold: r.quantity_sold,
            is_sold_out: r.is_sold_out,
            displayed_on: r.displayed_on,
            displayed_by: r.displayed_by,
            deleted_at: r.deleted_at,
            deleted_by: r.deleted_by,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StockReleaseRow {
    pub id: i32,
    pub bulk_lot_id: Option<i32>,
    pub retail_lot_id: Option<i32>,
    pub display_entry_id: Option<i32>,
    pub quantity: i32,
    pub total_price: Decimal,
    pub sales_channel: String,
    pub reason: Option<String>,
    pub released_by: String,
    pub released_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

impl From<StockReleaseRow> for StockRelease {
    fn from(r: StockReleaseRow) -> Self {
        StockRelease {
            id: r.id,
            bulk_lot_id: r.bulk_lot_id,
            retail_lot_id: r.retail_lot_id,
            display_entry_id: r.display_entry_id,
            quantity: r.quantity,
            total_price: r.total_price,
            sales_channel: r.sales_channel,
            reason: r.reason,
            released_by: r.released_by,
            released_at: r.released_at,
            deleted_at: r.deleted_at,
            deleted_by: r.deleted_by,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TransactionHeaderRow {
    pub id: i32,
    pub or_number: String,
    pub transaction_date: DateTime<Utc>,
    pub payment_method: String,
    pub regular_discount: Decimal,
    pub statutory_discount: Decimal,
    pub vat_included: Decimal,
    pub vat_excluded: Decimal,
    pub total_amount: Decimal,
    pub amount_tendered: Decimal,
    pub change_amount: Decimal,
    pub cashier_name: String,
    pub terminal_id: String,
    pub cart: serde_json::Value,
    pub is_voided: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

impl From<TransactionHeaderRow> for TransactionHeader {
    fn from(r: TransactionHeaderRow) -> Self {
        TransactionHeader {
            id: r.id,
            or_number: r.or_number,
            transaction_date: r.transaction_date,
            payment_method: r.payment_method,
            regular_discount: r.regular_discount,
            statutory_discount: r.statutory_discount,
            vat_included: r.vat_included,
            vat_excluded: r.vat_excluded,
            total_amount: r.total_amount,
            amount_tendered: r.amount_tendered,
            change_amount: r.change_amount,
            cashier_name: r.cashier_name,
            terminal_id: r.terminal_id,
            cart: r.cart,
            is_voided: r.is_voided,
            created_at: r.created_at,
            created_by: r.created_by,
            deleted_at: r.deleted_at,
            deleted_by: r.deleted_by,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TransactionDetailRow {
    pub id: i32,
    pub transaction_header_id: i32,
    pub name: String,
    pub sku: String,
    pub qty: Decimal,
    pub price_per_unit: Decimal,
    pub is_regular_item: bool,
    pub is_discount: bool,
    pub is_statutory_discountable: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

impl From<TransactionDetailRow> for TransactionDetail {
    fn from(r: TransactionDetailRow) -> Self {
        TransactionDetail {
            id: r.id,
            transaction_header_id: r.transaction_header_id,
            name: r.name,
            sku: r.sku,
            qty: r.qty,
            price_per_unit: r.price_per_unit,
            is_regular_item: r.is_regular_item,
            is_discount: r.is_discount,
            is_statutory_discountable: r.is_statutory_discountable,
            deleted_at: r.deleted_at,
            deleted_by: r.deleted_by,
        }
    }
}
