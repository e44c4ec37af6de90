//! Error handling for the POS stock ledger
//!
//! Every failure carries a machine-readable code and a human-readable
//! message; callers display the message and leave prior state untouched.

use shared::ledger::LedgerError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Not enough stock for SKU {sku}. Remaining qty: {remaining}")]
    InsufficientStock { sku: String, remaining: i32 },

    #[error("Refund quantity exceeds allocated quantity.")]
    RefundExceedsAllocation,

    #[error("{0}")]
    AlreadyVoided(String),

    #[error("{0}")]
    BrokenItemNotRevertible(String),

    // Infrastructure errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable error code for callers that match on failure kinds
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            AppError::RefundExceedsAllocation => "REFUND_EXCEEDS_ALLOCATION",
            AppError::AlreadyVoided(_) => "ALREADY_VOIDED",
            AppError::BrokenItemNotRevertible(_) => "BROKEN_ITEM_NOT_REVERTIBLE",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Migrate(_) => "MIGRATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to surface to the cashier/back office
    pub fn message(&self) -> String {
        match self {
            AppError::Database(_) => "A database error occurred".to_string(),
            AppError::Migrate(_) | AppError::Internal(_) => {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Whether retrying the whole atomic unit may succeed
    ///
    /// Covers connection-level failures plus Postgres serialization
    /// (40001) and deadlock (40P01) aborts. Business-rule failures are
    /// never transient.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Database(err) => match err {
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => true,
                sqlx::Error::Database(db) => {
                    matches!(db.code().as_deref(), Some("40001") | Some("40P01"))
                }
                _ => false,
            },
            _ => false,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidQuantity(_) => AppError::Validation {
                field: "quantity".to_string(),
                message: err.to_string(),
            },
            LedgerError::InsufficientStock { sku, remaining } => {
                AppError::InsufficientStock { sku, remaining }
            }
            LedgerError::RefundExceedsAllocation => AppError::RefundExceedsAllocation,
            LedgerError::AlreadyVoided { .. } => AppError::AlreadyVoided(err.to_string()),
            LedgerError::BrokenItemNotRevertible { .. } => {
                AppError::BrokenItemNotRevertible(err.to_string())
            }
            LedgerError::DisplayExceedsStock { .. } | LedgerError::ReleaseExceedsDisplay { .. } => {
                AppError::Validation {
                    field: "quantity".to_string(),
                    message: err.to_string(),
                }
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation {
            field: "request".to_string(),
            message: errors.to_string(),
        }
    }
}

/// Result type alias for services
pub type AppResult<T> = Result<T, AppError>;
