//! Common types used across the ledger

use serde::{Deserialize, Serialize};

/// Channel a stock release is sold through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalesChannel {
    /// Over-the-counter release from display inventory
    #[serde(rename = "Store")]
    Store,
    /// Write-off channel: stock leaves circulation at cost, recorded as loss
    #[serde(rename = "Out Items")]
    OutItems,
}

impl SalesChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalesChannel::Store => "Store",
            SalesChannel::OutItems => "Out Items",
        }
    }
}

impl std::fmt::Display for SalesChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Void,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "Create",
            AuditAction::Update => "Update",
            AuditAction::Delete => "Delete",
            AuditAction::Void => "Void",
        }
    }
}
