//! Allocation line model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of how much of one retail lot satisfied one sale line
///
/// A single transaction detail may spill over several lots, producing one
/// line per lot touched. Immutable after creation except for the voided
/// flag and audit stamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationLine {
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
