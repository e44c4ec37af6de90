//! Product master model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Master record a bulk lot is received against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    /// Unit the base quantity is measured in (e.g. "g", "kg", "pc")
    pub unit_of_measure: String,
    /// Base units in one purchased unit; divides into the purchase cost
    pub unit_volume: i32,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}
