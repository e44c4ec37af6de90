//! Audit log model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only audit record persisted in the same unit as the mutation it
/// describes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: i32,
    pub action: String,
    pub entity_name: String,
    pub entity_id: Option<String>,
    pub description: String,
    pub performed_by: String,
    pub recorded_at: DateTime<Utc>,
}
