//! Append-only audit trail

use sqlx::{Postgres, Transaction};

use shared::types::AuditAction;

use crate::error::AppResult;

/// Append an audit record inside the caller's transaction
///
/// The record commits or rolls back with the ledger mutation it describes;
/// an audited action can never outlive a discarded mutation.
pub async fn append(
    tx: &mut Transaction<'static, Postgres>,
    action: AuditAction,
    entity_name: &str,
    entity_id: Option<&str>,
    description: &str,
    actor: &str,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (action, entity_name, entity_id, description, performed_by)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(action.as_str())
    .bind(entity_name)
    .bind(entity_id)
    .bind(description)
    .bind(actor)
    .execute(&mut **tx)
    .await?;

    tracing::debug!(action = action.as_str(), entity_name, actor, "audit: {description}");
    Ok(())
}
