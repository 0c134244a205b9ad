//! Repository for the `audit_logs` table. Insert only.

use arena_core::audit::action_to_category;
use sqlx::PgPool;

use crate::models::audit::{AuditLog, CreateAuditLog};

const COLUMNS: &str = "id, user_id, action_type, log_category, entity_type, entity_id, \
    details_json, success, created_at";

pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Insert one entry. The category is derived from the action type.
    pub async fn create(pool: &PgPool, input: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs
                (user_id, action_type, log_category, entity_type, entity_id, details_json, success)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(input.user_id)
            .bind(&input.action_type)
            .bind(action_to_category(&input.action_type))
            .bind(&input.entity_type)
            .bind(&input.entity_id)
            .bind(&input.details_json)
            .bind(input.success)
            .fetch_one(pool)
            .await
    }
}
