//! Audit log entity model and DTO. Audit rows are immutable.

use arena_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single audit log entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub action_type: String,
    pub log_category: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details_json: Option<serde_json::Value>,
    pub success: bool,
    pub created_at: Timestamp,
}

/// DTO for inserting an audit log entry. The category is derived from the
/// action type on insert.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuditLog {
    /// `None` for the scheduled trigger.
    pub user_id: Option<DbId>,
    pub action_type: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details_json: Option<serde_json::Value>,
    pub success: bool,
}
