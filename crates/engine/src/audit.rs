//! Best-effort audit recording for admin mutations.

use arena_core::roles::Actor;
use arena_db::models::audit::CreateAuditLog;
use serde_json::Value;

use crate::error::EngineResult;
use crate::store::AuditSink;

/// Record the outcome of one admin action.
///
/// On success `details` is built from the result; on failure the error text
/// is recorded instead. A failed audit write is logged and swallowed.
pub async fn record_outcome<A, T>(
    sink: &A,
    actor: &Actor,
    action_type: &'static str,
    entity_type: &'static str,
    entity_id: Option<String>,
    outcome: &EngineResult<T>,
    details: impl FnOnce(&T) -> Value,
) where
    A: AuditSink,
{
    let (details_json, success) = match outcome {
        Ok(value) => (details(value), true),
        Err(err) => (serde_json::json!({ "error": err.to_string() }), false),
    };

    let entry = CreateAuditLog {
        user_id: actor.user_id,
        action_type: action_type.to_string(),
        entity_type: entity_type.to_string(),
        entity_id,
        details_json: Some(details_json),
        success,
    };

    if let Err(e) = sink.record_audit(&entry).await {
        tracing::warn!(
            error = %e,
            action_type,
            entity_type,
            entity_id = entry.entity_id.as_deref(),
            "Failed to write audit log entry"
        );
    }
}
