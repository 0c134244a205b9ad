//! Currency ledger models.

use arena_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `player_wallets` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize)]
pub struct PlayerWallet {
    pub user_id: DbId,
    pub gold: i64,
    pub gems: i64,
}

/// A row from the `currency_transactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CurrencyTransaction {
    pub id: DbId,
    pub user_id: DbId,
    pub gold_delta: i64,
    pub gems_delta: i64,
    pub transaction_type: String,
    pub description: String,
    pub reference_id: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
}

/// A balance change request.
///
/// When `reference_id` is set the ledger applies the adjustment at most once
/// per reference.
#[derive(Debug, Clone)]
pub struct CurrencyAdjustment {
    pub user_id: DbId,
    pub gold_delta: i64,
    pub gems_delta: i64,
    pub transaction_type: String,
    pub description: String,
    pub reference_id: Option<String>,
    pub metadata: serde_json::Value,
}
