//! Season snapshot entity model and DTOs.
//!
//! Snapshots are immutable apart from the `rewards_distributed` flag, so
//! there is no update DTO.

use arena_core::ranking::SnapshotEntry;
use arena_core::types::{DbId, Rating, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `season_snapshots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeasonSnapshot {
    pub id: DbId,
    pub season_id: DbId,
    pub season_number: i32,
    pub user_id: DbId,
    pub username: String,
    pub final_elo: Rating,
    pub tier: String,
    pub rank: i32,
    pub games_played: i32,
    pub wins: i32,
    pub losses: i32,
    pub rewards_distributed: bool,
    pub distributed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for inserting one snapshot row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSnapshot {
    pub season_id: DbId,
    pub season_number: i32,
    pub user_id: DbId,
    pub username: String,
    pub final_elo: Rating,
    pub tier: String,
    pub rank: i32,
    pub games_played: i32,
    pub wins: i32,
    pub losses: i32,
}

impl CreateSnapshot {
    pub fn from_entry(season_id: DbId, season_number: i32, entry: SnapshotEntry) -> Self {
        Self {
            season_id,
            season_number,
            user_id: entry.user_id,
            username: entry.username,
            final_elo: entry.final_elo,
            tier: entry.tier,
            rank: entry.rank,
            games_played: entry.games_played,
            wins: entry.wins,
            losses: entry.losses,
        }
    }
}
