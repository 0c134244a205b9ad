//! Season entity model and DTOs.

use arena_core::season::{RankResetType, SeasonStatus};
use arena_core::tiers::RewardTier;
use arena_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// A row from the `seasons` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Season {
    pub id: DbId,
    pub number: i32,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: SeasonStatus,
    /// Overwritten with the actual activation time when the season starts.
    pub start_date: Timestamp,
    /// Overwritten with the actual end time when the season ends.
    pub end_date: Timestamp,
    #[sqlx(try_from = "String")]
    pub rank_reset_type: RankResetType,
    pub soft_reset_percentage: Option<i32>,
    pub rewards: Json<Vec<RewardTier>>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new season. Created seasons start `upcoming`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSeason {
    #[validate(range(min = 1))]
    pub number: i32,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub rank_reset_type: RankResetType,
    pub soft_reset_percentage: Option<i32>,
    /// Defaults to the built-in ladder when omitted or empty.
    pub rewards: Option<Vec<RewardTier>>,
}

/// DTO for editing a season that has not ended. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSeason {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub rank_reset_type: Option<RankResetType>,
    pub soft_reset_percentage: Option<i32>,
    pub rewards: Option<Vec<RewardTier>>,
}
