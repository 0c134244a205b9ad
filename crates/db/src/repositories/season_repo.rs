//! Repository for the `seasons` table.

use arena_core::season::{RankResetType, SeasonStatus};
use arena_core::tiers::RewardTier;
use arena_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::season::{CreateSeason, Season, UpdateSeason};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, number, name, description, status, start_date, end_date, \
    rank_reset_type, soft_reset_percentage, rewards, created_by, created_at, updated_at";

/// Provides CRUD and lifecycle updates for seasons.
///
/// Lifecycle updates are guarded by the expected current status in the
/// `WHERE` clause, so a lost race returns `None` instead of skipping a state.
pub struct SeasonRepo;

impl SeasonRepo {
    /// Insert a new `upcoming` season with an already-resolved tier list.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSeason,
        rewards: &[RewardTier],
        created_by: Option<DbId>,
    ) -> Result<Season, sqlx::Error> {
        let query = format!(
            "INSERT INTO seasons
                (number, name, description, status, start_date, end_date,
                 rank_reset_type, soft_reset_percentage, rewards, created_by)
             VALUES ($1, $2, $3, 'upcoming', $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Season>(&query)
            .bind(input.number)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.rank_reset_type.as_str())
            .bind(input.soft_reset_percentage)
            .bind(Json(rewards))
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Season>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM seasons WHERE id = $1");
        sqlx::query_as::<_, Season>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_number(pool: &PgPool, number: i32) -> Result<Option<Season>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM seasons WHERE number = $1");
        sqlx::query_as::<_, Season>(&query)
            .bind(number)
            .fetch_optional(pool)
            .await
    }

    /// The active season, if any. Queried every call, never cached.
    pub async fn find_active(pool: &PgPool) -> Result<Option<Season>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM seasons WHERE status = 'active' LIMIT 1");
        sqlx::query_as::<_, Season>(&query).fetch_optional(pool).await
    }

    /// All seasons, newest number first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Season>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM seasons ORDER BY number DESC");
        sqlx::query_as::<_, Season>(&query).fetch_all(pool).await
    }

    /// Upcoming seasons whose scheduled start is at or before `now`,
    /// earliest start first.
    pub async fn list_due_upcoming(
        pool: &PgPool,
        now: Timestamp,
    ) -> Result<Vec<Season>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM seasons
             WHERE status = 'upcoming' AND start_date <= $1
             ORDER BY start_date ASC, id ASC"
        );
        sqlx::query_as::<_, Season>(&query)
            .bind(now)
            .fetch_all(pool)
            .await
    }

    /// Patch a season that has not ended. Only non-`None` fields are applied.
    ///
    /// Returns `None` if the row is missing or already ended.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSeason,
    ) -> Result<Option<Season>, sqlx::Error> {
        let query = format!(
            "UPDATE seasons SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                rank_reset_type = COALESCE($6, rank_reset_type),
                soft_reset_percentage = COALESCE($7, soft_reset_percentage),
                rewards = COALESCE($8, rewards),
                updated_at = NOW()
             WHERE id = $1 AND status <> 'ended'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Season>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.rank_reset_type.map(RankResetType::as_str))
            .bind(input.soft_reset_percentage)
            .bind(input.rewards.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    /// `upcoming -> active`, stamping the actual activation time.
    pub async fn activate(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<Season>, sqlx::Error> {
        Self::transition(pool, id, SeasonStatus::Upcoming, SeasonStatus::Active, "start_date", now)
            .await
    }

    /// `active -> ended`, stamping the actual end time.
    pub async fn mark_ended(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<Season>, sqlx::Error> {
        Self::transition(pool, id, SeasonStatus::Active, SeasonStatus::Ended, "end_date", now).await
    }

    async fn transition(
        pool: &PgPool,
        id: DbId,
        from: SeasonStatus,
        to: SeasonStatus,
        stamp_column: &str,
        now: Timestamp,
    ) -> Result<Option<Season>, sqlx::Error> {
        let query = format!(
            "UPDATE seasons SET status = $3, {stamp_column} = $4, updated_at = NOW()
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Season>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Delete an upcoming season. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM seasons WHERE id = $1 AND status = 'upcoming'")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
