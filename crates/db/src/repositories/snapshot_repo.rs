//! Repository for the `season_snapshots` table.

use arena_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::snapshot::{CreateSnapshot, SeasonSnapshot};

const COLUMNS: &str = "id, season_id, season_number, user_id, username, final_elo, tier, \
    rank, games_played, wins, losses, rewards_distributed, distributed_at, created_at";

pub struct SnapshotRepo;

impl SnapshotRepo {
    pub async fn count_for_season(pool: &PgPool, season_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM season_snapshots WHERE season_id = $1")
            .bind(season_id)
            .fetch_one(pool)
            .await
    }

    /// Batch-insert snapshots, ignoring rows that already exist for the
    /// same `(season_id, user_id)`. Returns the number of rows inserted.
    pub async fn create_batch(pool: &PgPool, rows: &[CreateSnapshot]) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }

        let season_ids: Vec<DbId> = rows.iter().map(|r| r.season_id).collect();
        let season_numbers: Vec<i32> = rows.iter().map(|r| r.season_number).collect();
        let user_ids: Vec<DbId> = rows.iter().map(|r| r.user_id).collect();
        let usernames: Vec<String> = rows.iter().map(|r| r.username.clone()).collect();
        let final_elos: Vec<i32> = rows.iter().map(|r| r.final_elo).collect();
        let tiers: Vec<String> = rows.iter().map(|r| r.tier.clone()).collect();
        let ranks: Vec<i32> = rows.iter().map(|r| r.rank).collect();
        let games: Vec<i32> = rows.iter().map(|r| r.games_played).collect();
        let wins: Vec<i32> = rows.iter().map(|r| r.wins).collect();
        let losses: Vec<i32> = rows.iter().map(|r| r.losses).collect();

        let result = sqlx::query(
            "INSERT INTO season_snapshots \
                (season_id, season_number, user_id, username, final_elo, tier, \
                 rank, games_played, wins, losses) \
             SELECT * FROM UNNEST($1::bigint[], $2::int[], $3::bigint[], $4::text[], \
                 $5::int[], $6::text[], $7::int[], $8::int[], $9::int[], $10::int[]) \
             ON CONFLICT (season_id, user_id) DO NOTHING",
        )
        .bind(&season_ids)
        .bind(&season_numbers)
        .bind(&user_ids)
        .bind(&usernames)
        .bind(&final_elos)
        .bind(&tiers)
        .bind(&ranks)
        .bind(&games)
        .bind(&wins)
        .bind(&losses)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Frozen leaderboard for a season, rank ascending.
    pub async fn list_for_season(
        pool: &PgPool,
        season_id: DbId,
        limit: Option<i64>,
    ) -> Result<Vec<SeasonSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM season_snapshots
             WHERE season_id = $1
             ORDER BY rank ASC
             LIMIT $2"
        );
        sqlx::query_as::<_, SeasonSnapshot>(&query)
            .bind(season_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Snapshots not yet paid, optionally restricted to `user_ids`.
    pub async fn list_undistributed(
        pool: &PgPool,
        season_id: DbId,
        user_ids: Option<&[DbId]>,
    ) -> Result<Vec<SeasonSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM season_snapshots
             WHERE season_id = $1 AND rewards_distributed = FALSE
               AND ($2::bigint[] IS NULL OR user_id = ANY($2))
             ORDER BY rank ASC"
        );
        sqlx::query_as::<_, SeasonSnapshot>(&query)
            .bind(season_id)
            .bind(user_ids)
            .fetch_all(pool)
            .await
    }

    /// Every snapshot for a user, newest season first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SeasonSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM season_snapshots
             WHERE user_id = $1
             ORDER BY season_number DESC"
        );
        sqlx::query_as::<_, SeasonSnapshot>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Flip `rewards_distributed` from false to true.
    ///
    /// Returns `false` when another caller already claimed the row.
    pub async fn claim_reward(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE season_snapshots SET rewards_distributed = TRUE, distributed_at = $2 \
             WHERE id = $1 AND rewards_distributed = FALSE",
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Undo a claim after the payout failed.
    pub async fn release_reward(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE season_snapshots SET rewards_distributed = FALSE, distributed_at = NULL \
             WHERE id = $1 AND rewards_distributed = TRUE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
