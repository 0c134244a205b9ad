//! Repository for the `players` table.

use arena_core::types::DbId;
use sqlx::PgPool;

use crate::models::player::{CreatePlayer, Player, RatingReset};

const COLUMNS: &str =
    "user_id, username, rating, wins, losses, last_login_at, created_at, updated_at";

pub struct PlayerRepo;

impl PlayerRepo {
    pub async fn create(pool: &PgPool, input: &CreatePlayer) -> Result<Player, sqlx::Error> {
        let query = format!(
            "INSERT INTO players (username, rating, wins, losses, last_login_at)
             VALUES ($1, COALESCE($2, 0), COALESCE($3, 0), COALESCE($4, 0), $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Player>(&query)
            .bind(&input.username)
            .bind(input.rating)
            .bind(input.wins)
            .bind(input.losses)
            .bind(input.last_login_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, user_id: DbId) -> Result<Option<Player>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM players WHERE user_id = $1");
        sqlx::query_as::<_, Player>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Players with at least one ranked game this season.
    pub async fn list_ranked(pool: &PgPool) -> Result<Vec<Player>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM players
             WHERE wins + losses > 0
             ORDER BY rating DESC, user_id ASC"
        );
        sqlx::query_as::<_, Player>(&query).fetch_all(pool).await
    }

    /// Players with a non-zero rating, i.e. ranked history.
    pub async fn list_with_history(pool: &PgPool) -> Result<Vec<Player>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM players WHERE rating <> 0 ORDER BY user_id");
        sqlx::query_as::<_, Player>(&query).fetch_all(pool).await
    }

    /// Write new ratings and zero wins/losses for every listed player.
    /// Returns the number of rows updated.
    pub async fn apply_ratings(pool: &PgPool, resets: &[RatingReset]) -> Result<u64, sqlx::Error> {
        if resets.is_empty() {
            return Ok(0);
        }

        let user_ids: Vec<DbId> = resets.iter().map(|r| r.user_id).collect();
        let ratings: Vec<i32> = resets.iter().map(|r| r.rating).collect();

        let result = sqlx::query(
            "UPDATE players p SET rating = r.rating, wins = 0, losses = 0, updated_at = NOW() \
             FROM UNNEST($1::bigint[], $2::int[]) AS r(user_id, rating) \
             WHERE p.user_id = r.user_id",
        )
        .bind(&user_ids)
        .bind(&ratings)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
