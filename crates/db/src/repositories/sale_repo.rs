//! Repository for the `sales` table.

use arena_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::sale::{CreateSale, Sale, UpdateSale};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, sale_id, name, description, sale_type, discount_percent, \
    bonus_cards, bonus_gems, applicable_products, starts_at, ends_at, is_active, priority, \
    usage_count, conditions, created_by, created_at, updated_at";

/// Provides CRUD operations for sales, addressed by business key.
pub struct SaleRepo;

impl SaleRepo {
    /// Insert a new sale, returning the created row.
    ///
    /// If `is_active` is `None`, defaults to `true`.
    /// If `priority` is `None`, defaults to `0`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSale,
        created_by: Option<DbId>,
    ) -> Result<Sale, sqlx::Error> {
        let query = format!(
            "INSERT INTO sales
                (sale_id, name, description, sale_type, discount_percent, bonus_cards,
                 bonus_gems, applicable_products, starts_at, ends_at, is_active, priority,
                 conditions, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, TRUE),
                     COALESCE($12, 0), $13, $14)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sale>(&query)
            .bind(&input.sale_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.sale_type.as_str())
            .bind(input.discount_percent)
            .bind(input.bonus_cards)
            .bind(input.bonus_gems)
            .bind(&input.applicable_products)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.is_active)
            .bind(input.priority)
            .bind(input.conditions.as_ref().map(Json))
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_sale_id(pool: &PgPool, sale_id: &str) -> Result<Option<Sale>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sales WHERE sale_id = $1");
        sqlx::query_as::<_, Sale>(&query)
            .bind(sale_id)
            .fetch_optional(pool)
            .await
    }

    /// All sales, most recent start first. Switched-off sales are included
    /// only when `include_inactive` is set.
    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Sale>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sales
             WHERE $1 OR is_active
             ORDER BY starts_at DESC, id DESC"
        );
        sqlx::query_as::<_, Sale>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Sales live at `now`: switched on, `starts_at <= now < ends_at`.
    /// Highest priority first, earlier creation first among equals.
    pub async fn list_current(pool: &PgPool, now: Timestamp) -> Result<Vec<Sale>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sales
             WHERE is_active AND starts_at <= $1 AND ends_at > $1
             ORDER BY priority DESC, id ASC"
        );
        sqlx::query_as::<_, Sale>(&query)
            .bind(now)
            .fetch_all(pool)
            .await
    }

    /// Update a sale. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no sale with the given key exists.
    pub async fn update(
        pool: &PgPool,
        sale_id: &str,
        input: &UpdateSale,
    ) -> Result<Option<Sale>, sqlx::Error> {
        let query = format!(
            "UPDATE sales SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                discount_percent = COALESCE($4, discount_percent),
                bonus_cards = COALESCE($5, bonus_cards),
                bonus_gems = COALESCE($6, bonus_gems),
                applicable_products = COALESCE($7, applicable_products),
                starts_at = COALESCE($8, starts_at),
                ends_at = COALESCE($9, ends_at),
                is_active = COALESCE($10, is_active),
                priority = COALESCE($11, priority),
                conditions = COALESCE($12, conditions),
                updated_at = NOW()
             WHERE sale_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sale>(&query)
            .bind(sale_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.discount_percent)
            .bind(input.bonus_cards)
            .bind(input.bonus_gems)
            .bind(&input.applicable_products)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.is_active)
            .bind(input.priority)
            .bind(input.conditions.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    pub async fn set_active(
        pool: &PgPool,
        sale_id: &str,
        is_active: bool,
    ) -> Result<Option<Sale>, sqlx::Error> {
        let query = format!(
            "UPDATE sales SET is_active = $2, updated_at = NOW()
             WHERE sale_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sale>(&query)
            .bind(sale_id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }

    /// Close the window at `now` and switch the sale off.
    pub async fn end_early(
        pool: &PgPool,
        sale_id: &str,
        now: Timestamp,
    ) -> Result<Option<Sale>, sqlx::Error> {
        let query = format!(
            "UPDATE sales SET ends_at = $2, is_active = FALSE, updated_at = NOW()
             WHERE sale_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sale>(&query)
            .bind(sale_id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Switch off every active sale whose window closed at or before `now`.
    /// Returns the number of sales deactivated.
    pub async fn deactivate_expired(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sales SET is_active = FALSE, updated_at = NOW() \
             WHERE is_active AND ends_at <= $1",
        )
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Permanently delete a sale. Usage history is kept.
    pub async fn delete(pool: &PgPool, sale_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sales WHERE sale_id = $1")
            .bind(sale_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
