//! Repository for the `sale_usages` table.

use arena_core::types::DbId;
use sqlx::PgPool;

use crate::models::sale_usage::{CreateSaleUsage, SaleUsage, SaleUsageStats};

const COLUMNS: &str = "id, user_id, sale_id, product_id, original_price, discounted_price, \
    discount_amount, used_at";

pub struct SaleUsageRepo;

impl SaleUsageRepo {
    /// Insert a usage row and bump the sale's `usage_count` by one, atomically.
    ///
    /// Returns `None` (and writes nothing) if the sale no longer exists.
    pub async fn record(
        pool: &PgPool,
        input: &CreateSaleUsage,
    ) -> Result<Option<SaleUsage>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let bumped = sqlx::query(
            "UPDATE sales SET usage_count = usage_count + 1, updated_at = NOW() \
             WHERE sale_id = $1",
        )
        .bind(&input.sale_id)
        .execute(&mut *tx)
        .await?;
        if bumped.rows_affected() == 0 {
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO sale_usages
                (user_id, sale_id, product_id, original_price, discounted_price,
                 discount_amount, used_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let usage = sqlx::query_as::<_, SaleUsage>(&query)
            .bind(input.user_id)
            .bind(&input.sale_id)
            .bind(&input.product_id)
            .bind(input.original_price)
            .bind(input.discounted_price)
            .bind(input.discount_amount())
            .bind(input.used_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(usage))
    }

    pub async fn count_for_user(
        pool: &PgPool,
        sale_id: &str,
        user_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sale_usages WHERE sale_id = $1 AND user_id = $2",
        )
        .bind(sale_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    pub async fn stats(pool: &PgPool, sale_id: &str) -> Result<SaleUsageStats, sqlx::Error> {
        sqlx::query_as::<_, SaleUsageStats>(
            "SELECT COUNT(*)::BIGINT AS total_uses, \
                    COUNT(DISTINCT user_id)::BIGINT AS unique_users, \
                    COALESCE(SUM(discount_amount), 0)::BIGINT AS total_discount \
             FROM sale_usages WHERE sale_id = $1",
        )
        .bind(sale_id)
        .fetch_one(pool)
        .await
    }
}
