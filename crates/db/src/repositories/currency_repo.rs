//! Repository for `player_wallets` and `currency_transactions`.

use arena_core::types::DbId;
use sqlx::PgPool;

use crate::models::currency::CurrencyAdjustment;

pub struct CurrencyRepo;

impl CurrencyRepo {
    /// Append a ledger row and move the wallet balance in one transaction.
    ///
    /// A repeated `reference_id` is a no-op returning `false`.
    pub async fn apply(pool: &PgPool, input: &CurrencyAdjustment) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let inserted: Option<DbId> = sqlx::query_scalar(
            "INSERT INTO currency_transactions \
                (user_id, gold_delta, gems_delta, transaction_type, description, \
                 reference_id, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (reference_id) DO NOTHING \
             RETURNING id",
        )
        .bind(input.user_id)
        .bind(input.gold_delta)
        .bind(input.gems_delta)
        .bind(&input.transaction_type)
        .bind(&input.description)
        .bind(&input.reference_id)
        .bind(&input.metadata)
        .fetch_optional(&mut *tx)
        .await?;

        if inserted.is_none() {
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO player_wallets (user_id, gold, gems) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) DO UPDATE SET \
                gold = player_wallets.gold + EXCLUDED.gold, \
                gems = player_wallets.gems + EXCLUDED.gems, \
                updated_at = NOW()",
        )
        .bind(input.user_id)
        .bind(input.gold_delta)
        .bind(input.gems_delta)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}
