//! Sale redemption records. Append-only.

use arena_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `sale_usages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SaleUsage {
    pub id: DbId,
    pub user_id: DbId,
    pub sale_id: String,
    pub product_id: String,
    pub original_price: i64,
    pub discounted_price: i64,
    /// `original_price - discounted_price`.
    pub discount_amount: i64,
    pub used_at: Timestamp,
}

/// DTO for recording a redemption.
#[derive(Debug, Clone)]
pub struct CreateSaleUsage {
    pub user_id: DbId,
    pub sale_id: String,
    pub product_id: String,
    pub original_price: i64,
    pub discounted_price: i64,
    pub used_at: Timestamp,
}

impl CreateSaleUsage {
    pub fn discount_amount(&self) -> i64 {
        self.original_price - self.discounted_price
    }
}

/// Aggregate redemption figures for one sale.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize)]
pub struct SaleUsageStats {
    pub total_uses: i64,
    pub unique_users: i64,
    pub total_discount: i64,
}
