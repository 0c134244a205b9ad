//! Sale entity model and DTOs.

use arena_core::sales::{SaleConditions, SaleType};
use arena_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// A row from the `sales` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sale {
    pub id: DbId,
    /// Business key, unique across all sales.
    pub sale_id: String,
    pub name: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub sale_type: SaleType,
    pub discount_percent: Option<i32>,
    pub bonus_cards: Option<i32>,
    pub bonus_gems: Option<i32>,
    /// Empty means every product.
    pub applicable_products: Vec<String>,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub is_active: bool,
    pub priority: i32,
    pub usage_count: i64,
    pub conditions: Option<Json<SaleConditions>>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Sale {
    pub fn conditions(&self) -> Option<&SaleConditions> {
        self.conditions.as_ref().map(|c| &c.0)
    }
}

/// DTO for creating a sale.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSale {
    #[validate(length(min = 1, max = 64))]
    pub sale_id: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    pub sale_type: SaleType,
    pub discount_percent: Option<i32>,
    pub bonus_cards: Option<i32>,
    pub bonus_gems: Option<i32>,
    #[serde(default)]
    pub applicable_products: Vec<String>,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    /// Defaults to `true`.
    pub is_active: Option<bool>,
    /// Defaults to `0`.
    pub priority: Option<i32>,
    pub conditions: Option<SaleConditions>,
}

/// DTO for a flash sale: live immediately, short fixed duration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFlashSale {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    pub discount_percent: i32,
    #[serde(default)]
    pub applicable_products: Vec<String>,
    /// Defaults to the configured flash sale duration. At most one year.
    #[validate(range(min = 1, max = 8760))]
    pub duration_hours: Option<i64>,
    pub bonus_cards: Option<i32>,
    pub bonus_gems: Option<i32>,
}

/// DTO for editing a sale. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSale {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub discount_percent: Option<i32>,
    pub bonus_cards: Option<i32>,
    pub bonus_gems: Option<i32>,
    pub applicable_products: Option<Vec<String>>,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub is_active: Option<bool>,
    pub priority: Option<i32>,
    pub conditions: Option<SaleConditions>,
}
