//! Promotional sale rules: activation window, product applicability,
//! validation, priority ordering, and discounted price quotes.

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// SaleType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleType {
    Flash,
    Weekend,
    Launch,
    Holiday,
    Anniversary,
    Returning,
}

impl SaleType {
    pub fn as_str(self) -> &'static str {
        match self {
            SaleType::Flash => "flash",
            SaleType::Weekend => "weekend",
            SaleType::Launch => "launch",
            SaleType::Holiday => "holiday",
            SaleType::Anniversary => "anniversary",
            SaleType::Returning => "returning",
        }
    }
}

impl fmt::Display for SaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flash" => Ok(SaleType::Flash),
            "weekend" => Ok(SaleType::Weekend),
            "launch" => Ok(SaleType::Launch),
            "holiday" => Ok(SaleType::Holiday),
            "anniversary" => Ok(SaleType::Anniversary),
            "returning" => Ok(SaleType::Returning),
            other => Err(CoreError::Validation(format!("Unknown sale type '{other}'"))),
        }
    }
}

impl TryFrom<String> for SaleType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

/// Optional per-sale eligibility rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleConditions {
    /// Stored for reporting; not part of the eligibility checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_purchase_amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_uses_total: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_uses_per_user: Option<i64>,
    #[serde(default)]
    pub returning_player_only: bool,
    #[serde(default)]
    pub new_player_only: bool,
}

pub fn validate_conditions(conditions: &SaleConditions) -> Result<(), CoreError> {
    if conditions.min_purchase_amount.is_some_and(|v| v < 0) {
        return Err(CoreError::Validation(
            "min_purchase_amount must not be negative".into(),
        ));
    }
    if conditions.max_uses_total.is_some_and(|v| v <= 0) {
        return Err(CoreError::Validation("max_uses_total must be positive".into()));
    }
    if conditions.max_uses_per_user.is_some_and(|v| v <= 0) {
        return Err(CoreError::Validation("max_uses_per_user must be positive".into()));
    }
    if conditions.returning_player_only && conditions.new_player_only {
        return Err(CoreError::Validation(
            "A sale cannot be limited to both returning and new players".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Window and applicability
// ---------------------------------------------------------------------------

/// `starts_at <= now < ends_at`.
pub fn is_within_window(starts_at: Timestamp, ends_at: Timestamp, now: Timestamp) -> bool {
    starts_at <= now && now < ends_at
}

/// A sale is live iff it is switched on and `now` is inside its window.
pub fn is_currently_active(
    is_active: bool,
    starts_at: Timestamp,
    ends_at: Timestamp,
    now: Timestamp,
) -> bool {
    is_active && is_within_window(starts_at, ends_at, now)
}

/// An empty product list means the sale covers every product.
pub fn applies_to_product(applicable_products: &[String], product_id: &str) -> bool {
    applicable_products.is_empty() || applicable_products.iter().any(|p| p == product_id)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_sale_window(starts_at: Timestamp, ends_at: Timestamp) -> Result<(), CoreError> {
    if ends_at > starts_at {
        Ok(())
    } else {
        Err(CoreError::InvalidDateRange(format!(
            "Sale end {ends_at} must be after its start {starts_at}"
        )))
    }
}

pub fn validate_discount_percent(
    discount_percent: Option<i32>,
    max_discount_percent: i32,
) -> Result<(), CoreError> {
    match discount_percent {
        Some(pct) if !(0..=max_discount_percent).contains(&pct) => {
            Err(CoreError::InvalidDiscountRange(format!(
                "Discount {pct}% must be between 0% and {max_discount_percent}%"
            )))
        }
        _ => Ok(()),
    }
}

/// Longest flash sale that can be scheduled, one year.
pub const MAX_FLASH_SALE_HOURS: i64 = 24 * 365;

/// End of a flash sale starting at `now` and lasting `hours`.
pub fn flash_sale_end(now: Timestamp, hours: i64) -> Result<Timestamp, CoreError> {
    let out_of_range = || {
        CoreError::InvalidDateRange(format!(
            "Flash sale duration {hours}h must be between 1h and {MAX_FLASH_SALE_HOURS}h"
        ))
    };
    if !(1..=MAX_FLASH_SALE_HOURS).contains(&hours) {
        return Err(out_of_range());
    }
    TimeDelta::try_hours(hours)
        .and_then(|d| now.checked_add_signed(d))
        .ok_or_else(out_of_range)
}

pub fn validate_bonuses(bonus_cards: Option<i32>, bonus_gems: Option<i32>) -> Result<(), CoreError> {
    if bonus_cards.is_some_and(|v| v < 0) || bonus_gems.is_some_and(|v| v < 0) {
        return Err(CoreError::Validation("Sale bonuses must not be negative".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Selection and pricing
// ---------------------------------------------------------------------------

/// Stable sort by priority, highest first. Equal priorities keep input order.
pub fn order_by_priority<T>(candidates: &mut [T], priority: impl Fn(&T) -> i32) {
    candidates.sort_by(|a, b| priority(b).cmp(&priority(a)));
}

/// `floor(price * (1 - pct / 100))` for non-negative prices.
///
/// Widened to `i128` so any `i64` price is safe; for `pct` in `0..=100` the
/// result never exceeds `price`.
pub fn discounted_price(price: i64, discount_percent: i32) -> i64 {
    let scaled = i128::from(price) * i128::from(100 - discount_percent);
    let floored = scaled.div_euclid(100);
    i64::try_from(floored).unwrap_or(if floored < 0 { i64::MIN } else { i64::MAX })
}

/// The outcome of a price lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub final_gold_price: Option<i64>,
    pub final_gem_price: Option<i64>,
    /// Percent taken off, `0` when no sale applied.
    pub discount_applied: i32,
    pub bonus_cards: i32,
    pub bonus_gems: i32,
    pub sale_id: Option<String>,
}

impl PriceQuote {
    /// Original prices, nothing applied.
    pub fn undiscounted(gold_price: Option<i64>, gem_price: Option<i64>) -> Self {
        Self {
            final_gold_price: gold_price,
            final_gem_price: gem_price,
            discount_applied: 0,
            bonus_cards: 0,
            bonus_gems: 0,
            sale_id: None,
        }
    }

    /// Apply a selected sale's discount and carry its bonuses through.
    pub fn with_sale(
        gold_price: Option<i64>,
        gem_price: Option<i64>,
        sale_id: &str,
        discount_percent: Option<i32>,
        bonus_cards: Option<i32>,
        bonus_gems: Option<i32>,
    ) -> Self {
        let pct = discount_percent.unwrap_or(0);
        Self {
            final_gold_price: gold_price.map(|p| discounted_price(p, pct)),
            final_gem_price: gem_price.map(|p| discounted_price(p, pct)),
            discount_applied: pct,
            bonus_cards: bonus_cards.unwrap_or(0),
            bonus_gems: bonus_gems.unwrap_or(0),
            sale_id: Some(sale_id.to_string()),
        }
    }
}
