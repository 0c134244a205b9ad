//! Reward tiers: threshold-based reward brackets attached to a season.
//!
//! A rating maps to the highest tier whose `min_elo` it meets. Tier names are
//! lookup keys, so a season's tier list must not repeat a name; that is
//! checked when the list is defined, not when rewards are paid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Rating;

/// Name of the zero-reward tier returned when no tiers are configured.
pub const UNRANKED_TIER: &str = "Unranked";

/// A reward bracket. `min_elo` is an inclusive lower bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTier {
    pub tier: String,
    pub min_elo: Rating,
    pub gold_reward: i64,
    pub gems_reward: i64,
    /// Number of card packs granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_pack_reward: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_card_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_reward: Option<String>,
}

impl RewardTier {
    /// A tier granting only gold and gems.
    pub fn new(tier: impl Into<String>, min_elo: Rating, gold_reward: i64, gems_reward: i64) -> Self {
        Self {
            tier: tier.into(),
            min_elo,
            gold_reward,
            gems_reward,
            card_pack_reward: None,
            exclusive_card_id: None,
            title_reward: None,
        }
    }

    /// Whether paying this tier involves the currency ledger.
    pub fn has_currency_reward(&self) -> bool {
        self.gold_reward > 0 || self.gems_reward > 0
    }
}

/// The built-in zero-reward tier.
pub fn unranked_tier() -> RewardTier {
    RewardTier::new(UNRANKED_TIER, 0, 0, 0)
}

/// Tier ladder applied to seasons created without one.
pub fn default_reward_tiers() -> Vec<RewardTier> {
    let mut legend = RewardTier::new("Legend", 2100, 5000, 500);
    legend.card_pack_reward = Some(10);
    legend.title_reward = Some("Legend".to_string());

    let mut master = RewardTier::new("Master", 1900, 3500, 250);
    master.card_pack_reward = Some(5);

    vec![
        RewardTier::new("Bronze", 0, 100, 0),
        RewardTier::new("Silver", 1100, 250, 10),
        RewardTier::new("Gold", 1300, 500, 25),
        RewardTier::new("Platinum", 1500, 1000, 50),
        RewardTier::new("Diamond", 1700, 2000, 100),
        master,
        legend,
    ]
}

/// The tiers a season actually pays: its own list, or the defaults if empty.
pub fn effective_tiers(configured: &[RewardTier]) -> Vec<RewardTier> {
    if configured.is_empty() {
        default_reward_tiers()
    } else {
        configured.to_vec()
    }
}

/// Resolve the tier for `rating`.
///
/// Tiers are walked by descending `min_elo` (stable, input untouched) and the
/// first one the rating meets wins. A rating below every threshold gets the
/// lowest tier; an empty list yields [`unranked_tier`].
pub fn resolve_tier(rating: Rating, tiers: &[RewardTier]) -> RewardTier {
    let mut descending: Vec<&RewardTier> = tiers.iter().collect();
    descending.sort_by(|a, b| b.min_elo.cmp(&a.min_elo));

    if let Some(tier) = descending.iter().find(|t| rating >= t.min_elo) {
        return (*tier).clone();
    }

    tiers
        .iter()
        .min_by_key(|t| t.min_elo)
        .cloned()
        .unwrap_or_else(unranked_tier)
}

/// The next tier above `rating`, if any: the lowest threshold it has not met.
pub fn next_tier(rating: Rating, tiers: &[RewardTier]) -> Option<RewardTier> {
    tiers
        .iter()
        .filter(|t| t.min_elo > rating)
        .min_by_key(|t| t.min_elo)
        .cloned()
}

/// Validate a tier list at definition time.
///
/// Names must be non-empty and unique; rewards must be non-negative.
pub fn validate_reward_tiers(tiers: &[RewardTier]) -> Result<(), CoreError> {
    let mut seen = std::collections::HashSet::new();
    for tier in tiers {
        let name = tier.tier.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("Reward tier name must not be empty".into()));
        }
        if !seen.insert(name) {
            return Err(CoreError::Validation(format!(
                "Duplicate reward tier name '{name}'"
            )));
        }
        if tier.gold_reward < 0 || tier.gems_reward < 0 {
            return Err(CoreError::Validation(format!(
                "Reward tier '{name}' has a negative reward"
            )));
        }
        if tier.card_pack_reward.is_some_and(|packs| packs < 0) {
            return Err(CoreError::Validation(format!(
                "Reward tier '{name}' has a negative card pack reward"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// TierTable
// ---------------------------------------------------------------------------

/// Tiers keyed by name, for paying out a snapshot's recorded tier.
#[derive(Debug, Clone)]
pub struct TierTable {
    by_name: BTreeMap<String, RewardTier>,
}

impl TierTable {
    /// Build a table, rejecting lists that fail [`validate_reward_tiers`].
    pub fn new(tiers: &[RewardTier]) -> Result<Self, CoreError> {
        validate_reward_tiers(tiers)?;
        let by_name = tiers
            .iter()
            .map(|t| (t.tier.trim().to_string(), t.clone()))
            .collect();
        Ok(Self { by_name })
    }

    pub fn get(&self, name: &str) -> Option<&RewardTier> {
        self.by_name.get(name.trim())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
