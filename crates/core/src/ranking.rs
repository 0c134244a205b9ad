//! End-of-season ranking: turns live player standings into snapshot entries.

use serde::Serialize;

use crate::tiers::{effective_tiers, resolve_tier, RewardTier};
use crate::types::{DbId, Rating};

/// A player's live competitive record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStanding {
    pub user_id: DbId,
    pub username: String,
    pub rating: Rating,
    pub wins: i32,
    pub losses: i32,
}

impl PlayerStanding {
    pub fn games_played(&self) -> i32 {
        self.wins + self.losses
    }

    /// Ranked means at least one ranked game this season.
    pub fn is_ranked(&self) -> bool {
        self.games_played() > 0
    }
}

/// One row of the frozen leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotEntry {
    pub user_id: DbId,
    pub username: String,
    pub final_elo: Rating,
    pub tier: String,
    pub rank: i32,
    pub games_played: i32,
    pub wins: i32,
    pub losses: i32,
}

/// Rank every ranked player and resolve their tier.
///
/// Unranked players are dropped. Order is rating descending with ascending
/// user id breaking ties, and ranks are dense `1..=N`. An empty tier list
/// falls back to the default ladder.
pub fn rank_standings(players: Vec<PlayerStanding>, tiers: &[RewardTier]) -> Vec<SnapshotEntry> {
    let tiers = effective_tiers(tiers);

    let mut ranked: Vec<PlayerStanding> = players.into_iter().filter(|p| p.is_ranked()).collect();
    ranked.sort_by(|a, b| b.rating.cmp(&a.rating).then(a.user_id.cmp(&b.user_id)));

    ranked
        .into_iter()
        .enumerate()
        .map(|(idx, p)| SnapshotEntry {
            tier: resolve_tier(p.rating, &tiers).tier,
            rank: idx as i32 + 1,
            games_played: p.games_played(),
            user_id: p.user_id,
            username: p.username,
            final_elo: p.rating,
            wins: p.wins,
            losses: p.losses,
        })
        .collect()
}
