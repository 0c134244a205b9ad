//! Currency ledger vocabulary shared by the reward payout and the ledger.

use crate::types::DbId;

/// Ledger transaction type for season reward payouts.
pub const TRANSACTION_REWARD: &str = "reward";

/// Idempotency reference for one player's reward from one season.
///
/// The ledger applies at most one transaction per reference, so a payout
/// retried after a crash cannot credit the player twice.
pub fn season_reward_reference(season_id: DbId, user_id: DbId) -> String {
    format!("season-reward:{season_id}:{user_id}")
}
