//! Collaborator traits the engines are written against.
//!
//! Each trait is one facet of the backing store. [`crate::pg::PgStore`]
//! implements them over PostgreSQL and [`crate::memory::MemoryStore`] in
//! process. Every method is a single store call with no multi-call
//! atomicity.

use std::future::Future;

use arena_core::tiers::RewardTier;
use arena_core::types::{DbId, Timestamp};
use arena_db::models::audit::CreateAuditLog;
use arena_db::models::currency::CurrencyAdjustment;
use arena_db::models::player::{CreatePlayer, Player, RatingReset};
use arena_db::models::sale::{CreateSale, Sale, UpdateSale};
use arena_db::models::sale_usage::{CreateSaleUsage, SaleUsage, SaleUsageStats};
use arena_db::models::season::{CreateSeason, Season, UpdateSeason};
use arena_db::models::snapshot::{CreateSnapshot, SeasonSnapshot};

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Seasons and their snapshots.
pub trait SeasonStore: Send + Sync {
    fn create_season(
        &self,
        input: &CreateSeason,
        rewards: &[RewardTier],
        created_by: Option<DbId>,
    ) -> impl Future<Output = StoreResult<Season>> + Send;

    fn find_season(&self, id: DbId) -> impl Future<Output = StoreResult<Option<Season>>> + Send;

    fn find_season_by_number(
        &self,
        number: i32,
    ) -> impl Future<Output = StoreResult<Option<Season>>> + Send;

    fn find_active_season(&self) -> impl Future<Output = StoreResult<Option<Season>>> + Send;

    fn list_seasons(&self) -> impl Future<Output = StoreResult<Vec<Season>>> + Send;

    fn list_due_upcoming_seasons(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = StoreResult<Vec<Season>>> + Send;

    /// `None` when the season is missing or already ended.
    fn update_season(
        &self,
        id: DbId,
        input: &UpdateSeason,
    ) -> impl Future<Output = StoreResult<Option<Season>>> + Send;

    /// `upcoming -> active` with `start_date = now`. `None` if not upcoming.
    fn activate_season(
        &self,
        id: DbId,
        now: Timestamp,
    ) -> impl Future<Output = StoreResult<Option<Season>>> + Send;

    /// `active -> ended` with `end_date = now`. `None` if not active.
    fn mark_season_ended(
        &self,
        id: DbId,
        now: Timestamp,
    ) -> impl Future<Output = StoreResult<Option<Season>>> + Send;

    /// Deletes only upcoming seasons.
    fn delete_season(&self, id: DbId) -> impl Future<Output = StoreResult<bool>> + Send;

    fn count_snapshots(&self, season_id: DbId) -> impl Future<Output = StoreResult<i64>> + Send;

    /// Rows already present for `(season_id, user_id)` are skipped.
    fn insert_snapshots(
        &self,
        rows: &[CreateSnapshot],
    ) -> impl Future<Output = StoreResult<u64>> + Send;

    fn list_snapshots(
        &self,
        season_id: DbId,
        limit: Option<i64>,
    ) -> impl Future<Output = StoreResult<Vec<SeasonSnapshot>>> + Send;

    fn list_undistributed_snapshots(
        &self,
        season_id: DbId,
        user_ids: Option<&[DbId]>,
    ) -> impl Future<Output = StoreResult<Vec<SeasonSnapshot>>> + Send;

    fn list_user_snapshots(
        &self,
        user_id: DbId,
    ) -> impl Future<Output = StoreResult<Vec<SeasonSnapshot>>> + Send;

    /// Compare-and-set the distributed flag. `false` if already set.
    fn claim_snapshot_reward(
        &self,
        snapshot_id: DbId,
        now: Timestamp,
    ) -> impl Future<Output = StoreResult<bool>> + Send;

    fn release_snapshot_reward(
        &self,
        snapshot_id: DbId,
    ) -> impl Future<Output = StoreResult<bool>> + Send;
}

/// Player competitive records.
pub trait PlayerStore: Send + Sync {
    fn create_player(&self, input: &CreatePlayer) -> impl Future<Output = StoreResult<Player>> + Send;

    fn find_player(&self, user_id: DbId) -> impl Future<Output = StoreResult<Option<Player>>> + Send;

    /// Players with `wins + losses > 0`.
    fn list_ranked_players(&self) -> impl Future<Output = StoreResult<Vec<Player>>> + Send;

    /// Players with a non-zero rating.
    fn list_players_with_history(&self) -> impl Future<Output = StoreResult<Vec<Player>>> + Send;

    /// Write ratings and zero wins/losses.
    fn apply_rating_resets(
        &self,
        resets: &[RatingReset],
    ) -> impl Future<Output = StoreResult<u64>> + Send;
}

/// Sales and their redemption history.
pub trait SaleStore: Send + Sync {
    fn create_sale(
        &self,
        input: &CreateSale,
        created_by: Option<DbId>,
    ) -> impl Future<Output = StoreResult<Sale>> + Send;

    fn find_sale(&self, sale_id: &str) -> impl Future<Output = StoreResult<Option<Sale>>> + Send;

    fn list_sales(
        &self,
        include_inactive: bool,
    ) -> impl Future<Output = StoreResult<Vec<Sale>>> + Send;

    /// Live at `now`, priority descending then creation order.
    fn list_current_sales(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = StoreResult<Vec<Sale>>> + Send;

    fn update_sale(
        &self,
        sale_id: &str,
        input: &UpdateSale,
    ) -> impl Future<Output = StoreResult<Option<Sale>>> + Send;

    fn set_sale_active(
        &self,
        sale_id: &str,
        is_active: bool,
    ) -> impl Future<Output = StoreResult<Option<Sale>>> + Send;

    /// Set `ends_at = ends_at` and switch the sale off.
    fn end_sale(
        &self,
        sale_id: &str,
        ends_at: Timestamp,
    ) -> impl Future<Output = StoreResult<Option<Sale>>> + Send;

    fn delete_sale(&self, sale_id: &str) -> impl Future<Output = StoreResult<bool>> + Send;

    fn deactivate_expired_sales(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Insert the usage row and bump `usage_count` together. `None` if the
    /// sale is gone.
    fn record_sale_usage(
        &self,
        input: &CreateSaleUsage,
    ) -> impl Future<Output = StoreResult<Option<SaleUsage>>> + Send;

    fn count_user_sale_usages(
        &self,
        sale_id: &str,
        user_id: DbId,
    ) -> impl Future<Output = StoreResult<i64>> + Send;

    fn sale_usage_stats(
        &self,
        sale_id: &str,
    ) -> impl Future<Output = StoreResult<SaleUsageStats>> + Send;
}

/// The player currency ledger.
pub trait CurrencyLedger: Send + Sync {
    /// Apply a balance change. Returns `false` when the adjustment's
    /// reference was already applied.
    fn adjust_currency(
        &self,
        adjustment: &CurrencyAdjustment,
    ) -> impl Future<Output = StoreResult<bool>> + Send;
}

/// Where audit entries go.
pub trait AuditSink: Send + Sync {
    fn record_audit(&self, entry: &CreateAuditLog) -> impl Future<Output = StoreResult<()>> + Send;
}
