//! PostgreSQL backend: every store call is one repository call.

use arena_core::tiers::RewardTier;
use arena_core::types::{DbId, Timestamp};
use arena_db::models::audit::CreateAuditLog;
use arena_db::models::currency::CurrencyAdjustment;
use arena_db::models::player::{CreatePlayer, Player, RatingReset};
use arena_db::models::sale::{CreateSale, Sale, UpdateSale};
use arena_db::models::sale_usage::{CreateSaleUsage, SaleUsage, SaleUsageStats};
use arena_db::models::season::{CreateSeason, Season, UpdateSeason};
use arena_db::models::snapshot::{CreateSnapshot, SeasonSnapshot};
use arena_db::repositories::{
    AuditLogRepo, CurrencyRepo, PlayerRepo, SaleRepo, SaleUsageRepo, SeasonRepo, SnapshotRepo,
};
use arena_db::DbPool;

use crate::store::{
    AuditSink, CurrencyLedger, PlayerStore, SaleStore, SeasonStore, StoreResult,
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl SeasonStore for PgStore {
    async fn create_season(
        &self,
        input: &CreateSeason,
        rewards: &[RewardTier],
        created_by: Option<DbId>,
    ) -> StoreResult<Season> {
        SeasonRepo::create(&self.pool, input, rewards, created_by).await
    }

    async fn find_season(&self, id: DbId) -> StoreResult<Option<Season>> {
        SeasonRepo::find_by_id(&self.pool, id).await
    }

    async fn find_season_by_number(&self, number: i32) -> StoreResult<Option<Season>> {
        SeasonRepo::find_by_number(&self.pool, number).await
    }

    async fn find_active_season(&self) -> StoreResult<Option<Season>> {
        SeasonRepo::find_active(&self.pool).await
    }

    async fn list_seasons(&self) -> StoreResult<Vec<Season>> {
        SeasonRepo::list(&self.pool).await
    }

    async fn list_due_upcoming_seasons(&self, now: Timestamp) -> StoreResult<Vec<Season>> {
        SeasonRepo::list_due_upcoming(&self.pool, now).await
    }

    async fn update_season(&self, id: DbId, input: &UpdateSeason) -> StoreResult<Option<Season>> {
        SeasonRepo::update(&self.pool, id, input).await
    }

    async fn activate_season(&self, id: DbId, now: Timestamp) -> StoreResult<Option<Season>> {
        SeasonRepo::activate(&self.pool, id, now).await
    }

    async fn mark_season_ended(&self, id: DbId, now: Timestamp) -> StoreResult<Option<Season>> {
        SeasonRepo::mark_ended(&self.pool, id, now).await
    }

    async fn delete_season(&self, id: DbId) -> StoreResult<bool> {
        SeasonRepo::delete(&self.pool, id).await
    }

    async fn count_snapshots(&self, season_id: DbId) -> StoreResult<i64> {
        SnapshotRepo::count_for_season(&self.pool, season_id).await
    }

    async fn insert_snapshots(&self, rows: &[CreateSnapshot]) -> StoreResult<u64> {
        SnapshotRepo::create_batch(&self.pool, rows).await
    }

    async fn list_snapshots(
        &self,
        season_id: DbId,
        limit: Option<i64>,
    ) -> StoreResult<Vec<SeasonSnapshot>> {
        SnapshotRepo::list_for_season(&self.pool, season_id, limit).await
    }

    async fn list_undistributed_snapshots(
        &self,
        season_id: DbId,
        user_ids: Option<&[DbId]>,
    ) -> StoreResult<Vec<SeasonSnapshot>> {
        SnapshotRepo::list_undistributed(&self.pool, season_id, user_ids).await
    }

    async fn list_user_snapshots(&self, user_id: DbId) -> StoreResult<Vec<SeasonSnapshot>> {
        SnapshotRepo::list_for_user(&self.pool, user_id).await
    }

    async fn claim_snapshot_reward(&self, snapshot_id: DbId, now: Timestamp) -> StoreResult<bool> {
        SnapshotRepo::claim_reward(&self.pool, snapshot_id, now).await
    }

    async fn release_snapshot_reward(&self, snapshot_id: DbId) -> StoreResult<bool> {
        SnapshotRepo::release_reward(&self.pool, snapshot_id).await
    }
}

impl PlayerStore for PgStore {
    async fn create_player(&self, input: &CreatePlayer) -> StoreResult<Player> {
        PlayerRepo::create(&self.pool, input).await
    }

    async fn find_player(&self, user_id: DbId) -> StoreResult<Option<Player>> {
        PlayerRepo::find_by_id(&self.pool, user_id).await
    }

    async fn list_ranked_players(&self) -> StoreResult<Vec<Player>> {
        PlayerRepo::list_ranked(&self.pool).await
    }

    async fn list_players_with_history(&self) -> StoreResult<Vec<Player>> {
        PlayerRepo::list_with_history(&self.pool).await
    }

    async fn apply_rating_resets(&self, resets: &[RatingReset]) -> StoreResult<u64> {
        PlayerRepo::apply_ratings(&self.pool, resets).await
    }
}

impl SaleStore for PgStore {
    async fn create_sale(&self, input: &CreateSale, created_by: Option<DbId>) -> StoreResult<Sale> {
        SaleRepo::create(&self.pool, input, created_by).await
    }

    async fn find_sale(&self, sale_id: &str) -> StoreResult<Option<Sale>> {
        SaleRepo::find_by_sale_id(&self.pool, sale_id).await
    }

    async fn list_sales(&self, include_inactive: bool) -> StoreResult<Vec<Sale>> {
        SaleRepo::list(&self.pool, include_inactive).await
    }

    async fn list_current_sales(&self, now: Timestamp) -> StoreResult<Vec<Sale>> {
        SaleRepo::list_current(&self.pool, now).await
    }

    async fn update_sale(&self, sale_id: &str, input: &UpdateSale) -> StoreResult<Option<Sale>> {
        SaleRepo::update(&self.pool, sale_id, input).await
    }

    async fn set_sale_active(&self, sale_id: &str, is_active: bool) -> StoreResult<Option<Sale>> {
        SaleRepo::set_active(&self.pool, sale_id, is_active).await
    }

    async fn end_sale(&self, sale_id: &str, ends_at: Timestamp) -> StoreResult<Option<Sale>> {
        SaleRepo::end_early(&self.pool, sale_id, ends_at).await
    }

    async fn delete_sale(&self, sale_id: &str) -> StoreResult<bool> {
        SaleRepo::delete(&self.pool, sale_id).await
    }

    async fn deactivate_expired_sales(&self, now: Timestamp) -> StoreResult<u64> {
        SaleRepo::deactivate_expired(&self.pool, now).await
    }

    async fn record_sale_usage(&self, input: &CreateSaleUsage) -> StoreResult<Option<SaleUsage>> {
        SaleUsageRepo::record(&self.pool, input).await
    }

    async fn count_user_sale_usages(&self, sale_id: &str, user_id: DbId) -> StoreResult<i64> {
        SaleUsageRepo::count_for_user(&self.pool, sale_id, user_id).await
    }

    async fn sale_usage_stats(&self, sale_id: &str) -> StoreResult<SaleUsageStats> {
        SaleUsageRepo::stats(&self.pool, sale_id).await
    }
}

impl CurrencyLedger for PgStore {
    async fn adjust_currency(&self, adjustment: &CurrencyAdjustment) -> StoreResult<bool> {
        CurrencyRepo::apply(&self.pool, adjustment).await
    }
}

impl AuditSink for PgStore {
    async fn record_audit(&self, entry: &CreateAuditLog) -> StoreResult<()> {
        AuditLogRepo::create(&self.pool, entry).await.map(|_| ())
    }
}
