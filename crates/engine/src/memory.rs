//! In-process backend with the same observable semantics as the PostgreSQL
//! one: named unique constraints, status-guarded lifecycle updates, and an
//! idempotent currency ledger.
//!
//! Used by the test suites and for local tooling without a database.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use arena_core::audit::action_to_category;
use arena_core::sales::is_currently_active;
use arena_core::season::SeasonStatus;
use arena_core::tiers::RewardTier;
use arena_core::types::{DbId, Timestamp};
use arena_db::models::audit::{AuditLog, CreateAuditLog};
use arena_db::models::currency::{CurrencyAdjustment, CurrencyTransaction, PlayerWallet};
use arena_db::models::player::{CreatePlayer, Player, RatingReset};
use arena_db::models::sale::{CreateSale, Sale, UpdateSale};
use arena_db::models::sale_usage::{CreateSaleUsage, SaleUsage, SaleUsageStats};
use arena_db::models::season::{CreateSeason, Season, UpdateSeason};
use arena_db::models::snapshot::{CreateSnapshot, SeasonSnapshot};
use sqlx::error::{DatabaseError, ErrorKind};
use sqlx::types::Json;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::store::{
    AuditSink, CurrencyLedger, PlayerStore, SaleStore, SeasonStore, StoreResult,
};

// ---------------------------------------------------------------------------
// Constraint errors
// ---------------------------------------------------------------------------

/// A unique violation reported the way PostgreSQL reports it.
#[derive(Debug)]
struct UniqueViolation {
    constraint: &'static str,
    message: String,
}

impl fmt::Display for UniqueViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for UniqueViolation {}

impl DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        &self.message
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed("23505"))
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }

    fn constraint(&self) -> Option<&str> {
        Some(self.constraint)
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }
}

/// Build the error a unique constraint named `constraint` raises.
pub fn unique_violation_error(constraint: &'static str) -> sqlx::Error {
    sqlx::Error::Database(Box::new(UniqueViolation {
        constraint,
        message: format!("duplicate key value violates unique constraint \"{constraint}\""),
    }))
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Default)]
struct State {
    next_id: DbId,
    players: BTreeMap<DbId, Player>,
    seasons: BTreeMap<DbId, Season>,
    snapshots: BTreeMap<DbId, SeasonSnapshot>,
    sales: BTreeMap<DbId, Sale>,
    usages: Vec<SaleUsage>,
    wallets: BTreeMap<DbId, PlayerWallet>,
    transactions: Vec<CurrencyTransaction>,
    audit_logs: Vec<AuditLog>,
    failing_ledger_users: HashSet<DbId>,
    fail_audit_writes: bool,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn sale_mut(&mut self, sale_id: &str) -> Option<&mut Sale> {
        self.sales.values_mut().find(|s| s.sale_id == sale_id)
    }
}

/// Shared handle to an in-memory store. Clones see the same data.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Row timestamps (`created_at` and friends) are read from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock,
        }
    }

    pub async fn player(&self, user_id: DbId) -> Option<Player> {
        self.state.lock().await.players.get(&user_id).cloned()
    }

    pub async fn wallet(&self, user_id: DbId) -> PlayerWallet {
        self.state
            .lock()
            .await
            .wallets
            .get(&user_id)
            .cloned()
            .unwrap_or(PlayerWallet {
                user_id,
                gold: 0,
                gems: 0,
            })
    }

    pub async fn transactions(&self, user_id: DbId) -> Vec<CurrencyTransaction> {
        self.state
            .lock()
            .await
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn audit_entries(&self) -> Vec<AuditLog> {
        self.state.lock().await.audit_logs.clone()
    }

    pub async fn sale_usages(&self, sale_id: &str) -> Vec<SaleUsage> {
        self.state
            .lock()
            .await
            .usages
            .iter()
            .filter(|u| u.sale_id == sale_id)
            .cloned()
            .collect()
    }

    /// Make every ledger call for `user_id` fail.
    pub async fn fail_currency_for(&self, user_id: DbId) {
        self.state.lock().await.failing_ledger_users.insert(user_id);
    }

    pub async fn restore_currency_for(&self, user_id: DbId) {
        self.state.lock().await.failing_ledger_users.remove(&user_id);
    }

    pub async fn fail_audit_writes(&self, fail: bool) {
        self.state.lock().await.fail_audit_writes = fail;
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Seasons and snapshots
// ---------------------------------------------------------------------------

impl SeasonStore for MemoryStore {
    async fn create_season(
        &self,
        input: &CreateSeason,
        rewards: &[RewardTier],
        created_by: Option<DbId>,
    ) -> StoreResult<Season> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        if state.seasons.values().any(|s| s.number == input.number) {
            return Err(unique_violation_error("uq_seasons_number"));
        }
        let id = state.next_id();
        let season = Season {
            id,
            number: input.number,
            name: input.name.clone(),
            description: input.description.clone(),
            status: SeasonStatus::Upcoming,
            start_date: input.start_date,
            end_date: input.end_date,
            rank_reset_type: input.rank_reset_type,
            soft_reset_percentage: input.soft_reset_percentage,
            rewards: Json(rewards.to_vec()),
            created_by,
            created_at: now,
            updated_at: now,
        };
        state.seasons.insert(id, season.clone());
        Ok(season)
    }

    async fn find_season(&self, id: DbId) -> StoreResult<Option<Season>> {
        Ok(self.state.lock().await.seasons.get(&id).cloned())
    }

    async fn find_season_by_number(&self, number: i32) -> StoreResult<Option<Season>> {
        let state = self.state.lock().await;
        Ok(state.seasons.values().find(|s| s.number == number).cloned())
    }

    async fn find_active_season(&self) -> StoreResult<Option<Season>> {
        let state = self.state.lock().await;
        Ok(state
            .seasons
            .values()
            .find(|s| s.status == SeasonStatus::Active)
            .cloned())
    }

    async fn list_seasons(&self) -> StoreResult<Vec<Season>> {
        let state = self.state.lock().await;
        let mut seasons: Vec<Season> = state.seasons.values().cloned().collect();
        seasons.sort_by(|a, b| b.number.cmp(&a.number));
        Ok(seasons)
    }

    async fn list_due_upcoming_seasons(&self, now: Timestamp) -> StoreResult<Vec<Season>> {
        let state = self.state.lock().await;
        let mut due: Vec<Season> = state
            .seasons
            .values()
            .filter(|s| s.status == SeasonStatus::Upcoming && s.start_date <= now)
            .cloned()
            .collect();
        due.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        Ok(due)
    }

    async fn update_season(&self, id: DbId, input: &UpdateSeason) -> StoreResult<Option<Season>> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        let Some(season) = state.seasons.get_mut(&id) else {
            return Ok(None);
        };
        if season.status == SeasonStatus::Ended {
            return Ok(None);
        }
        if let Some(name) = &input.name {
            season.name = name.clone();
        }
        if let Some(description) = &input.description {
            season.description = Some(description.clone());
        }
        if let Some(start_date) = input.start_date {
            season.start_date = start_date;
        }
        if let Some(end_date) = input.end_date {
            season.end_date = end_date;
        }
        if let Some(reset_type) = input.rank_reset_type {
            season.rank_reset_type = reset_type;
        }
        if let Some(pct) = input.soft_reset_percentage {
            season.soft_reset_percentage = Some(pct);
        }
        if let Some(rewards) = &input.rewards {
            season.rewards = Json(rewards.clone());
        }
        season.updated_at = now;
        Ok(Some(season.clone()))
    }

    async fn activate_season(&self, id: DbId, now: Timestamp) -> StoreResult<Option<Season>> {
        let mut state = self.state.lock().await;
        let other_active = state
            .seasons
            .values()
            .any(|s| s.id != id && s.status == SeasonStatus::Active);
        let Some(season) = state.seasons.get_mut(&id) else {
            return Ok(None);
        };
        if season.status != SeasonStatus::Upcoming {
            return Ok(None);
        }
        if other_active {
            return Err(unique_violation_error("uq_seasons_single_active"));
        }
        season.status = SeasonStatus::Active;
        season.start_date = now;
        season.updated_at = now;
        Ok(Some(season.clone()))
    }

    async fn mark_season_ended(&self, id: DbId, now: Timestamp) -> StoreResult<Option<Season>> {
        let mut state = self.state.lock().await;
        let Some(season) = state.seasons.get_mut(&id) else {
            return Ok(None);
        };
        if season.status != SeasonStatus::Active {
            return Ok(None);
        }
        season.status = SeasonStatus::Ended;
        season.end_date = now;
        season.updated_at = now;
        Ok(Some(season.clone()))
    }

    async fn delete_season(&self, id: DbId) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        let deletable = state
            .seasons
            .get(&id)
            .is_some_and(|s| s.status == SeasonStatus::Upcoming);
        if deletable {
            state.seasons.remove(&id);
        }
        Ok(deletable)
    }

    async fn count_snapshots(&self, season_id: DbId) -> StoreResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .snapshots
            .values()
            .filter(|s| s.season_id == season_id)
            .count() as i64)
    }

    async fn insert_snapshots(&self, rows: &[CreateSnapshot]) -> StoreResult<u64> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        let mut inserted = 0;
        for row in rows {
            let exists = state
                .snapshots
                .values()
                .any(|s| s.season_id == row.season_id && s.user_id == row.user_id);
            if exists {
                continue;
            }
            let id = state.next_id();
            state.snapshots.insert(
                id,
                SeasonSnapshot {
                    id,
                    season_id: row.season_id,
                    season_number: row.season_number,
                    user_id: row.user_id,
                    username: row.username.clone(),
                    final_elo: row.final_elo,
                    tier: row.tier.clone(),
                    rank: row.rank,
                    games_played: row.games_played,
                    wins: row.wins,
                    losses: row.losses,
                    rewards_distributed: false,
                    distributed_at: None,
                    created_at: now,
                },
            );
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn list_snapshots(
        &self,
        season_id: DbId,
        limit: Option<i64>,
    ) -> StoreResult<Vec<SeasonSnapshot>> {
        let state = self.state.lock().await;
        let mut rows: Vec<SeasonSnapshot> = state
            .snapshots
            .values()
            .filter(|s| s.season_id == season_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.rank);
        if let Some(limit) = limit {
            rows.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(rows)
    }

    async fn list_undistributed_snapshots(
        &self,
        season_id: DbId,
        user_ids: Option<&[DbId]>,
    ) -> StoreResult<Vec<SeasonSnapshot>> {
        let state = self.state.lock().await;
        let mut rows: Vec<SeasonSnapshot> = state
            .snapshots
            .values()
            .filter(|s| s.season_id == season_id && !s.rewards_distributed)
            .filter(|s| user_ids.map_or(true, |ids| ids.contains(&s.user_id)))
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.rank);
        Ok(rows)
    }

    async fn list_user_snapshots(&self, user_id: DbId) -> StoreResult<Vec<SeasonSnapshot>> {
        let state = self.state.lock().await;
        let mut rows: Vec<SeasonSnapshot> = state
            .snapshots
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.season_number.cmp(&a.season_number));
        Ok(rows)
    }

    async fn claim_snapshot_reward(&self, snapshot_id: DbId, now: Timestamp) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        match state.snapshots.get_mut(&snapshot_id) {
            Some(snapshot) if !snapshot.rewards_distributed => {
                snapshot.rewards_distributed = true;
                snapshot.distributed_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_snapshot_reward(&self, snapshot_id: DbId) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        match state.snapshots.get_mut(&snapshot_id) {
            Some(snapshot) if snapshot.rewards_distributed => {
                snapshot.rewards_distributed = false;
                snapshot.distributed_at = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

impl PlayerStore for MemoryStore {
    async fn create_player(&self, input: &CreatePlayer) -> StoreResult<Player> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        let user_id = state.next_id();
        let player = Player {
            user_id,
            username: input.username.clone(),
            rating: input.rating.unwrap_or(0),
            wins: input.wins.unwrap_or(0),
            losses: input.losses.unwrap_or(0),
            last_login_at: input.last_login_at,
            created_at: now,
            updated_at: now,
        };
        state.players.insert(user_id, player.clone());
        Ok(player)
    }

    async fn find_player(&self, user_id: DbId) -> StoreResult<Option<Player>> {
        Ok(self.state.lock().await.players.get(&user_id).cloned())
    }

    async fn list_ranked_players(&self) -> StoreResult<Vec<Player>> {
        let state = self.state.lock().await;
        Ok(state
            .players
            .values()
            .filter(|p| p.wins + p.losses > 0)
            .cloned()
            .collect())
    }

    async fn list_players_with_history(&self) -> StoreResult<Vec<Player>> {
        let state = self.state.lock().await;
        Ok(state
            .players
            .values()
            .filter(|p| p.rating != 0)
            .cloned()
            .collect())
    }

    async fn apply_rating_resets(&self, resets: &[RatingReset]) -> StoreResult<u64> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        let mut updated = 0;
        for reset in resets {
            if let Some(player) = state.players.get_mut(&reset.user_id) {
                player.rating = reset.rating;
                player.wins = 0;
                player.losses = 0;
                player.updated_at = now;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

impl SaleStore for MemoryStore {
    async fn create_sale(&self, input: &CreateSale, created_by: Option<DbId>) -> StoreResult<Sale> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        if state.sales.values().any(|s| s.sale_id == input.sale_id) {
            return Err(unique_violation_error("uq_sales_sale_id"));
        }
        let id = state.next_id();
        let sale = Sale {
            id,
            sale_id: input.sale_id.clone(),
            name: input.name.clone(),
            description: input.description.clone(),
            sale_type: input.sale_type,
            discount_percent: input.discount_percent,
            bonus_cards: input.bonus_cards,
            bonus_gems: input.bonus_gems,
            applicable_products: input.applicable_products.clone(),
            starts_at: input.starts_at,
            ends_at: input.ends_at,
            is_active: input.is_active.unwrap_or(true),
            priority: input.priority.unwrap_or(0),
            usage_count: 0,
            conditions: input.conditions.clone().map(Json),
            created_by,
            created_at: now,
            updated_at: now,
        };
        state.sales.insert(id, sale.clone());
        Ok(sale)
    }

    async fn find_sale(&self, sale_id: &str) -> StoreResult<Option<Sale>> {
        let state = self.state.lock().await;
        Ok(state.sales.values().find(|s| s.sale_id == sale_id).cloned())
    }

    async fn list_sales(&self, include_inactive: bool) -> StoreResult<Vec<Sale>> {
        let state = self.state.lock().await;
        let mut sales: Vec<Sale> = state
            .sales
            .values()
            .filter(|s| include_inactive || s.is_active)
            .cloned()
            .collect();
        sales.sort_by(|a, b| b.starts_at.cmp(&a.starts_at).then(b.id.cmp(&a.id)));
        Ok(sales)
    }

    async fn list_current_sales(&self, now: Timestamp) -> StoreResult<Vec<Sale>> {
        let state = self.state.lock().await;
        let mut sales: Vec<Sale> = state
            .sales
            .values()
            .filter(|s| is_currently_active(s.is_active, s.starts_at, s.ends_at, now))
            .cloned()
            .collect();
        sales.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
        Ok(sales)
    }

    async fn update_sale(&self, sale_id: &str, input: &UpdateSale) -> StoreResult<Option<Sale>> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        let Some(sale) = state.sale_mut(sale_id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            sale.name = name.clone();
        }
        if let Some(description) = &input.description {
            sale.description = description.clone();
        }
        if let Some(pct) = input.discount_percent {
            sale.discount_percent = Some(pct);
        }
        if let Some(cards) = input.bonus_cards {
            sale.bonus_cards = Some(cards);
        }
        if let Some(gems) = input.bonus_gems {
            sale.bonus_gems = Some(gems);
        }
        if let Some(products) = &input.applicable_products {
            sale.applicable_products = products.clone();
        }
        if let Some(starts_at) = input.starts_at {
            sale.starts_at = starts_at;
        }
        if let Some(ends_at) = input.ends_at {
            sale.ends_at = ends_at;
        }
        if let Some(is_active) = input.is_active {
            sale.is_active = is_active;
        }
        if let Some(priority) = input.priority {
            sale.priority = priority;
        }
        if let Some(conditions) = &input.conditions {
            sale.conditions = Some(Json(conditions.clone()));
        }
        sale.updated_at = now;
        Ok(Some(sale.clone()))
    }

    async fn set_sale_active(&self, sale_id: &str, is_active: bool) -> StoreResult<Option<Sale>> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        Ok(state.sale_mut(sale_id).map(|sale| {
            sale.is_active = is_active;
            sale.updated_at = now;
            sale.clone()
        }))
    }

    async fn end_sale(&self, sale_id: &str, ends_at: Timestamp) -> StoreResult<Option<Sale>> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        Ok(state.sale_mut(sale_id).map(|sale| {
            sale.ends_at = ends_at;
            sale.is_active = false;
            sale.updated_at = now;
            sale.clone()
        }))
    }

    async fn delete_sale(&self, sale_id: &str) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.sales.len();
        state.sales.retain(|_, s| s.sale_id != sale_id);
        Ok(state.sales.len() < before)
    }

    async fn deactivate_expired_sales(&self, now: Timestamp) -> StoreResult<u64> {
        let mut state = self.state.lock().await;
        let mut deactivated = 0;
        for sale in state.sales.values_mut() {
            if sale.is_active && sale.ends_at <= now {
                sale.is_active = false;
                sale.updated_at = now;
                deactivated += 1;
            }
        }
        Ok(deactivated)
    }

    async fn record_sale_usage(&self, input: &CreateSaleUsage) -> StoreResult<Option<SaleUsage>> {
        let mut state = self.state.lock().await;
        let Some(sale) = state.sale_mut(&input.sale_id) else {
            return Ok(None);
        };
        sale.usage_count += 1;
        let id = state.next_id();
        let usage = SaleUsage {
            id,
            user_id: input.user_id,
            sale_id: input.sale_id.clone(),
            product_id: input.product_id.clone(),
            original_price: input.original_price,
            discounted_price: input.discounted_price,
            discount_amount: input.discount_amount(),
            used_at: input.used_at,
        };
        state.usages.push(usage.clone());
        Ok(Some(usage))
    }

    async fn count_user_sale_usages(&self, sale_id: &str, user_id: DbId) -> StoreResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .usages
            .iter()
            .filter(|u| u.sale_id == sale_id && u.user_id == user_id)
            .count() as i64)
    }

    async fn sale_usage_stats(&self, sale_id: &str) -> StoreResult<SaleUsageStats> {
        let state = self.state.lock().await;
        let usages: Vec<&SaleUsage> = state.usages.iter().filter(|u| u.sale_id == sale_id).collect();
        let unique_users: HashSet<DbId> = usages.iter().map(|u| u.user_id).collect();
        Ok(SaleUsageStats {
            total_uses: usages.len() as i64,
            unique_users: unique_users.len() as i64,
            total_discount: usages.iter().map(|u| u.discount_amount).sum(),
        })
    }
}

// ---------------------------------------------------------------------------
// Ledger and audit
// ---------------------------------------------------------------------------

impl CurrencyLedger for MemoryStore {
    async fn adjust_currency(&self, adjustment: &CurrencyAdjustment) -> StoreResult<bool> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        if state.failing_ledger_users.contains(&adjustment.user_id) {
            return Err(sqlx::Error::Protocol(format!(
                "ledger unavailable for user {}",
                adjustment.user_id
            )));
        }
        if let Some(reference) = &adjustment.reference_id {
            if state
                .transactions
                .iter()
                .any(|t| t.reference_id.as_ref() == Some(reference))
            {
                return Ok(false);
            }
        }

        let id = state.next_id();
        state.transactions.push(CurrencyTransaction {
            id,
            user_id: adjustment.user_id,
            gold_delta: adjustment.gold_delta,
            gems_delta: adjustment.gems_delta,
            transaction_type: adjustment.transaction_type.clone(),
            description: adjustment.description.clone(),
            reference_id: adjustment.reference_id.clone(),
            metadata: adjustment.metadata.clone(),
            created_at: now,
        });
        let wallet = state
            .wallets
            .entry(adjustment.user_id)
            .or_insert_with(|| PlayerWallet {
                user_id: adjustment.user_id,
                gold: 0,
                gems: 0,
            });
        wallet.gold += adjustment.gold_delta;
        wallet.gems += adjustment.gems_delta;
        Ok(true)
    }
}

impl AuditSink for MemoryStore {
    async fn record_audit(&self, entry: &CreateAuditLog) -> StoreResult<()> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        if state.fail_audit_writes {
            return Err(sqlx::Error::Protocol("audit log unavailable".into()));
        }
        let id = state.next_id();
        state.audit_logs.push(AuditLog {
            id,
            user_id: entry.user_id,
            action_type: entry.action_type.clone(),
            log_category: action_to_category(&entry.action_type).to_string(),
            entity_type: entry.entity_type.clone(),
            entity_id: entry.entity_id.clone(),
            details_json: entry.details_json.clone(),
            success: entry.success,
            created_at: now,
        });
        Ok(())
    }
}
