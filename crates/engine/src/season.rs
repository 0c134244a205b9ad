//! Season lifecycle engine.
//!
//! Drives seasons through `upcoming -> active -> ended`, freezes the
//! leaderboard into snapshots when a season ends, resets ratings when the
//! next one starts, and pays end-of-season rewards through the currency
//! ledger at most once per snapshot.
//!
//! "The active season" is always re-read from the store; nothing here caches
//! it between calls.

use std::sync::Arc;

use arena_core::audit::{action_types, entity_types};
use arena_core::currency::{season_reward_reference, TRANSACTION_REWARD};
use arena_core::error::CoreError;
use arena_core::ranking::{rank_standings, PlayerStanding};
use arena_core::roles::{require_role, Actor, Role};
use arena_core::season::{
    has_ranked_history, reset_rating, state_machine, validate_date_range, validate_reset_config,
    RankResetType, SeasonStatus,
};
use arena_core::tiers::{effective_tiers, next_tier, resolve_tier, RewardTier, TierTable};
use arena_core::types::{DbId, Rating};
use arena_db::models::currency::CurrencyAdjustment;
use arena_db::models::player::RatingReset;
use arena_db::models::season::{CreateSeason, Season, UpdateSeason};
use arena_db::models::snapshot::{CreateSnapshot, SeasonSnapshot};
use serde::Serialize;
use serde_json::json;
use validator::Validate;

use crate::audit::record_outcome;
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::{map_unique_violation, EngineResult};
use crate::store::{AuditSink, CurrencyLedger, PlayerStore, SeasonStore};

/// Result of [`SeasonEngine::start`].
#[derive(Debug, Clone, Serialize)]
pub struct SeasonStarted {
    pub season: Season,
    /// The previously active season, force-ended to make room.
    pub auto_ended: Option<AutoEnded>,
    pub players_reset: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AutoEnded {
    pub season: Season,
    pub snapshots_created: u64,
}

/// Result of [`SeasonEngine::end`].
#[derive(Debug, Clone, Serialize)]
pub struct SeasonEnded {
    pub season: Season,
    pub snapshots_created: u64,
    /// Present when distribution was requested.
    pub distribution: Option<DistributionOutcome>,
}

/// Counts from one reward distribution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DistributionOutcome {
    /// Snapshots flagged as paid by this call.
    pub distributed: u64,
    /// Snapshots whose tier no longer exists in the season's reward list.
    pub skipped_missing_tier: u64,
    /// Snapshots another caller claimed between listing and claiming.
    pub already_claimed: u64,
}

/// A player's live rating placed on the active season's ladder.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentStanding {
    pub season_id: DbId,
    pub season_number: i32,
    pub user_id: DbId,
    pub rating: Rating,
    pub wins: i32,
    pub losses: i32,
    pub tier: RewardTier,
    pub next_tier: Option<RewardTier>,
}

pub struct SeasonEngine<S> {
    store: S,
    clock: Arc<dyn Clock>,
    config: Arc<EngineConfig>,
}

impl<S> SeasonEngine<S>
where
    S: SeasonStore + PlayerStore + CurrencyLedger + AuditSink,
{
    pub fn new(store: S, clock: Arc<dyn Clock>, config: Arc<EngineConfig>) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn get(&self, id: DbId) -> EngineResult<Season> {
        self.store
            .find_season(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Season", id).into())
    }

    /// The active season, if any.
    pub async fn current(&self) -> EngineResult<Option<Season>> {
        Ok(self.store.find_active_season().await?)
    }

    /// All seasons, newest number first.
    pub async fn list(&self) -> EngineResult<Vec<Season>> {
        Ok(self.store.list_seasons().await?)
    }

    /// The frozen leaderboard of a season, rank ascending.
    pub async fn leaderboard(
        &self,
        season_id: DbId,
        limit: Option<i64>,
    ) -> EngineResult<Vec<SeasonSnapshot>> {
        self.get(season_id).await?;
        Ok(self.store.list_snapshots(season_id, limit).await?)
    }

    /// Every snapshot of a player, newest season first.
    pub async fn player_history(&self, user_id: DbId) -> EngineResult<Vec<SeasonSnapshot>> {
        Ok(self.store.list_user_snapshots(user_id).await?)
    }

    /// `None` when no season is active.
    pub async fn current_standing(&self, user_id: DbId) -> EngineResult<Option<CurrentStanding>> {
        let Some(season) = self.store.find_active_season().await? else {
            return Ok(None);
        };
        let player = self
            .store
            .find_player(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Player", user_id))?;

        let tiers = effective_tiers(&season.rewards);
        Ok(Some(CurrentStanding {
            season_id: season.id,
            season_number: season.number,
            user_id,
            rating: player.rating,
            wins: player.wins,
            losses: player.losses,
            tier: resolve_tier(player.rating, &tiers),
            next_tier: next_tier(player.rating, &tiers),
        }))
    }

    // -----------------------------------------------------------------------
    // Create / update / delete
    // -----------------------------------------------------------------------

    /// Create an `upcoming` season. Omitted or empty rewards get the default
    /// ladder.
    #[tracing::instrument(skip_all, fields(number = input.number))]
    pub async fn create(&self, actor: &Actor, input: CreateSeason) -> EngineResult<Season> {
        require_role(actor, Role::Admin)?;
        let outcome = self.create_inner(actor, &input).await;
        record_outcome(
            &self.store,
            actor,
            action_types::SEASON_CREATE,
            entity_types::SEASON,
            outcome.as_ref().ok().map(|s| s.id.to_string()),
            &outcome,
            |season| json!({ "number": season.number, "name": season.name }),
        )
        .await;
        outcome
    }

    async fn create_inner(&self, actor: &Actor, input: &CreateSeason) -> EngineResult<Season> {
        input.validate()?;
        validate_date_range(input.start_date, input.end_date)?;
        validate_reset_config(input.rank_reset_type, input.soft_reset_percentage)?;
        let rewards = effective_tiers(input.rewards.as_deref().unwrap_or_default());
        TierTable::new(&rewards)?;

        if self.store.find_season_by_number(input.number).await?.is_some() {
            return Err(duplicate_number(input.number).into());
        }

        let season = self
            .store
            .create_season(input, &rewards, actor.user_id)
            .await
            .map_err(|e| map_unique_violation(e, |_| duplicate_number(input.number)))?;

        tracing::info!(season_id = season.id, number = season.number, "Season created");
        Ok(season)
    }

    /// Patch a season that has not ended. The merged result is validated as
    /// a whole.
    #[tracing::instrument(skip_all, fields(season_id = id))]
    pub async fn update(&self, actor: &Actor, id: DbId, input: UpdateSeason) -> EngineResult<Season> {
        require_role(actor, Role::Admin)?;
        let outcome = self.update_inner(id, input).await;
        record_outcome(
            &self.store,
            actor,
            action_types::SEASON_UPDATE,
            entity_types::SEASON,
            Some(id.to_string()),
            &outcome,
            |season| json!({ "number": season.number }),
        )
        .await;
        outcome
    }

    async fn update_inner(&self, id: DbId, mut input: UpdateSeason) -> EngineResult<Season> {
        input.validate()?;
        let season = self.get(id).await?;
        state_machine::validate_editable(season.status)?;

        validate_date_range(
            input.start_date.unwrap_or(season.start_date),
            input.end_date.unwrap_or(season.end_date),
        )?;
        validate_reset_config(
            input.rank_reset_type.unwrap_or(season.rank_reset_type),
            input.soft_reset_percentage.or(season.soft_reset_percentage),
        )?;
        if let Some(rewards) = input.rewards.take() {
            let rewards = effective_tiers(&rewards);
            TierTable::new(&rewards)?;
            input.rewards = Some(rewards);
        }

        let updated = self.store.update_season(id, &input).await?.ok_or_else(|| {
            CoreError::InvalidTransition("Ended seasons cannot be modified".into())
        })?;
        tracing::info!(season_id = id, "Season updated");
        Ok(updated)
    }

    /// Delete a season that never went live.
    #[tracing::instrument(skip_all, fields(season_id = id))]
    pub async fn delete(&self, actor: &Actor, id: DbId) -> EngineResult<()> {
        require_role(actor, Role::Admin)?;
        let outcome = self.delete_inner(id).await;
        record_outcome(
            &self.store,
            actor,
            action_types::SEASON_DELETE,
            entity_types::SEASON,
            Some(id.to_string()),
            &outcome,
            |number| json!({ "number": number }),
        )
        .await;
        outcome.map(|_| ())
    }

    async fn delete_inner(&self, id: DbId) -> EngineResult<i32> {
        let season = self.get(id).await?;
        state_machine::validate_deletable(season.status)?;
        if !self.store.delete_season(id).await? {
            return Err(CoreError::InvalidTransition(format!(
                "Season {id} is no longer upcoming"
            ))
            .into());
        }
        tracing::info!(season_id = id, number = season.number, "Season deleted");
        Ok(season.number)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start an upcoming season.
    ///
    /// A season that is still active is ended first and its standings
    /// snapshotted, then ratings are reset under the starting season's reset
    /// policy, then the season goes live with `start_date` set to now.
    #[tracing::instrument(skip_all, fields(season_id = id))]
    pub async fn start(&self, actor: &Actor, id: DbId) -> EngineResult<SeasonStarted> {
        require_role(actor, Role::Admin)?;
        let outcome = self.start_inner(actor, id).await;
        record_outcome(
            &self.store,
            actor,
            action_types::SEASON_START,
            entity_types::SEASON,
            Some(id.to_string()),
            &outcome,
            |started| {
                json!({
                    "number": started.season.number,
                    "rank_reset_type": started.season.rank_reset_type,
                    "players_reset": started.players_reset,
                    "auto_ended_season_id": started.auto_ended.as_ref().map(|a| a.season.id),
                })
            },
        )
        .await;
        outcome
    }

    async fn start_inner(&self, actor: &Actor, id: DbId) -> EngineResult<SeasonStarted> {
        let target = self.get(id).await?;
        state_machine::validate_transition(target.status, SeasonStatus::Active)?;

        let auto_ended = match self.store.find_active_season().await? {
            Some(active) => self.auto_end(actor, active).await?,
            None => None,
        };

        let players_reset = self.reset_ratings(&target).await?;

        let now = self.clock.now();
        let season = self
            .store
            .activate_season(id, now)
            .await
            .map_err(|e| {
                map_unique_violation(e, |_| {
                    CoreError::InvalidTransition("Another season became active".into())
                })
            })?
            .ok_or_else(|| {
                CoreError::InvalidTransition(format!("Season {id} is no longer upcoming"))
            })?;

        tracing::info!(
            season_id = season.id,
            number = season.number,
            players_reset,
            "Season started"
        );
        Ok(SeasonStarted {
            season,
            auto_ended,
            players_reset,
        })
    }

    /// Force-end the outgoing season: status first, then snapshots.
    async fn auto_end(&self, actor: &Actor, active: Season) -> EngineResult<Option<AutoEnded>> {
        let outcome = self.auto_end_inner(active.id).await;

        record_outcome(
            &self.store,
            actor,
            action_types::SEASON_AUTO_END,
            entity_types::SEASON,
            Some(active.id.to_string()),
            &outcome,
            |ended| {
                json!({
                    "number": active.number,
                    "snapshots_created": ended.as_ref().map(|e| e.snapshots_created),
                })
            },
        )
        .await;

        if let Ok(Some(ended)) = &outcome {
            tracing::info!(
                season_id = ended.season.id,
                snapshots_created = ended.snapshots_created,
                "Active season auto-ended"
            );
        }
        outcome
    }

    async fn auto_end_inner(&self, id: DbId) -> EngineResult<Option<AutoEnded>> {
        let now = self.clock.now();
        let Some(season) = self.store.mark_season_ended(id, now).await? else {
            return Ok(None);
        };
        let snapshots_created = self.create_snapshots(&season).await?;
        Ok(Some(AutoEnded {
            season,
            snapshots_created,
        }))
    }

    /// End the active season: snapshots first, then status. Optionally pays
    /// rewards straight away.
    #[tracing::instrument(skip_all, fields(season_id = id, distribute_rewards = distribute_rewards))]
    pub async fn end(
        &self,
        actor: &Actor,
        id: DbId,
        distribute_rewards: bool,
    ) -> EngineResult<SeasonEnded> {
        require_role(actor, Role::Admin)?;
        let outcome = self.end_inner(id).await;
        record_outcome(
            &self.store,
            actor,
            action_types::SEASON_END,
            entity_types::SEASON,
            Some(id.to_string()),
            &outcome,
            |season_ended: &(Season, u64)| {
                json!({ "number": season_ended.0.number, "snapshots_created": season_ended.1 })
            },
        )
        .await;
        let (season, snapshots_created) = outcome?;

        let distribution = if distribute_rewards {
            Some(self.distribute_audited(actor, &season, None).await?)
        } else {
            None
        };

        Ok(SeasonEnded {
            season,
            snapshots_created,
            distribution,
        })
    }

    async fn end_inner(&self, id: DbId) -> EngineResult<(Season, u64)> {
        let season = self.get(id).await?;
        state_machine::validate_transition(season.status, SeasonStatus::Ended)?;

        let snapshots_created = self.create_snapshots(&season).await?;

        let now = self.clock.now();
        let ended = self.store.mark_season_ended(id, now).await?.ok_or_else(|| {
            CoreError::InvalidTransition(format!("Season {id} is no longer active"))
        })?;

        tracing::info!(season_id = id, number = ended.number, snapshots_created, "Season ended");
        Ok((ended, snapshots_created))
    }

    /// End the active season if its scheduled end has passed.
    pub async fn end_if_due(
        &self,
        actor: &Actor,
        distribute_rewards: bool,
    ) -> EngineResult<Option<SeasonEnded>> {
        let Some(active) = self.store.find_active_season().await? else {
            return Ok(None);
        };
        if active.end_date > self.clock.now() {
            return Ok(None);
        }
        self.end(actor, active.id, distribute_rewards).await.map(Some)
    }

    /// Start the earliest upcoming season whose start has passed, provided no
    /// season is active.
    pub async fn start_next_if_due(&self, actor: &Actor) -> EngineResult<Option<SeasonStarted>> {
        if self.store.find_active_season().await?.is_some() {
            return Ok(None);
        }
        let due = self.store.list_due_upcoming_seasons(self.clock.now()).await?;
        match due.first() {
            Some(next) => self.start(actor, next.id).await.map(Some),
            None => Ok(None),
        }
    }

    // -----------------------------------------------------------------------
    // Rewards
    // -----------------------------------------------------------------------

    /// Pay out an ended season's unpaid snapshots, optionally only for
    /// `user_ids`. Safe to repeat: paid snapshots are skipped.
    #[tracing::instrument(skip_all, fields(season_id = id))]
    pub async fn distribute_rewards(
        &self,
        actor: &Actor,
        id: DbId,
        user_ids: Option<Vec<DbId>>,
    ) -> EngineResult<DistributionOutcome> {
        require_role(actor, Role::Admin)?;
        let season = match self.get(id).await {
            Ok(season) => season,
            Err(err) => {
                let outcome: EngineResult<DistributionOutcome> = Err(err);
                self.audit_distribution(actor, id, &outcome).await;
                return outcome;
            }
        };
        self.distribute_audited(actor, &season, user_ids.as_deref()).await
    }

    async fn distribute_audited(
        &self,
        actor: &Actor,
        season: &Season,
        user_ids: Option<&[DbId]>,
    ) -> EngineResult<DistributionOutcome> {
        let outcome = self.distribute(season, user_ids).await;
        self.audit_distribution(actor, season.id, &outcome).await;
        outcome
    }

    async fn audit_distribution(
        &self,
        actor: &Actor,
        season_id: DbId,
        outcome: &EngineResult<DistributionOutcome>,
    ) {
        record_outcome(
            &self.store,
            actor,
            action_types::SEASON_REWARDS_DISTRIBUTE,
            entity_types::SEASON,
            Some(season_id.to_string()),
            outcome,
            |result| json!(result),
        )
        .await;
    }

    async fn distribute(
        &self,
        season: &Season,
        user_ids: Option<&[DbId]>,
    ) -> EngineResult<DistributionOutcome> {
        if season.status != SeasonStatus::Ended {
            return Err(CoreError::InvalidTransition(format!(
                "Rewards can only be distributed for ended seasons, season {} is {}",
                season.id, season.status
            ))
            .into());
        }

        let tiers = TierTable::new(&effective_tiers(&season.rewards))?;
        let snapshots = self
            .store
            .list_undistributed_snapshots(season.id, user_ids)
            .await?;

        let mut outcome = DistributionOutcome::default();
        for snapshot in snapshots {
            let Some(tier) = tiers.get(&snapshot.tier) else {
                tracing::warn!(
                    season_id = season.id,
                    user_id = snapshot.user_id,
                    tier = %snapshot.tier,
                    "Snapshot tier missing from reward list, skipping"
                );
                outcome.skipped_missing_tier += 1;
                continue;
            };

            if !self
                .store
                .claim_snapshot_reward(snapshot.id, self.clock.now())
                .await?
            {
                outcome.already_claimed += 1;
                continue;
            }

            if tier.has_currency_reward() {
                let adjustment = reward_adjustment(season, &snapshot, tier);
                match self.store.adjust_currency(&adjustment).await {
                    Ok(applied) => {
                        if !applied {
                            tracing::debug!(
                                user_id = snapshot.user_id,
                                "Reward reference already applied by the ledger"
                            );
                        }
                    }
                    Err(e) => {
                        if let Err(release_err) =
                            self.store.release_snapshot_reward(snapshot.id).await
                        {
                            tracing::error!(
                                error = %release_err,
                                snapshot_id = snapshot.id,
                                "Failed to release reward claim"
                            );
                        }
                        return Err(e.into());
                    }
                }
            }

            tracing::debug!(
                season_id = season.id,
                user_id = snapshot.user_id,
                tier = %tier.tier,
                gold = tier.gold_reward,
                gems = tier.gems_reward,
                "Season reward paid"
            );
            outcome.distributed += 1;
        }

        tracing::info!(
            season_id = season.id,
            distributed = outcome.distributed,
            skipped = outcome.skipped_missing_tier,
            "Season rewards distributed"
        );
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Snapshots and resets
    // -----------------------------------------------------------------------

    /// Freeze ranked standings for `season`. A season that already has
    /// snapshots is left alone and `0` is returned.
    async fn create_snapshots(&self, season: &Season) -> EngineResult<u64> {
        if self.store.count_snapshots(season.id).await? > 0 {
            tracing::info!(season_id = season.id, "Snapshots already exist, skipping");
            return Ok(0);
        }

        let standings: Vec<PlayerStanding> = self
            .store
            .list_ranked_players()
            .await?
            .iter()
            .map(|p| p.standing())
            .collect();

        let rows: Vec<CreateSnapshot> = rank_standings(standings, &season.rewards)
            .into_iter()
            .map(|entry| CreateSnapshot::from_entry(season.id, season.number, entry))
            .collect();

        Ok(self.store.insert_snapshots(&rows).await?)
    }

    async fn reset_ratings(&self, season: &Season) -> EngineResult<u64> {
        if season.rank_reset_type == RankResetType::None {
            return Ok(0);
        }

        let resets: Vec<RatingReset> = self
            .store
            .list_players_with_history()
            .await?
            .into_iter()
            .filter(|p| has_ranked_history(p.rating))
            .map(|p| RatingReset {
                user_id: p.user_id,
                rating: reset_rating(
                    p.rating,
                    season.rank_reset_type,
                    season.soft_reset_percentage,
                    self.config.baseline_rating,
                ),
            })
            .collect();

        Ok(self.store.apply_rating_resets(&resets).await?)
    }
}

fn duplicate_number(number: i32) -> CoreError {
    CoreError::DuplicateKey(format!("Season number {number} already exists"))
}

fn reward_adjustment(
    season: &Season,
    snapshot: &SeasonSnapshot,
    tier: &RewardTier,
) -> CurrencyAdjustment {
    CurrencyAdjustment {
        user_id: snapshot.user_id,
        gold_delta: tier.gold_reward,
        gems_delta: tier.gems_reward,
        transaction_type: TRANSACTION_REWARD.to_string(),
        description: format!("Season {} reward: {}", season.number, tier.tier),
        reference_id: Some(season_reward_reference(season.id, snapshot.user_id)),
        metadata: json!({
            "season_id": season.id,
            "season_number": season.number,
            "tier": tier.tier,
            "rank": snapshot.rank,
            "final_elo": snapshot.final_elo,
            "card_pack_reward": tier.card_pack_reward,
            "exclusive_card_id": tier.exclusive_card_id,
            "title_reward": tier.title_reward,
        }),
    }
}
