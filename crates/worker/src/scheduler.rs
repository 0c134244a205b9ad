//! Periodic season and sale housekeeping.
//!
//! Each tick ends the active season once its end date has passed, starts the
//! earliest due upcoming season when none is active, and switches off sales
//! whose window has closed. A failing step is logged and the remaining steps
//! still run.

use std::time::Duration;

use arena_core::roles::Actor;
use arena_core::types::DbId;
use arena_engine::store::{AuditSink, CurrencyLedger, PlayerStore, SaleStore, SeasonStore};
use arena_engine::{SalesEngine, SeasonEngine};
use tokio_util::sync::CancellationToken;

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub season_ended: Option<DbId>,
    pub rewards_distributed: u64,
    pub season_started: Option<DbId>,
    pub sales_deactivated: u64,
    /// Steps that returned an error.
    pub failed_steps: u32,
}

pub struct Scheduler<S> {
    seasons: SeasonEngine<S>,
    sales: SalesEngine<S>,
    interval: Duration,
    auto_distribute_rewards: bool,
}

impl<S> Scheduler<S>
where
    S: SeasonStore + PlayerStore + CurrencyLedger + AuditSink + SaleStore,
{
    pub fn new(
        seasons: SeasonEngine<S>,
        sales: SalesEngine<S>,
        interval: Duration,
        auto_distribute_rewards: bool,
    ) -> Self {
        Self {
            seasons,
            sales,
            interval,
            auto_distribute_rewards,
        }
    }

    /// Run one pass as the system actor.
    pub async fn tick(&self) -> TickReport {
        let actor = Actor::system();
        let mut report = TickReport::default();

        match self
            .seasons
            .end_if_due(&actor, self.auto_distribute_rewards)
            .await
        {
            Ok(Some(ended)) => {
                report.season_ended = Some(ended.season.id);
                report.rewards_distributed = ended.distribution.map_or(0, |d| d.distributed);
                tracing::info!(
                    season_id = ended.season.id,
                    snapshots_created = ended.snapshots_created,
                    rewards_distributed = report.rewards_distributed,
                    "Scheduler: season ended"
                );
            }
            Ok(None) => tracing::debug!("Scheduler: no season due to end"),
            Err(e) => {
                report.failed_steps += 1;
                tracing::error!(error = %e, "Scheduler: ending due season failed");
            }
        }

        match self.seasons.start_next_if_due(&actor).await {
            Ok(Some(started)) => {
                report.season_started = Some(started.season.id);
                tracing::info!(
                    season_id = started.season.id,
                    number = started.season.number,
                    players_reset = started.players_reset,
                    "Scheduler: season started"
                );
            }
            Ok(None) => tracing::debug!("Scheduler: no season due to start"),
            Err(e) => {
                report.failed_steps += 1;
                tracing::error!(error = %e, "Scheduler: starting due season failed");
            }
        }

        match self.sales.deactivate_expired().await {
            Ok(deactivated) => report.sales_deactivated = deactivated,
            Err(e) => {
                report.failed_steps += 1;
                tracing::error!(error = %e, "Scheduler: expiring sales failed");
            }
        }

        report
    }

    /// Tick every `interval` until `cancel` fires. The first tick runs
    /// immediately.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            auto_distribute_rewards = self.auto_distribute_rewards,
            "Scheduler started"
        );

        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Scheduler stopping");
                    break;
                }
                _ = interval.tick() => {
                    let report = self.tick().await;
                    if report.failed_steps > 0 {
                        tracing::warn!(failed_steps = report.failed_steps, "Scheduler tick finished with errors");
                    }
                }
            }
        }
    }
}
