//! Scheduler ticks against the in-memory store.
//!
//! Exercises:
//! - idle ticks
//! - ending an overdue season and starting the next one in the same tick
//! - expiring sales
//! - run loop shutdown on cancellation

use std::sync::Arc;
use std::time::Duration as StdDuration;

use arena_core::roles::{Actor, Role};
use arena_core::sales::SaleType;
use arena_core::season::{RankResetType, SeasonStatus};
use arena_db::models::player::CreatePlayer;
use arena_db::models::sale::CreateSale;
use arena_db::models::season::CreateSeason;
use arena_engine::store::PlayerStore;
use arena_engine::{EngineConfig, ManualClock, MemoryStore, SalesEngine, SeasonEngine};
use arena_worker::{Scheduler, TickReport};
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap()
}

fn admin() -> Actor {
    Actor::new(1_000, Role::Admin)
}

struct Fixture {
    clock: Arc<ManualClock>,
    store: MemoryStore,
    scheduler: Scheduler<MemoryStore>,
}

fn fixture(auto_distribute_rewards: bool) -> Fixture {
    let clock = Arc::new(ManualClock::new(t0()));
    let config = Arc::new(EngineConfig::default());
    let store = MemoryStore::new(clock.clone());
    let scheduler = Scheduler::new(
        SeasonEngine::new(store.clone(), clock.clone(), config.clone()),
        SalesEngine::new(store.clone(), clock.clone(), config),
        StdDuration::from_secs(60),
        auto_distribute_rewards,
    );
    Fixture {
        clock,
        store,
        scheduler,
    }
}

fn season(number: i32, start_in_days: i64, length_days: i64) -> CreateSeason {
    CreateSeason {
        number,
        name: format!("Season {number}"),
        description: None,
        start_date: t0() + Duration::days(start_in_days),
        end_date: t0() + Duration::days(start_in_days + length_days),
        rank_reset_type: RankResetType::Full,
        soft_reset_percentage: None,
        rewards: None,
    }
}

fn sale(sale_id: &str, hours: i64) -> CreateSale {
    CreateSale {
        sale_id: sale_id.to_string(),
        name: sale_id.to_string(),
        description: String::new(),
        sale_type: SaleType::Holiday,
        discount_percent: Some(10),
        bonus_cards: None,
        bonus_gems: None,
        applicable_products: Vec::new(),
        starts_at: t0(),
        ends_at: t0() + Duration::hours(hours),
        is_active: None,
        priority: None,
        conditions: None,
    }
}

fn seasons(f: &Fixture) -> SeasonEngine<MemoryStore> {
    SeasonEngine::new(
        f.store.clone(),
        f.clock.clone(),
        Arc::new(EngineConfig::default()),
    )
}

// ---------------------------------------------------------------------------
// Ticks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn idle_tick_does_nothing() {
    let f = fixture(true);
    assert_eq!(f.scheduler.tick().await, TickReport::default());
}

#[tokio::test]
async fn tick_rolls_over_to_next_due_season() {
    let f = fixture(true);
    let engine = seasons(&f);

    let first = engine.create(&admin(), season(1, 0, 7)).await.unwrap();
    engine.start(&admin(), first.id).await.unwrap();
    let second = engine.create(&admin(), season(2, 7, 28)).await.unwrap();

    let player = f
        .store
        .create_player(&CreatePlayer {
            username: "grinder".into(),
            rating: Some(1550),
            wins: Some(12),
            losses: Some(4),
            last_login_at: None,
        })
        .await
        .unwrap();

    f.clock.advance(Duration::days(1));
    assert_eq!(f.scheduler.tick().await, TickReport::default());

    f.clock.advance(Duration::days(7));
    let report = f.scheduler.tick().await;
    assert_eq!(report.season_ended, Some(first.id));
    assert_eq!(report.rewards_distributed, 1);
    assert_eq!(report.season_started, Some(second.id));
    assert_eq!(report.failed_steps, 0);

    assert_eq!(engine.get(first.id).await.unwrap().status, SeasonStatus::Ended);
    assert_eq!(engine.current().await.unwrap().unwrap().id, second.id);

    // Platinum payout, then a full reset for the new season.
    assert_eq!(f.store.wallet(player.user_id).await.gold, 1000);
    assert_eq!(f.store.player(player.user_id).await.unwrap().rating, 1000);

    let audit = f.store.audit_entries().await;
    assert!(audit.iter().rev().take(3).all(|e| e.user_id.is_none()));
}

#[tokio::test]
async fn tick_without_auto_distribution_leaves_rewards_unpaid() {
    let f = fixture(false);
    let engine = seasons(&f);
    let only = engine.create(&admin(), season(1, 0, 7)).await.unwrap();
    engine.start(&admin(), only.id).await.unwrap();
    f.store
        .create_player(&CreatePlayer {
            username: "casual".into(),
            rating: Some(1150),
            wins: Some(1),
            losses: Some(1),
            last_login_at: None,
        })
        .await
        .unwrap();

    f.clock.advance(Duration::days(8));
    let report = f.scheduler.tick().await;
    assert_eq!(report.season_ended, Some(only.id));
    assert_eq!(report.rewards_distributed, 0);
    assert!(report.season_started.is_none());

    let board = engine.leaderboard(only.id, None).await.unwrap();
    assert_eq!(board.len(), 1);
    assert!(!board[0].rewards_distributed);
}

#[tokio::test]
async fn tick_expires_closed_sales() {
    let f = fixture(true);
    let sales = SalesEngine::new(
        f.store.clone(),
        f.clock.clone(),
        Arc::new(EngineConfig::default()),
    );
    sales.create(&admin(), sale("weekend", 48)).await.unwrap();
    sales.create(&admin(), sale("month", 24 * 30)).await.unwrap();

    f.clock.advance(Duration::hours(48));
    let report = f.scheduler.tick().await;
    assert_eq!(report.sales_deactivated, 1);
    assert!(!sales.get("weekend").await.unwrap().is_active);
    assert!(sales.get("month").await.unwrap().is_active);
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_stops_when_cancelled() {
    let f = fixture(true);
    let cancel = CancellationToken::new();
    cancel.cancel();

    tokio::time::timeout(StdDuration::from_secs(5), f.scheduler.run(cancel))
        .await
        .expect("scheduler should stop after cancellation");
}
