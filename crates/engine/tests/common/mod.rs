//! Shared fixtures for engine integration tests.
//!
//! Everything runs against the in-memory store and a manual clock pinned to
//! [`t0`].

#![allow(dead_code)]

use std::sync::Arc;

use arena_core::roles::{Actor, Role};
use arena_core::sales::{SaleConditions, SaleType};
use arena_core::season::RankResetType;
use arena_core::tiers::RewardTier;
use arena_core::types::{DbId, Rating, Timestamp};
use arena_db::models::player::{CreatePlayer, Player};
use arena_db::models::sale::CreateSale;
use arena_db::models::season::CreateSeason;
use arena_engine::store::PlayerStore;
use arena_engine::{EngineConfig, ManualClock, MemoryStore, SalesEngine, SeasonEngine};
use chrono::{Duration, TimeZone, Utc};

pub const ADMIN_ID: DbId = 900_001;

pub fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap()
}

pub fn admin() -> Actor {
    Actor::new(ADMIN_ID, Role::Admin)
}

pub fn moderator() -> Actor {
    Actor::new(900_002, Role::Moderator)
}

pub fn superadmin() -> Actor {
    Actor::new(900_003, Role::Superadmin)
}

/// Engines sharing one store and clock.
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub store: MemoryStore,
    pub seasons: SeasonEngine<MemoryStore>,
    pub sales: SalesEngine<MemoryStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let clock = Arc::new(ManualClock::new(t0()));
        let config = Arc::new(config);
        let store = MemoryStore::new(clock.clone());
        Self {
            seasons: SeasonEngine::new(store.clone(), clock.clone(), config.clone()),
            sales: SalesEngine::new(store.clone(), clock.clone(), config),
            store,
            clock,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub async fn player(&self, name: &str, rating: Rating, wins: i32, losses: i32) -> Player {
        self.store
            .create_player(&CreatePlayer {
                username: name.to_string(),
                rating: Some(rating),
                wins: Some(wins),
                losses: Some(losses),
                last_login_at: None,
            })
            .await
            .unwrap()
    }

    pub async fn player_with_login(&self, name: &str, last_login_at: Timestamp) -> Player {
        self.store
            .create_player(&CreatePlayer {
                username: name.to_string(),
                rating: None,
                wins: None,
                losses: None,
                last_login_at: Some(last_login_at),
            })
            .await
            .unwrap()
    }
}

// ---------------------------------------------------------------------------
// Season fixtures
// ---------------------------------------------------------------------------

pub fn new_season(number: i32, reset: RankResetType) -> CreateSeason {
    CreateSeason {
        number,
        name: format!("Season {number}"),
        description: None,
        start_date: t0(),
        end_date: t0() + Duration::days(30),
        rank_reset_type: reset,
        soft_reset_percentage: (reset == RankResetType::Soft).then_some(50),
        rewards: None,
    }
}

pub fn new_season_with_rewards(number: i32, rewards: Vec<RewardTier>) -> CreateSeason {
    CreateSeason {
        rewards: Some(rewards),
        ..new_season(number, RankResetType::Full)
    }
}

// ---------------------------------------------------------------------------
// Sale fixtures
// ---------------------------------------------------------------------------

pub fn new_sale(sale_id: &str, priority: i32, discount: i32) -> CreateSale {
    CreateSale {
        sale_id: sale_id.to_string(),
        name: format!("Sale {sale_id}"),
        description: String::new(),
        sale_type: SaleType::Weekend,
        discount_percent: Some(discount),
        bonus_cards: None,
        bonus_gems: None,
        applicable_products: Vec::new(),
        starts_at: t0() - Duration::hours(1),
        ends_at: t0() + Duration::days(2),
        is_active: None,
        priority: Some(priority),
        conditions: None,
    }
}

pub fn with_conditions(sale: CreateSale, conditions: SaleConditions) -> CreateSale {
    CreateSale {
        conditions: Some(conditions),
        ..sale
    }
}

pub fn for_products(sale: CreateSale, products: &[&str]) -> CreateSale {
    CreateSale {
        applicable_products: products.iter().map(|p| p.to_string()).collect(),
        ..sale
    }
}
