//! Integration tests for the season, snapshot and player repositories.
//!
//! Exercises the SQL the season engine relies on against a real database:
//! - Single active season enforced by the partial unique index
//! - Status-guarded lifecycle transitions and duplicate season numbers
//! - UNNEST snapshot batch insert with `ON CONFLICT DO NOTHING`
//! - Undistributed listing with and without a user filter
//! - Compare-and-set reward claim / release
//! - Batch rating reset

use arena_core::season::{RankResetType, SeasonStatus};
use arena_core::tiers::default_reward_tiers;
use arena_core::types::DbId;
use arena_db::models::player::{CreatePlayer, RatingReset};
use arena_db::models::season::{CreateSeason, Season};
use arena_db::models::snapshot::CreateSnapshot;
use arena_db::repositories::{PlayerRepo, SeasonRepo, SnapshotRepo};
use chrono::{Duration, TimeZone, Utc};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_season(number: i32) -> CreateSeason {
    let start = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();
    CreateSeason {
        number,
        name: format!("Season {number}"),
        description: None,
        start_date: start,
        end_date: start + Duration::days(30),
        rank_reset_type: RankResetType::Full,
        soft_reset_percentage: None,
        rewards: None,
    }
}

async fn create_season(pool: &PgPool, number: i32) -> Season {
    SeasonRepo::create(pool, &new_season(number), &default_reward_tiers(), None)
        .await
        .unwrap()
}

fn snapshot(season: &Season, user_id: DbId, rank: i32, final_elo: i32) -> CreateSnapshot {
    CreateSnapshot {
        season_id: season.id,
        season_number: season.number,
        user_id,
        username: format!("player_{user_id}"),
        final_elo,
        tier: "Gold".to_string(),
        rank,
        games_played: 10,
        wins: 6,
        losses: 4,
    }
}

fn assert_unique_violation(err: sqlx::Error, constraint: &str) {
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
            assert_eq!(db_err.constraint(), Some(constraint));
        }
        other => panic!("expected unique violation on {constraint}, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_season_starts_upcoming(pool: PgPool) {
    let season = create_season(&pool, 1).await;
    assert_eq!(season.status, SeasonStatus::Upcoming);
    assert_eq!(season.rank_reset_type, RankResetType::Full);
    assert_eq!(season.rewards.0, default_reward_tiers());

    let found = SeasonRepo::find_by_number(&pool, 1).await.unwrap().unwrap();
    assert_eq!(found.id, season.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_season_number_rejected(pool: PgPool) {
    create_season(&pool, 1).await;
    let err = SeasonRepo::create(&pool, &new_season(1), &default_reward_tiers(), None)
        .await
        .unwrap_err();
    assert_unique_violation(err, "uq_seasons_number");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_second_active_season_rejected(pool: PgPool) {
    let first = create_season(&pool, 1).await;
    let second = create_season(&pool, 2).await;
    let now = Utc::now();

    SeasonRepo::activate(&pool, first.id, now).await.unwrap().unwrap();
    let err = SeasonRepo::activate(&pool, second.id, now).await.unwrap_err();
    assert_unique_violation(err, "uq_seasons_single_active");

    let active = SeasonRepo::find_active(&pool).await.unwrap().unwrap();
    assert_eq!(active.id, first.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_transitions_are_status_guarded(pool: PgPool) {
    let season = create_season(&pool, 1).await;
    let now = Utc::now();

    // Cannot end an upcoming season.
    assert!(SeasonRepo::mark_ended(&pool, season.id, now).await.unwrap().is_none());

    let active = SeasonRepo::activate(&pool, season.id, now).await.unwrap().unwrap();
    assert_eq!(active.status, SeasonStatus::Active);
    assert!(SeasonRepo::activate(&pool, season.id, now).await.unwrap().is_none());

    let ended = SeasonRepo::mark_ended(&pool, season.id, now).await.unwrap().unwrap();
    assert_eq!(ended.status, SeasonStatus::Ended);

    // Ended seasons cannot be deleted.
    assert!(!SeasonRepo::delete(&pool, season.id).await.unwrap());
    assert!(SeasonRepo::find_active(&pool).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_snapshot_batch_ignores_existing_rows(pool: PgPool) {
    let season = create_season(&pool, 1).await;

    let inserted = SnapshotRepo::create_batch(
        &pool,
        &[snapshot(&season, 10, 1, 1800), snapshot(&season, 11, 2, 1500)],
    )
    .await
    .unwrap();
    assert_eq!(inserted, 2);

    // Same (season_id, user_id) pairs plus one new row.
    let inserted = SnapshotRepo::create_batch(
        &pool,
        &[
            snapshot(&season, 10, 5, 100),
            snapshot(&season, 11, 6, 100),
            snapshot(&season, 12, 3, 1200),
        ],
    )
    .await
    .unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(SnapshotRepo::count_for_season(&pool, season.id).await.unwrap(), 3);

    let board = SnapshotRepo::list_for_season(&pool, season.id, None).await.unwrap();
    let users: Vec<DbId> = board.iter().map(|s| s.user_id).collect();
    assert_eq!(users, vec![10, 11, 12]);
    assert_eq!(board[0].final_elo, 1800);

    let top = SnapshotRepo::list_for_season(&pool, season.id, Some(2)).await.unwrap();
    assert_eq!(top.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_empty_snapshot_batch_is_noop(pool: PgPool) {
    assert_eq!(SnapshotRepo::create_batch(&pool, &[]).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_undistributed_user_filter(pool: PgPool) {
    let season = create_season(&pool, 1).await;
    SnapshotRepo::create_batch(
        &pool,
        &[
            snapshot(&season, 10, 1, 1800),
            snapshot(&season, 11, 2, 1500),
            snapshot(&season, 12, 3, 1200),
        ],
    )
    .await
    .unwrap();

    let all = SnapshotRepo::list_undistributed(&pool, season.id, None).await.unwrap();
    assert_eq!(all.len(), 3);

    let filtered = SnapshotRepo::list_undistributed(&pool, season.id, Some(&[12, 10][..]))
        .await
        .unwrap();
    let users: Vec<DbId> = filtered.iter().map(|s| s.user_id).collect();
    assert_eq!(users, vec![10, 12]);

    let none = SnapshotRepo::list_undistributed(&pool, season.id, Some(&[][..]))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_claim_and_release_reward(pool: PgPool) {
    let season = create_season(&pool, 1).await;
    SnapshotRepo::create_batch(&pool, &[snapshot(&season, 10, 1, 1800)])
        .await
        .unwrap();
    let row = SnapshotRepo::list_for_season(&pool, season.id, None)
        .await
        .unwrap()
        .remove(0);
    let now = Utc::now();

    assert!(SnapshotRepo::claim_reward(&pool, row.id, now).await.unwrap());
    assert!(!SnapshotRepo::claim_reward(&pool, row.id, now).await.unwrap());
    assert!(SnapshotRepo::list_undistributed(&pool, season.id, None)
        .await
        .unwrap()
        .is_empty());

    assert!(SnapshotRepo::release_reward(&pool, row.id).await.unwrap());
    assert!(!SnapshotRepo::release_reward(&pool, row.id).await.unwrap());

    let released = SnapshotRepo::list_undistributed(&pool, season.id, None)
        .await
        .unwrap();
    assert_eq!(released.len(), 1);
    assert!(!released[0].rewards_distributed);
    assert!(released[0].distributed_at.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_player_history_newest_first(pool: PgPool) {
    let first = create_season(&pool, 1).await;
    let second = create_season(&pool, 2).await;
    SnapshotRepo::create_batch(&pool, &[snapshot(&first, 10, 1, 1800)])
        .await
        .unwrap();
    SnapshotRepo::create_batch(&pool, &[snapshot(&second, 10, 4, 1300)])
        .await
        .unwrap();

    let history = SnapshotRepo::list_for_user(&pool, 10).await.unwrap();
    let numbers: Vec<i32> = history.iter().map(|s| s.season_number).collect();
    assert_eq!(numbers, vec![2, 1]);
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_apply_ratings_resets_records(pool: PgPool) {
    let mut ids = Vec::new();
    for (name, rating, wins, losses) in [("ann", 1400, 8, 2), ("bo", 900, 1, 5), ("cy", 0, 0, 0)] {
        let player = PlayerRepo::create(
            &pool,
            &CreatePlayer {
                username: name.to_string(),
                rating: Some(rating),
                wins: Some(wins),
                losses: Some(losses),
                last_login_at: None,
            },
        )
        .await
        .unwrap();
        ids.push(player.user_id);
    }

    let ranked = PlayerRepo::list_ranked(&pool).await.unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].user_id, ids[0]);

    let with_history = PlayerRepo::list_with_history(&pool).await.unwrap();
    assert_eq!(with_history.len(), 2);

    let resets = [
        RatingReset {
            user_id: ids[0],
            rating: 1200,
        },
        RatingReset {
            user_id: ids[1],
            rating: 950,
        },
    ];
    assert_eq!(PlayerRepo::apply_ratings(&pool, &resets).await.unwrap(), 2);

    let ann = PlayerRepo::find_by_id(&pool, ids[0]).await.unwrap().unwrap();
    assert_eq!((ann.rating, ann.wins, ann.losses), (1200, 0, 0));
    let bo = PlayerRepo::find_by_id(&pool, ids[1]).await.unwrap().unwrap();
    assert_eq!(bo.rating, 950);
    assert!(PlayerRepo::list_ranked(&pool).await.unwrap().is_empty());
}
