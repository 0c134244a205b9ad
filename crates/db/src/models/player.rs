//! Player competitive record.

use arena_core::eligibility::PlayerActivity;
use arena_core::ranking::PlayerStanding;
use arena_core::types::{DbId, Rating, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `players` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Player {
    pub user_id: DbId,
    pub username: String,
    /// Zero until the first ranked game.
    pub rating: Rating,
    pub wins: i32,
    pub losses: i32,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Player {
    pub fn standing(&self) -> PlayerStanding {
        PlayerStanding {
            user_id: self.user_id,
            username: self.username.clone(),
            rating: self.rating,
            wins: self.wins,
            losses: self.losses,
        }
    }

    pub fn activity(&self) -> PlayerActivity {
        PlayerActivity {
            created_at: self.created_at,
            last_login_at: self.last_login_at,
        }
    }
}

/// DTO for registering a player record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlayer {
    pub username: String,
    pub rating: Option<Rating>,
    pub wins: Option<i32>,
    pub losses: Option<i32>,
    pub last_login_at: Option<Timestamp>,
}

/// New rating for one player at season start. Wins and losses are zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingReset {
    pub user_id: DbId,
    pub rating: Rating,
}
