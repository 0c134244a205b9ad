//! Season lifecycle state machine, input validation, and rank reset math.
//!
//! States run `upcoming -> active -> ended`; `ended` is terminal and nothing
//! skips a state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Rating, Timestamp};

/// Rating every reset is measured from.
pub const BASELINE_RATING: Rating = 1000;

// ---------------------------------------------------------------------------
// SeasonStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonStatus {
    Upcoming,
    Active,
    Ended,
}

impl SeasonStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SeasonStatus::Upcoming => "upcoming",
            SeasonStatus::Active => "active",
            SeasonStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for SeasonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeasonStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(SeasonStatus::Upcoming),
            "active" => Ok(SeasonStatus::Active),
            "ended" => Ok(SeasonStatus::Ended),
            other => Err(CoreError::Validation(format!("Unknown season status '{other}'"))),
        }
    }
}

impl TryFrom<String> for SeasonStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

pub mod state_machine {
    use super::SeasonStatus;
    use crate::error::CoreError;

    /// Statuses reachable from `from` in one step.
    pub fn valid_transitions(from: SeasonStatus) -> &'static [SeasonStatus] {
        match from {
            SeasonStatus::Upcoming => &[SeasonStatus::Active],
            SeasonStatus::Active => &[SeasonStatus::Ended],
            SeasonStatus::Ended => &[],
        }
    }

    pub fn can_transition(from: SeasonStatus, to: SeasonStatus) -> bool {
        valid_transitions(from).contains(&to)
    }

    pub fn validate_transition(from: SeasonStatus, to: SeasonStatus) -> Result<(), CoreError> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition(format!(
                "Season cannot move from {from} to {to}"
            )))
        }
    }

    /// Only seasons that never went live may be deleted.
    pub fn validate_deletable(status: SeasonStatus) -> Result<(), CoreError> {
        if status == SeasonStatus::Upcoming {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition(format!(
                "Only upcoming seasons can be deleted, season is {status}"
            )))
        }
    }

    /// Ended seasons are frozen apart from reward bookkeeping.
    pub fn validate_editable(status: SeasonStatus) -> Result<(), CoreError> {
        if status == SeasonStatus::Ended {
            Err(CoreError::InvalidTransition("Ended seasons cannot be modified".into()))
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// RankResetType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankResetType {
    Full,
    Soft,
    None,
}

impl RankResetType {
    pub fn as_str(self) -> &'static str {
        match self {
            RankResetType::Full => "full",
            RankResetType::Soft => "soft",
            RankResetType::None => "none",
        }
    }
}

impl fmt::Display for RankResetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankResetType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(RankResetType::Full),
            "soft" => Ok(RankResetType::Soft),
            "none" => Ok(RankResetType::None),
            other => Err(CoreError::InvalidResetConfig(format!(
                "Unknown rank reset type '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for RankResetType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_date_range(start: Timestamp, end: Timestamp) -> Result<(), CoreError> {
    if end > start {
        Ok(())
    } else {
        Err(CoreError::InvalidDateRange(format!(
            "End date {end} must be after start date {start}"
        )))
    }
}

/// A soft reset needs a percentage in `[0, 100]`; other reset types ignore it.
pub fn validate_reset_config(
    reset_type: RankResetType,
    soft_reset_percentage: Option<i32>,
) -> Result<(), CoreError> {
    if reset_type != RankResetType::Soft {
        return Ok(());
    }
    match soft_reset_percentage {
        Some(pct) if (0..=100).contains(&pct) => Ok(()),
        Some(pct) => Err(CoreError::InvalidResetConfig(format!(
            "Soft reset percentage {pct} must be between 0 and 100"
        ))),
        None => Err(CoreError::InvalidResetConfig(
            "Soft reset requires a soft reset percentage".into(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Rank reset
// ---------------------------------------------------------------------------

/// Players whose rating is non-zero have ranked history and are reset.
pub fn has_ranked_history(rating: Rating) -> bool {
    rating != 0
}

/// Rating after a season-start reset.
///
/// - `none`: unchanged.
/// - `full`: `baseline`.
/// - `soft`: `baseline + round((rating - baseline) * pct / 100)`, with halves
///   rounded toward positive infinity.
pub fn reset_rating(
    rating: Rating,
    reset_type: RankResetType,
    soft_reset_percentage: Option<i32>,
    baseline: Rating,
) -> Rating {
    match reset_type {
        RankResetType::None => rating,
        RankResetType::Full => baseline,
        RankResetType::Soft => {
            let pct = f64::from(soft_reset_percentage.unwrap_or(0).clamp(0, 100));
            let gap = i64::from(rating) - i64::from(baseline);
            let kept = (gap as f64 * pct / 100.0 + 0.5).floor() as i64;
            let reset = i64::from(baseline) + kept;
            reset.clamp(i64::from(Rating::MIN), i64::from(Rating::MAX)) as Rating
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::state_machine::*;
    use super::*;

    // -----------------------------------------------------------------------
    // State machine
    // -----------------------------------------------------------------------

    #[test]
    fn upcoming_to_active() {
        assert!(can_transition(SeasonStatus::Upcoming, SeasonStatus::Active));
    }

    #[test]
    fn active_to_ended() {
        assert!(can_transition(SeasonStatus::Active, SeasonStatus::Ended));
    }

    #[test]
    fn upcoming_cannot_skip_to_ended() {
        assert!(!can_transition(SeasonStatus::Upcoming, SeasonStatus::Ended));
    }

    #[test]
    fn ended_is_terminal() {
        assert!(valid_transitions(SeasonStatus::Ended).is_empty());
        let err = validate_transition(SeasonStatus::Ended, SeasonStatus::Active).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition(_)));
        assert!(err.to_string().contains("from ended to active"));
    }

    #[test]
    fn only_upcoming_is_deletable() {
        assert!(validate_deletable(SeasonStatus::Upcoming).is_ok());
        assert!(validate_deletable(SeasonStatus::Active).is_err());
        assert!(validate_deletable(SeasonStatus::Ended).is_err());
    }

    #[test]
    fn ended_is_not_editable() {
        assert!(validate_editable(SeasonStatus::Active).is_ok());
        assert!(validate_editable(SeasonStatus::Ended).is_err());
    }

    #[test]
    fn status_parses_from_column_text() {
        assert_eq!(SeasonStatus::try_from("active".to_string()).unwrap(), SeasonStatus::Active);
        assert!(SeasonStatus::try_from("paused".to_string()).is_err());
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn end_must_follow_start() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert!(validate_date_range(start, start + Duration::days(30)).is_ok());
        assert!(matches!(
            validate_date_range(start, start),
            Err(CoreError::InvalidDateRange(_))
        ));
    }

    #[test]
    fn soft_reset_requires_percentage() {
        assert!(matches!(
            validate_reset_config(RankResetType::Soft, None),
            Err(CoreError::InvalidResetConfig(_))
        ));
        assert!(validate_reset_config(RankResetType::Soft, Some(101)).is_err());
        assert!(validate_reset_config(RankResetType::Soft, Some(-1)).is_err());
        assert!(validate_reset_config(RankResetType::Soft, Some(0)).is_ok());
        assert!(validate_reset_config(RankResetType::Soft, Some(100)).is_ok());
    }

    #[test]
    fn other_reset_types_ignore_percentage() {
        assert!(validate_reset_config(RankResetType::Full, None).is_ok());
        assert!(validate_reset_config(RankResetType::None, Some(500)).is_ok());
    }

    // -----------------------------------------------------------------------
    // reset_rating
    // -----------------------------------------------------------------------

    #[test]
    fn full_reset_returns_baseline() {
        assert_eq!(reset_rating(1734, RankResetType::Full, None, BASELINE_RATING), 1000);
    }

    #[test]
    fn no_reset_keeps_rating() {
        assert_eq!(reset_rating(1734, RankResetType::None, None, BASELINE_RATING), 1734);
    }

    #[test]
    fn soft_reset_halves_deviation() {
        assert_eq!(reset_rating(1400, RankResetType::Soft, Some(50), BASELINE_RATING), 1200);
    }

    #[test]
    fn soft_reset_below_baseline_moves_up() {
        assert_eq!(reset_rating(800, RankResetType::Soft, Some(50), BASELINE_RATING), 900);
    }

    #[test]
    fn soft_reset_rounds_halves_up() {
        // 1001 at 50% keeps 0.5 -> 1; 999 at 50% keeps -0.5 -> 0.
        assert_eq!(reset_rating(1001, RankResetType::Soft, Some(50), BASELINE_RATING), 1001);
        assert_eq!(reset_rating(999, RankResetType::Soft, Some(50), BASELINE_RATING), 1000);
    }

    #[test]
    fn soft_reset_extremes() {
        assert_eq!(reset_rating(1600, RankResetType::Soft, Some(0), BASELINE_RATING), 1000);
        assert_eq!(reset_rating(1600, RankResetType::Soft, Some(100), BASELINE_RATING), 1600);
    }

    #[test]
    fn soft_reset_with_extreme_gap() {
        assert_eq!(reset_rating(i32::MAX, RankResetType::Soft, Some(100), -1000), i32::MAX);
        assert_eq!(reset_rating(i32::MIN, RankResetType::Soft, Some(0), 1000), 1000);
        assert_eq!(reset_rating(i32::MAX, RankResetType::Soft, Some(50), i32::MIN), 0);
    }

    #[test]
    fn zero_rating_has_no_history() {
        assert!(!has_ranked_history(0));
        assert!(has_ranked_history(1000));
    }
}
