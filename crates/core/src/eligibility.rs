//! Per-user sale eligibility.
//!
//! Checks run in a fixed order and stop at the first failure:
//! global cap, per-user cap, returning-player gate, new-player gate.
//! Facts that need a store lookup (the user's redemption count, account
//! activity) are gathered by the caller only when the conditions ask for them.

use chrono::TimeDelta;
use serde::Serialize;

use crate::sales::SaleConditions;
use crate::types::Timestamp;

pub const REASON_TOTAL_CAP: &str = "Sale usage limit reached";
pub const REASON_USER_CAP: &str = "You have already used this sale the maximum number of times";
pub const REASON_RETURNING_ONLY: &str = "This sale is only for returning players";
pub const REASON_NEW_ONLY: &str = "This sale is only for new players";

/// Upper bound for either audience window, ten years.
pub const MAX_AUDIENCE_DAYS: i64 = 3650;

/// Result of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    pub can_use: bool,
    pub reason: Option<String>,
}

impl Eligibility {
    pub fn eligible() -> Self {
        Self {
            can_use: true,
            reason: None,
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            can_use: false,
            reason: Some(reason.into()),
        }
    }
}

/// Account timestamps used by the audience gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerActivity {
    pub created_at: Timestamp,
    pub last_login_at: Option<Timestamp>,
}

/// Day thresholds for the audience gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudiencePolicy {
    pub returning_player_days: i64,
    pub new_player_days: i64,
}

/// Store-derived facts. `None` means "not looked up".
#[derive(Debug, Clone, Default)]
pub struct EligibilityFacts {
    pub user_uses: Option<i64>,
    pub activity: Option<PlayerActivity>,
}

pub fn needs_user_uses(conditions: &SaleConditions) -> bool {
    conditions.max_uses_per_user.is_some()
}

pub fn needs_activity(conditions: &SaleConditions) -> bool {
    conditions.returning_player_only || conditions.new_player_only
}

/// A window too long to represent is treated as unbounded.
fn window(days: i64) -> TimeDelta {
    TimeDelta::try_days(days).unwrap_or(TimeDelta::MAX)
}

/// Returning = last activity (last login, else account creation) is at least
/// `days` in the past.
pub fn is_returning_player(activity: &PlayerActivity, now: Timestamp, days: i64) -> bool {
    let last_seen = activity.last_login_at.unwrap_or(activity.created_at);
    now - last_seen >= window(days)
}

/// New = account is no older than `days`.
pub fn is_new_player(activity: &PlayerActivity, now: Timestamp, days: i64) -> bool {
    now - activity.created_at <= window(days)
}

/// Evaluate `conditions` for one user.
///
/// A user with no activity record fails both audience gates.
pub fn evaluate(
    conditions: Option<&SaleConditions>,
    usage_count: i64,
    facts: &EligibilityFacts,
    now: Timestamp,
    policy: &AudiencePolicy,
) -> Eligibility {
    let Some(conditions) = conditions else {
        return Eligibility::eligible();
    };

    if conditions.max_uses_total.is_some_and(|max| usage_count >= max) {
        return Eligibility::denied(REASON_TOTAL_CAP);
    }

    if let Some(max) = conditions.max_uses_per_user {
        if facts.user_uses.unwrap_or(0) >= max {
            return Eligibility::denied(REASON_USER_CAP);
        }
    }

    if conditions.returning_player_only {
        let returning = facts
            .activity
            .is_some_and(|a| is_returning_player(&a, now, policy.returning_player_days));
        if !returning {
            return Eligibility::denied(REASON_RETURNING_ONLY);
        }
    }

    if conditions.new_player_only {
        let new = facts
            .activity
            .is_some_and(|a| is_new_player(&a, now, policy.new_player_days));
        if !new {
            return Eligibility::denied(REASON_NEW_ONLY);
        }
    }

    Eligibility::eligible()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    const POLICY: AudiencePolicy = AudiencePolicy {
        returning_player_days: 14,
        new_player_days: 7,
    };

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 6, 15, 0, 0, 0).unwrap()
    }

    fn activity(created_days_ago: i64, login_days_ago: Option<i64>) -> PlayerActivity {
        PlayerActivity {
            created_at: now() - Duration::days(created_days_ago),
            last_login_at: login_days_ago.map(|d| now() - Duration::days(d)),
        }
    }

    #[test]
    fn no_conditions_always_eligible() {
        let result = evaluate(None, 1_000_000, &EligibilityFacts::default(), now(), &POLICY);
        assert!(result.can_use);
        assert!(result.reason.is_none());
    }

    #[test]
    fn total_cap_reached_denies() {
        let conditions = SaleConditions {
            max_uses_total: Some(10),
            ..Default::default()
        };
        let facts = EligibilityFacts::default();
        assert!(evaluate(Some(&conditions), 9, &facts, now(), &POLICY).can_use);
        let denied = evaluate(Some(&conditions), 10, &facts, now(), &POLICY);
        assert_eq!(denied, Eligibility::denied(REASON_TOTAL_CAP));
    }

    #[test]
    fn per_user_cap_denies_after_limit() {
        let conditions = SaleConditions {
            max_uses_per_user: Some(1),
            ..Default::default()
        };
        let fresh = EligibilityFacts {
            user_uses: Some(0),
            activity: None,
        };
        let used = EligibilityFacts {
            user_uses: Some(1),
            activity: None,
        };
        assert!(evaluate(Some(&conditions), 0, &fresh, now(), &POLICY).can_use);
        assert_eq!(
            evaluate(Some(&conditions), 1, &used, now(), &POLICY).reason.as_deref(),
            Some(REASON_USER_CAP)
        );
    }

    #[test]
    fn total_cap_checked_before_user_cap() {
        let conditions = SaleConditions {
            max_uses_total: Some(1),
            max_uses_per_user: Some(1),
            ..Default::default()
        };
        let facts = EligibilityFacts {
            user_uses: Some(1),
            activity: None,
        };
        let result = evaluate(Some(&conditions), 1, &facts, now(), &POLICY);
        assert_eq!(result.reason.as_deref(), Some(REASON_TOTAL_CAP));
    }

    #[test]
    fn returning_player_uses_last_login() {
        assert!(is_returning_player(&activity(400, Some(20)), now(), 14));
        assert!(!is_returning_player(&activity(400, Some(3)), now(), 14));
    }

    #[test]
    fn returning_player_falls_back_to_creation_time() {
        assert!(is_returning_player(&activity(30, None), now(), 14));
        assert!(!is_returning_player(&activity(2, None), now(), 14));
    }

    #[test]
    fn returning_boundary_is_inclusive() {
        assert!(is_returning_player(&activity(100, Some(14)), now(), 14));
    }

    #[test]
    fn new_player_window() {
        assert!(is_new_player(&activity(7, None), now(), 7));
        assert!(!is_new_player(&activity(8, None), now(), 7));
    }

    #[test]
    fn unrepresentable_window_does_not_panic() {
        assert!(!is_returning_player(&activity(400, Some(20)), now(), i64::MAX));
        assert!(is_new_player(&activity(400, None), now(), i64::MAX));
    }

    #[test]
    fn returning_gate_denies_active_player() {
        let conditions = SaleConditions {
            returning_player_only: true,
            ..Default::default()
        };
        let facts = EligibilityFacts {
            user_uses: None,
            activity: Some(activity(100, Some(1))),
        };
        assert_eq!(
            evaluate(Some(&conditions), 0, &facts, now(), &POLICY).reason.as_deref(),
            Some(REASON_RETURNING_ONLY)
        );
    }

    #[test]
    fn new_gate_denies_veteran() {
        let conditions = SaleConditions {
            new_player_only: true,
            ..Default::default()
        };
        let facts = EligibilityFacts {
            user_uses: None,
            activity: Some(activity(365, Some(1))),
        };
        assert_eq!(
            evaluate(Some(&conditions), 0, &facts, now(), &POLICY).reason.as_deref(),
            Some(REASON_NEW_ONLY)
        );
    }

    #[test]
    fn missing_activity_fails_audience_gate() {
        let conditions = SaleConditions {
            new_player_only: true,
            ..Default::default()
        };
        assert!(!evaluate(Some(&conditions), 0, &EligibilityFacts::default(), now(), &POLICY).can_use);
    }

    #[test]
    fn lookups_only_when_needed() {
        let plain = SaleConditions::default();
        assert!(!needs_user_uses(&plain));
        assert!(!needs_activity(&plain));
        let gated = SaleConditions {
            max_uses_per_user: Some(2),
            returning_player_only: true,
            ..Default::default()
        };
        assert!(needs_user_uses(&gated));
        assert!(needs_activity(&gated));
    }
}
