//! Audit logging constants.
//!
//! This module lives in `core` (zero internal deps) so the engine, the
//! repository layer, and the scheduler agree on action names.

// ---------------------------------------------------------------------------
// Action type constants
// ---------------------------------------------------------------------------

/// Known action types for audit log entries.
pub mod action_types {
    pub const SEASON_CREATE: &str = "season_create";
    pub const SEASON_UPDATE: &str = "season_update";
    pub const SEASON_START: &str = "season_start";
    pub const SEASON_AUTO_END: &str = "season_auto_end";
    pub const SEASON_END: &str = "season_end";
    pub const SEASON_REWARDS_DISTRIBUTE: &str = "season_rewards_distribute";
    pub const SEASON_DELETE: &str = "season_delete";
    pub const SALE_CREATE: &str = "sale_create";
    pub const SALE_UPDATE: &str = "sale_update";
    pub const SALE_END_EARLY: &str = "sale_end_early";
    pub const SALE_TOGGLE: &str = "sale_toggle";
    pub const SALE_DELETE: &str = "sale_delete";
}

/// Entity type labels stored alongside audit entries.
pub mod entity_types {
    pub const SEASON: &str = "season";
    pub const SALE: &str = "sale";
}

// ---------------------------------------------------------------------------
// Log category constants
// ---------------------------------------------------------------------------

/// Known log categories for retention and filtering.
pub mod log_categories {
    pub const COMPETITIVE: &str = "competitive";
    pub const ECONOMY: &str = "economy";
    pub const OTHER: &str = "other";
}

/// Map an action type to its log category.
///
/// Unknown action types default to `"other"`.
pub fn action_to_category(action_type: &str) -> &'static str {
    if action_type.starts_with("season_") {
        log_categories::COMPETITIVE
    } else if action_type.starts_with("sale_") {
        log_categories::ECONOMY
    } else {
        log_categories::OTHER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_actions_are_competitive() {
        assert_eq!(
            action_to_category(action_types::SEASON_START),
            log_categories::COMPETITIVE
        );
        assert_eq!(
            action_to_category(action_types::SEASON_REWARDS_DISTRIBUTE),
            log_categories::COMPETITIVE
        );
    }

    #[test]
    fn sale_actions_are_economy() {
        assert_eq!(action_to_category(action_types::SALE_DELETE), log_categories::ECONOMY);
    }

    #[test]
    fn unknown_action_maps_to_other() {
        assert_eq!(action_to_category("login"), log_categories::OTHER);
    }
}
