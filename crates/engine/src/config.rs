use std::fmt::Display;
use std::str::FromStr;

use arena_core::eligibility::{AudiencePolicy, MAX_AUDIENCE_DAYS};
use arena_core::sales::MAX_FLASH_SALE_HOURS;
use arena_core::season::BASELINE_RATING;
use arena_core::types::Rating;

/// A missing or unparseable environment variable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be set")]
    Missing { name: &'static str },

    #[error("{name}='{value}' is invalid: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Read `name` through `lookup`, falling back to `default` when unset.
pub fn var_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw,
            reason: e.to_string(),
        }),
    }
}

/// Read a variable that has no default.
pub fn var_required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing { name })
}

fn ensure(
    ok: bool,
    name: &'static str,
    value: impl ToString,
    reason: &str,
) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        })
    }
}

/// Highest configurable reset baseline.
pub const MAX_BASELINE_RATING: Rating = 100_000;

/// Tunables shared by the season and sales engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Rating that full and soft resets move toward.
    pub baseline_rating: Rating,
    /// Days since last activity before a player counts as returning.
    pub returning_player_days: i64,
    /// Account age, in days, up to which a player counts as new.
    pub new_player_days: i64,
    pub max_discount_percent: i32,
    pub flash_sale_duration_hours: i64,
    pub flash_sale_priority: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            baseline_rating: BASELINE_RATING,
            returning_player_days: 14,
            new_player_days: 7,
            max_discount_percent: 90,
            flash_sale_duration_hours: 24,
            flash_sale_priority: 10,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `BASELINE_RATING`           | `1000`  |
    /// | `RETURNING_PLAYER_DAYS`     | `14`    |
    /// | `NEW_PLAYER_DAYS`           | `7`     |
    /// | `MAX_DISCOUNT_PERCENT`      | `90`    |
    /// | `FLASH_SALE_DURATION_HOURS` | `24`    |
    /// | `FLASH_SALE_PRIORITY`       | `10`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            baseline_rating: var_or(&lookup, "BASELINE_RATING", defaults.baseline_rating)?,
            returning_player_days: var_or(
                &lookup,
                "RETURNING_PLAYER_DAYS",
                defaults.returning_player_days,
            )?,
            new_player_days: var_or(&lookup, "NEW_PLAYER_DAYS", defaults.new_player_days)?,
            max_discount_percent: var_or(
                &lookup,
                "MAX_DISCOUNT_PERCENT",
                defaults.max_discount_percent,
            )?,
            flash_sale_duration_hours: var_or(
                &lookup,
                "FLASH_SALE_DURATION_HOURS",
                defaults.flash_sale_duration_hours,
            )?,
            flash_sale_priority: var_or(
                &lookup,
                "FLASH_SALE_PRIORITY",
                defaults.flash_sale_priority,
            )?,
        };

        ensure(
            (0..=MAX_BASELINE_RATING).contains(&config.baseline_rating),
            "BASELINE_RATING",
            config.baseline_rating,
            &format!("must be between 0 and {MAX_BASELINE_RATING}"),
        )?;
        ensure(
            (0..=MAX_AUDIENCE_DAYS).contains(&config.returning_player_days),
            "RETURNING_PLAYER_DAYS",
            config.returning_player_days,
            &format!("must be between 0 and {MAX_AUDIENCE_DAYS}"),
        )?;
        ensure(
            (0..=MAX_AUDIENCE_DAYS).contains(&config.new_player_days),
            "NEW_PLAYER_DAYS",
            config.new_player_days,
            &format!("must be between 0 and {MAX_AUDIENCE_DAYS}"),
        )?;
        ensure(
            (0..=100).contains(&config.max_discount_percent),
            "MAX_DISCOUNT_PERCENT",
            config.max_discount_percent,
            "must be between 0 and 100",
        )?;
        ensure(
            (1..=MAX_FLASH_SALE_HOURS).contains(&config.flash_sale_duration_hours),
            "FLASH_SALE_DURATION_HOURS",
            config.flash_sale_duration_hours,
            &format!("must be between 1 and {MAX_FLASH_SALE_HOURS}"),
        )?;

        Ok(config)
    }

    pub fn audience_policy(&self) -> AudiencePolicy {
        AudiencePolicy {
            returning_player_days: self.returning_player_days,
            new_player_days: self.new_player_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.baseline_rating, 1000);
        assert_eq!(config.flash_sale_priority, 10);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("BASELINE_RATING", "1200"),
            ("MAX_DISCOUNT_PERCENT", " 75 "),
        ]))
        .unwrap();
        assert_eq!(config.baseline_rating, 1200);
        assert_eq!(config.max_discount_percent, 75);
    }

    #[test]
    fn unparseable_value_names_the_variable() {
        let err = EngineConfig::from_lookup(lookup(&[("NEW_PLAYER_DAYS", "week")])).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { name: "NEW_PLAYER_DAYS", .. });
        assert!(err.to_string().starts_with("NEW_PLAYER_DAYS='week'"));
    }

    #[test]
    fn out_of_range_discount_rejected() {
        let err = EngineConfig::from_lookup(lookup(&[("MAX_DISCOUNT_PERCENT", "150")])).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { name: "MAX_DISCOUNT_PERCENT", .. });
    }

    #[test]
    fn audience_windows_are_bounded() {
        let err = EngineConfig::from_lookup(lookup(&[("RETURNING_PLAYER_DAYS", "9000000000000000")]))
            .unwrap_err();
        assert_matches!(err, ConfigError::Invalid { name: "RETURNING_PLAYER_DAYS", .. });
        let err = EngineConfig::from_lookup(lookup(&[("NEW_PLAYER_DAYS", "3651")])).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { name: "NEW_PLAYER_DAYS", .. });
        assert!(EngineConfig::from_lookup(lookup(&[("NEW_PLAYER_DAYS", "3650")])).is_ok());
    }

    #[test]
    fn baseline_rating_is_bounded() {
        let err =
            EngineConfig::from_lookup(lookup(&[("BASELINE_RATING", "2000000000")])).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { name: "BASELINE_RATING", .. });
        let err = EngineConfig::from_lookup(lookup(&[("BASELINE_RATING", "-5")])).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { name: "BASELINE_RATING", .. });
    }

    #[test]
    fn flash_duration_is_bounded() {
        let err = EngineConfig::from_lookup(lookup(&[("FLASH_SALE_DURATION_HOURS", "8761")]))
            .unwrap_err();
        assert_matches!(err, ConfigError::Invalid { name: "FLASH_SALE_DURATION_HOURS", .. });
    }

    #[test]
    fn required_variable_reports_missing() {
        let err = var_required(&lookup(&[("DATABASE_URL", "  ")]), "DATABASE_URL").unwrap_err();
        assert_matches!(err, ConfigError::Missing { name: "DATABASE_URL" });
    }
}
