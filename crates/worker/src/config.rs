use std::time::Duration;

use arena_engine::config::{var_or, var_required};
use arena_engine::ConfigError;

/// Worker process configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database_url: String,
    /// Time between scheduler ticks.
    pub scheduler_interval: Duration,
    /// Pay rewards in the same tick that ends a season.
    pub auto_distribute_rewards: bool,
    pub db_max_connections: u32,
}

impl WorkerConfig {
    /// Load from the process environment.
    ///
    /// | Env var                   | Default  |
    /// |---------------------------|----------|
    /// | `DATABASE_URL`            | required |
    /// | `SCHEDULER_INTERVAL_SECS` | `60`     |
    /// | `AUTO_DISTRIBUTE_REWARDS` | `true`   |
    /// | `DB_MAX_CONNECTIONS`      | `20`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = var_required(&lookup, "DATABASE_URL")?;

        let interval_secs: u64 = var_or(&lookup, "SCHEDULER_INTERVAL_SECS", 60)?;
        if interval_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "SCHEDULER_INTERVAL_SECS",
                value: interval_secs.to_string(),
                reason: "must be at least 1".into(),
            });
        }

        let db_max_connections: u32 = var_or(&lookup, "DB_MAX_CONNECTIONS", 20)?;
        if db_max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                value: db_max_connections.to_string(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            database_url,
            scheduler_interval: Duration::from_secs(interval_secs),
            auto_distribute_rewards: var_or(&lookup, "AUTO_DISTRIBUTE_REWARDS", true)?,
            db_max_connections,
        })
    }
}
