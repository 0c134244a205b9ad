//! Repository layer.
//!
//! Each repository is a zero-sized struct whose async methods take a
//! `&PgPool` and return `Result<_, sqlx::Error>`.

pub mod audit_repo;
pub mod currency_repo;
pub mod player_repo;
pub mod sale_repo;
pub mod sale_usage_repo;
pub mod season_repo;
pub mod snapshot_repo;

pub use audit_repo::AuditLogRepo;
pub use currency_repo::CurrencyRepo;
pub use player_repo::PlayerRepo;
pub use sale_repo::SaleRepo;
pub use sale_usage_repo::SaleUsageRepo;
pub use season_repo::SeasonRepo;
pub use snapshot_repo::SnapshotRepo;
