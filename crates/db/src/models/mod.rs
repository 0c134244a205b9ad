//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches, where the
//!   entity is editable

pub mod audit;
pub mod currency;
pub mod player;
pub mod sale;
pub mod sale_usage;
pub mod season;
pub mod snapshot;
