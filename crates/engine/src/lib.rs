//! Season lifecycle and promotional pricing engines.
//!
//! Both engines are generic over the collaborator traits in [`store`], with a
//! PostgreSQL backend in [`pg`] and an in-memory backend in [`memory`].

pub mod audit;
pub mod clock;
pub mod config;
pub mod error;
pub mod memory;
pub mod pg;
pub mod sales;
pub mod season;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, EngineConfig};
pub use error::{EngineError, EngineResult};
pub use memory::MemoryStore;
pub use pg::PgStore;
pub use sales::SalesEngine;
pub use season::SeasonEngine;
