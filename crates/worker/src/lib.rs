//! Scheduled trigger for the season and sales engines.
//!
//! The binary wires a PostgreSQL-backed [`scheduler::Scheduler`] to a
//! cancellation token; the library half is what the tests drive.

pub mod config;
pub mod scheduler;

pub use config::WorkerConfig;
pub use scheduler::{Scheduler, TickReport};
