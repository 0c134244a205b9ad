//! Pure competitive-season and promotional-sale rules.
//!
//! Nothing in this crate touches the database or the clock. Every function
//! takes the values it needs (including `now`) so the engine layer can call
//! it from inside a single store operation and tests can pin inputs exactly.

pub mod audit;
pub mod currency;
pub mod eligibility;
pub mod error;
pub mod ranking;
pub mod roles;
pub mod sales;
pub mod season;
pub mod tiers;
pub mod types;
