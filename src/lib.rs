//! Taskpad core library.
//!
//! Local-first task tracking: a SQLite-backed task store with tolerant
//! additive schema migration, a date normalization layer, and an
//! alternate REST-backed store honoring the same contract.

pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod logging;
pub mod remote;
pub mod store;
pub mod types;
pub mod validate;
