//! # Harvester Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The reqwest-based rewards API client
//! - SQLite persistence (login record, notification channels)
//! - The cron scheduler with per-job-name mutual exclusion
//! - Per-channel notification senders
//! - The configuration loader
//!
//! ## Architecture
//! - Implements traits defined in `harvester-core`
//! - Contains all "impure" code (I/O, external services)

pub mod config;
pub mod database;
pub mod errors;
pub mod notify;
pub mod rewards;
pub mod scheduling;

// Re-export commonly used items
pub use config::HarvesterConfig;
pub use database::{DbManager, SqliteChannelRepository, SqliteLoginRepository};
pub use notify::{HttpChannelSender, HttpChannelSenderConfig};
pub use rewards::{RewardsApiClient, RewardsApiClientConfig};
pub use scheduling::{AutomationScheduler, SchedulerConfig, SchedulerError, TriggerOutcome};
