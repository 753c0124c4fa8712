//! # Harvester Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the rewards API, the persisted
//!   login record, and notification channels
//! - The auth state machine (`AuthService`)
//! - The scheduled jobs (`HarvestJob`, `ApplyBonusCardsJob`)
//! - The notification dispatcher
//!
//! ## Architecture Principles
//! - Only depends on `harvester-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod auth;
pub mod jobs;
pub mod notify;
pub mod ports;

// Re-export specific items to avoid ambiguity
pub use auth::AuthService;
pub use jobs::{ApplyBonusCardsJob, HarvestJob, ScheduledJob};
pub use notify::NotificationDispatcher;
pub use ports::{ChannelSender, ChannelStore, LoginStore, RewardsApi};
