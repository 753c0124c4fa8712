//! # Harvester Domain
//!
//! Business domain types for the tiantang account automation service.
//!
//! This crate contains:
//! - Domain data types (`LoginSession`, bonus card records, channels)
//! - The domain error type and `Result` alias
//! - Domain constants (bonus card ids, job names, channel names)
//!
//! ## Architecture
//! - No dependencies on other harvester crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::{HarvesterError, Result};
pub use types::{
    ActiveBonusCard, BonusCardEntitlement, CaptchaChallenge, HarvestOutcome, LoginSession,
    NotificationChannel,
};
