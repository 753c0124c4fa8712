//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Bonus cards
/// Remote type identifier (`prop_id`) of the electric-bill bonus card.
pub const ELECTRIC_BILL_BONUS_TYPE_ID: &str = "2";
/// Display name the remote API uses for an activated electric-bill card.
pub const ELECTRIC_BILL_BONUS_NAME: &str = "电费卡";

// Job names (stable identifiers used for scheduling and manual triggering)
pub const HARVEST_JOB_NAME: &str = "harvest";
pub const APPLY_BONUS_CARDS_JOB_NAME: &str = "apply_bonus_cards";

// Notification channels
pub const CHANNEL_SERVERCHAN: &str = "serverchan";
pub const CHANNEL_BARK: &str = "bark";
pub const CHANNEL_TELEGRAM: &str = "telegram";

/// Channel names the dispatcher accepts in a configuration update.
pub const KNOWN_CHANNELS: [&str; 3] = [CHANNEL_SERVERCHAN, CHANNEL_BARK, CHANNEL_TELEGRAM];

/// Placeholder returned instead of the access token unless the caller
/// explicitly asks for it.
pub const MASKED_TOKEN: &str = "MASKED";
