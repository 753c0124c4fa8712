//! Domain types for the tiantang account automation service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted login record for the tiantang account.
///
/// At most one instance exists at a time; it is overwritten as a whole on a
/// successful OTP verification or forced refresh, and only the auth service
/// writes it. Jobs read it at the start of every cycle and never cache the
/// token across cycles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginSession {
    pub phone_number: String,
    pub access_token: String,
    pub obtained_at: DateTime<Utc>,
}

/// Ephemeral CAPTCHA challenge correlating a displayed image with the
/// subsequent SMS request. Each new request supersedes the prior one; the
/// remote API is authoritative for expiry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaptchaChallenge {
    pub captcha_id: String,
    pub captcha_url: String,
}

/// Inventory entry for one bonus-card type the account owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BonusCardEntitlement {
    pub type_id: String,
    pub remaining_count: i64,
}

/// A currently-activated bonus effect on the account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveBonusCard {
    pub name: String,
    pub expires_at: DateTime<Utc>,
}

/// Configuration for one notification channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationChannel {
    pub name: String,
    pub key: String,
    pub enabled: bool,
}

/// Result of a successful daily reward claim.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HarvestOutcome {
    pub claimed_points: i64,
}
