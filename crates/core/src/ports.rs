//! Port interfaces for the automation core
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use harvester_domain::{
    ActiveBonusCard, BonusCardEntitlement, CaptchaChallenge, HarvestOutcome, LoginSession,
    NotificationChannel, Result,
};
use tokio_util::sync::CancellationToken;

/// Trait for issuing calls against the remote rewards API.
///
/// Implementations attach the bearer token where one is given, bound every
/// call with a deadline, and honor the caller's cancellation token. Any
/// transport failure, non-2xx response, malformed payload, timeout or
/// cancellation surfaces as [`harvester_domain::HarvesterError::ExternalApi`].
/// No retries are applied - a failure ends the caller's current cycle.
#[async_trait]
pub trait RewardsApi: Send + Sync {
    /// Issue a new CAPTCHA challenge, superseding any prior one.
    async fn fetch_captcha(&self, cancel: &CancellationToken) -> Result<CaptchaChallenge>;

    /// Validate the CAPTCHA pair remotely and request an SMS one-time code.
    async fn send_sms(
        &self,
        phone_number: &str,
        captcha_id: &str,
        captcha_code: &str,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Exchange the one-time code for an access token.
    async fn verify_sms(
        &self,
        phone_number: &str,
        otp_code: &str,
        cancel: &CancellationToken,
    ) -> Result<String>;

    /// Re-login with a previously verified phone number, yielding a fresh
    /// access token.
    async fn refresh_login(&self, phone_number: &str, cancel: &CancellationToken)
        -> Result<String>;

    /// Claim the day's reward.
    async fn harvest_reward(
        &self,
        access_token: &str,
        cancel: &CancellationToken,
    ) -> Result<HarvestOutcome>;

    /// Fetch the currently-activated bonus cards.
    async fn activated_bonus_cards(
        &self,
        access_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ActiveBonusCard>>;

    /// Fetch the account's bonus-card inventory.
    async fn all_bonus_cards(
        &self,
        access_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<BonusCardEntitlement>>;

    /// Activate one bonus card of the given type.
    async fn activate_bonus_card(
        &self,
        access_token: &str,
        type_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()>;
}

/// Trait for the single-record persisted login store.
///
/// Written only by [`crate::AuthService`]; read by jobs at the start of
/// every cycle. Readers always observe a complete record: `put` replaces
/// the stored session atomically.
#[async_trait]
pub trait LoginStore: Send + Sync {
    /// Read the current session. `None` is a normal "not logged in" result.
    async fn get(&self) -> Result<Option<LoginSession>>;

    /// Atomically replace the stored session.
    async fn put(&self, session: LoginSession) -> Result<()>;

    /// Remove the stored session.
    async fn clear(&self) -> Result<()>;
}

/// Trait for the persisted notification-channel mapping.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    /// All configured channels.
    async fn all(&self) -> Result<Vec<NotificationChannel>>;

    /// Atomically replace the whole channel mapping.
    async fn replace(&self, channels: Vec<NotificationChannel>) -> Result<()>;
}

/// Trait for delivering one message to one notification channel.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    /// Deliver `message` via `channel`.
    async fn send(&self, channel: &NotificationChannel, message: &str) -> Result<()>;
}
