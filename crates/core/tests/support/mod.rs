//! Mock port implementations for core tests.
//!
//! In-memory mocks for every core port, with call counters so tests can
//! assert exactly which remote calls a cycle issued.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use harvester_core::ports::{ChannelSender, ChannelStore, LoginStore, RewardsApi};
use harvester_domain::{
    ActiveBonusCard, BonusCardEntitlement, CaptchaChallenge, HarvestOutcome, HarvesterError,
    LoginSession, NotificationChannel, Result,
};
use tokio_util::sync::CancellationToken;

/// Configurable in-memory rewards API double.
///
/// Failure flags flip individual endpoints into `ExternalApi` errors;
/// `reject_*` flags simulate business rejections (`Validation`).
#[derive(Default)]
pub struct MockRewardsApi {
    pub activated: Mutex<Vec<ActiveBonusCard>>,
    pub owned: Mutex<Vec<BonusCardEntitlement>>,
    pub claimed_points: AtomicUsize,

    pub fail_harvest: AtomicBool,
    pub fail_activated: AtomicBool,
    pub fail_all_cards: AtomicBool,
    pub fail_activate: AtomicBool,
    pub fail_verify: AtomicBool,
    pub reject_sms: AtomicBool,
    pub reject_verify: AtomicBool,
    pub fail_refresh: AtomicBool,

    pub captcha_calls: AtomicUsize,
    pub sms_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub harvest_calls: AtomicUsize,
    pub activated_calls: AtomicUsize,
    pub all_cards_calls: AtomicUsize,
    pub activate_calls: Mutex<Vec<String>>,
}

impl MockRewardsApi {
    pub fn new() -> Self {
        let api = Self::default();
        api.claimed_points.store(100, Ordering::SeqCst);
        api
    }

    pub fn with_activated(self, cards: Vec<ActiveBonusCard>) -> Self {
        *self.activated.lock().unwrap() = cards;
        self
    }

    pub fn with_owned(self, cards: Vec<BonusCardEntitlement>) -> Self {
        *self.owned.lock().unwrap() = cards;
        self
    }

    pub fn activation_requests(&self) -> Vec<String> {
        self.activate_calls.lock().unwrap().clone()
    }

    fn external_failure(what: &str) -> HarvesterError {
        HarvesterError::ExternalApi(format!("{what}: connection reset by peer"))
    }
}

#[async_trait]
impl RewardsApi for MockRewardsApi {
    async fn fetch_captcha(&self, _cancel: &CancellationToken) -> Result<CaptchaChallenge> {
        self.captcha_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CaptchaChallenge {
            captcha_id: "captcha-1".into(),
            captcha_url: "https://rewards.example/captcha/captcha-1.png".into(),
        })
    }

    async fn send_sms(
        &self,
        _phone_number: &str,
        _captcha_id: &str,
        _captcha_code: &str,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        self.sms_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_sms.load(Ordering::SeqCst) {
            return Err(HarvesterError::Validation("invalid captcha".into()));
        }
        Ok(())
    }

    async fn verify_sms(
        &self,
        _phone_number: &str,
        _otp_code: &str,
        _cancel: &CancellationToken,
    ) -> Result<String> {
        let n = self.verify_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_verify.load(Ordering::SeqCst) {
            return Err(Self::external_failure("verify"));
        }
        if self.reject_verify.load(Ordering::SeqCst) {
            return Err(HarvesterError::Validation("wrong or expired code".into()));
        }
        Ok(format!("token-{n}"))
    }

    async fn refresh_login(
        &self,
        _phone_number: &str,
        _cancel: &CancellationToken,
    ) -> Result<String> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(Self::external_failure("refresh"));
        }
        Ok("refreshed-token".into())
    }

    async fn harvest_reward(
        &self,
        _access_token: &str,
        _cancel: &CancellationToken,
    ) -> Result<HarvestOutcome> {
        self.harvest_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_harvest.load(Ordering::SeqCst) {
            return Err(Self::external_failure("harvest"));
        }
        Ok(HarvestOutcome {
            claimed_points: self.claimed_points.load(Ordering::SeqCst) as i64,
        })
    }

    async fn activated_bonus_cards(
        &self,
        _access_token: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<ActiveBonusCard>> {
        self.activated_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_activated.load(Ordering::SeqCst) {
            return Err(Self::external_failure("activated cards"));
        }
        Ok(self.activated.lock().unwrap().clone())
    }

    async fn all_bonus_cards(
        &self,
        _access_token: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<BonusCardEntitlement>> {
        self.all_cards_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all_cards.load(Ordering::SeqCst) {
            return Err(Self::external_failure("card inventory"));
        }
        Ok(self.owned.lock().unwrap().clone())
    }

    async fn activate_bonus_card(
        &self,
        _access_token: &str,
        type_id: &str,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        self.activate_calls.lock().unwrap().push(type_id.to_owned());
        if self.fail_activate.load(Ordering::SeqCst) {
            return Err(Self::external_failure("activate card"));
        }
        Ok(())
    }
}

/// In-memory single-record login store.
#[derive(Default)]
pub struct MockLoginStore {
    session: Mutex<Option<LoginSession>>,
}

impl MockLoginStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_session(phone_number: &str, access_token: &str) -> Self {
        Self {
            session: Mutex::new(Some(LoginSession {
                phone_number: phone_number.to_owned(),
                access_token: access_token.to_owned(),
                obtained_at: Utc::now(),
            })),
        }
    }

    pub fn stored(&self) -> Option<LoginSession> {
        self.session.lock().unwrap().clone()
    }
}

#[async_trait]
impl LoginStore for MockLoginStore {
    async fn get(&self) -> Result<Option<LoginSession>> {
        Ok(self.session.lock().unwrap().clone())
    }

    async fn put(&self, session: LoginSession) -> Result<()> {
        *self.session.lock().unwrap() = Some(session);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}

/// In-memory channel mapping.
#[derive(Default)]
pub struct MockChannelStore {
    channels: Mutex<Vec<NotificationChannel>>,
    pub replace_calls: AtomicUsize,
}

impl MockChannelStore {
    pub fn new(channels: Vec<NotificationChannel>) -> Self {
        Self { channels: Mutex::new(channels), replace_calls: AtomicUsize::new(0) }
    }

    pub fn stored(&self) -> Vec<NotificationChannel> {
        self.channels.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelStore for MockChannelStore {
    async fn all(&self) -> Result<Vec<NotificationChannel>> {
        Ok(self.channels.lock().unwrap().clone())
    }

    async fn replace(&self, channels: Vec<NotificationChannel>) -> Result<()> {
        self.replace_calls.fetch_add(1, Ordering::SeqCst);
        *self.channels.lock().unwrap() = channels;
        Ok(())
    }
}

/// Channel sender double that records deliveries and can fail per channel.
#[derive(Default)]
pub struct MockChannelSender {
    pub sent: Mutex<Vec<(String, String)>>,
    failing: Mutex<HashSet<String>>,
}

impl MockChannelSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_channel(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_owned());
    }

    pub fn deliveries(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelSender for MockChannelSender {
    async fn send(&self, channel: &NotificationChannel, message: &str) -> Result<()> {
        if self.failing.lock().unwrap().contains(&channel.name) {
            return Err(HarvesterError::ExternalApi(format!(
                "{}: delivery failed",
                channel.name
            )));
        }
        self.sent.lock().unwrap().push((channel.name.clone(), message.to_owned()));
        Ok(())
    }
}

/// Build a channel configuration entry.
pub fn channel(name: &str, key: &str, enabled: bool) -> NotificationChannel {
    NotificationChannel { name: name.to_owned(), key: key.to_owned(), enabled }
}

/// Build an entitlement record.
pub fn entitlement(type_id: &str, remaining_count: i64) -> BonusCardEntitlement {
    BonusCardEntitlement { type_id: type_id.to_owned(), remaining_count }
}

/// Build an active card expiring `hours` from now.
pub fn active_card(name: &str, hours: i64) -> ActiveBonusCard {
    ActiveBonusCard { name: name.to_owned(), expires_at: Utc::now() + Duration::hours(hours) }
}
