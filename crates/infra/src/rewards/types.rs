//! Wire types for the rewards API.
//!
//! The remote wraps every payload in `{ errCode, msg, data }`. Responses are
//! decoded into these structs at the client boundary; a missing or malformed
//! field is an explicit decode error there, never a defect discovered deep
//! in job logic.

use chrono::{DateTime, Utc};
use harvester_domain::{
    ActiveBonusCard, BonusCardEntitlement, CaptchaChallenge, HarvestOutcome, HarvesterError,
};
use serde::{Deserialize, Serialize};

/// Response envelope shared by all endpoints.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(super) struct ApiEnvelope<T> {
    #[serde(rename = "errCode")]
    pub err_code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CaptchaData {
    #[serde(rename = "captchaId")]
    pub captcha_id: String,
    #[serde(rename = "captchaUrl")]
    pub captcha_url: String,
}

impl From<CaptchaData> for CaptchaChallenge {
    fn from(data: CaptchaData) -> Self {
        Self { captcha_id: data.captcha_id, captcha_url: data.captcha_url }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenData {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct HarvestData {
    pub score: i64,
}

impl From<HarvestData> for HarvestOutcome {
    fn from(data: HarvestData) -> Self {
        Self { claimed_points: data.score }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ActivatedCardData {
    pub name: String,
    /// Expiry as a unix epoch in seconds.
    pub ended_at: i64,
}

impl TryFrom<ActivatedCardData> for ActiveBonusCard {
    type Error = HarvesterError;

    fn try_from(data: ActivatedCardData) -> Result<Self, Self::Error> {
        let expires_at: DateTime<Utc> =
            DateTime::from_timestamp(data.ended_at, 0).ok_or_else(|| {
                HarvesterError::ExternalApi(format!(
                    "activated card {} carries an invalid expiry epoch: {}",
                    data.name, data.ended_at
                ))
            })?;
        Ok(Self { name: data.name, expires_at })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct OwnedCardData {
    pub prop_id: i64,
    pub count: i64,
}

impl From<OwnedCardData> for BonusCardEntitlement {
    fn from(data: OwnedCardData) -> Self {
        Self { type_id: data.prop_id.to_string(), remaining_count: data.count }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct SendSmsRequest<'a> {
    pub phone: &'a str,
    #[serde(rename = "captchaId")]
    pub captcha_id: &'a str,
    #[serde(rename = "captchaCode")]
    pub captcha_code: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct VerifySmsRequest<'a> {
    pub phone: &'a str,
    #[serde(rename = "otpCode")]
    pub otp_code: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct RefreshLoginRequest<'a> {
    pub phone: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct ActivateCardRequest<'a> {
    #[serde(rename = "propId")]
    pub prop_id: &'a str,
}
