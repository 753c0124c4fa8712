//! Reqwest client for the rewards API.

use std::time::Duration;

use async_trait::async_trait;
use harvester_core::ports::RewardsApi;
use harvester_domain::{
    ActiveBonusCard, BonusCardEntitlement, CaptchaChallenge, HarvestOutcome, HarvesterError,
    Result,
};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::InfraError;
use super::types::{
    ActivateCardRequest, ActivatedCardData, ApiEnvelope, CaptchaData, HarvestData, OwnedCardData,
    RefreshLoginRequest, SendSmsRequest, TokenData, VerifySmsRequest,
};

const DEFAULT_BASE_URL: &str = "https://tiantang.mogencloud.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`RewardsApiClient`].
#[derive(Debug, Clone)]
pub struct RewardsApiClientConfig {
    /// Base URL of the rewards API.
    pub base_url: String,
    /// Deadline applied to every call.
    pub request_timeout: Duration,
}

impl Default for RewardsApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// How a remote business rejection (`errCode != 0`) is classified for one
/// endpoint. Login-flow endpoints reject on human input (bad CAPTCHA, wrong
/// OTP) and surface `Validation`; everything else is an external failure.
#[derive(Debug, Clone, Copy)]
enum Rejection {
    Validation,
    ExternalApi,
}

/// Client for the remote rewards API.
///
/// Attaches the bearer token where one is given and bounds every call with
/// the configured deadline and the caller's cancellation token. Performs no
/// retries: a failure ends the caller's current cycle.
pub struct RewardsApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl RewardsApiClient {
    /// Create a client from configuration.
    pub fn new(config: RewardsApiClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| HarvesterError::Config(format!("http client build failed: {err}")))?;
        Ok(Self { base_url: config.base_url, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Send a request, race it against cancellation and decode the envelope.
    /// The payload is required; endpoints without one go through
    /// [`Self::execute_unit`].
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        endpoint: &'static str,
        rejection: Rejection,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let envelope = self.execute_envelope::<T>(builder, endpoint, rejection, cancel).await?;
        envelope.data.ok_or_else(|| {
            HarvesterError::ExternalApi(format!("{endpoint}: response missing data payload"))
        })
    }

    /// Like [`Self::execute`] for endpoints whose success payload is empty.
    async fn execute_unit(
        &self,
        builder: RequestBuilder,
        endpoint: &'static str,
        rejection: Rejection,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.execute_envelope::<serde_json::Value>(builder, endpoint, rejection, cancel).await?;
        Ok(())
    }

    async fn execute_envelope<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        endpoint: &'static str,
        rejection: Rejection,
        cancel: &CancellationToken,
    ) -> Result<ApiEnvelope<T>> {
        debug!(endpoint, "calling rewards api");

        let response = tokio::select! {
            () = cancel.cancelled() => {
                return Err(HarvesterError::ExternalApi(format!("{endpoint}: call cancelled")));
            }
            result = builder.send() => {
                result.map_err(|err| HarvesterError::from(InfraError::from(err)))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(HarvesterError::ExternalApi(format!(
                "{endpoint}: unexpected status {status}"
            )));
        }

        // The body read is a second suspension point and honors the token
        // just like the send.
        let envelope: ApiEnvelope<T> = tokio::select! {
            () = cancel.cancelled() => {
                return Err(HarvesterError::ExternalApi(format!("{endpoint}: call cancelled")));
            }
            result = response.json() => {
                result.map_err(|err| HarvesterError::from(InfraError::from(err)))?
            }
        };

        if envelope.err_code != 0 {
            let msg = envelope.msg.unwrap_or_else(|| "request rejected".into());
            return Err(match rejection {
                Rejection::Validation => HarvesterError::Validation(msg),
                Rejection::ExternalApi => HarvesterError::ExternalApi(format!(
                    "{endpoint}: {msg} (errCode {})",
                    envelope.err_code
                )),
            });
        }

        Ok(envelope)
    }
}

#[async_trait]
impl RewardsApi for RewardsApiClient {
    async fn fetch_captcha(&self, cancel: &CancellationToken) -> Result<CaptchaChallenge> {
        let request = self.client.get(self.url("/web/api/login/captcha"));
        let data: CaptchaData =
            self.execute(request, "captcha", Rejection::ExternalApi, cancel).await?;
        Ok(data.into())
    }

    async fn send_sms(
        &self,
        phone_number: &str,
        captcha_id: &str,
        captcha_code: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let request = self.client.post(self.url("/web/api/login/sms")).json(&SendSmsRequest {
            phone: phone_number,
            captcha_id,
            captcha_code,
        });
        self.execute_unit(request, "sms", Rejection::Validation, cancel).await
    }

    async fn verify_sms(
        &self,
        phone_number: &str,
        otp_code: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let request = self
            .client
            .post(self.url("/web/api/login/verify"))
            .json(&VerifySmsRequest { phone: phone_number, otp_code });
        let data: TokenData =
            self.execute(request, "verify", Rejection::Validation, cancel).await?;
        Ok(data.token)
    }

    async fn refresh_login(
        &self,
        phone_number: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let request = self
            .client
            .post(self.url("/web/api/login/refresh"))
            .json(&RefreshLoginRequest { phone: phone_number });
        let data: TokenData =
            self.execute(request, "refresh", Rejection::ExternalApi, cancel).await?;
        Ok(data.token)
    }

    async fn harvest_reward(
        &self,
        access_token: &str,
        cancel: &CancellationToken,
    ) -> Result<HarvestOutcome> {
        let request = self.client.post(self.url("/web/api/harvest")).bearer_auth(access_token);
        let data: HarvestData =
            self.execute(request, "harvest", Rejection::ExternalApi, cancel).await?;
        Ok(data.into())
    }

    async fn activated_bonus_cards(
        &self,
        access_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ActiveBonusCard>> {
        let request = self
            .client
            .get(self.url("/web/api/bonus_cards/activated"))
            .bearer_auth(access_token);
        let data: Vec<ActivatedCardData> =
            self.execute(request, "activated_bonus_cards", Rejection::ExternalApi, cancel).await?;
        data.into_iter().map(ActiveBonusCard::try_from).collect()
    }

    async fn all_bonus_cards(
        &self,
        access_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<BonusCardEntitlement>> {
        let request =
            self.client.get(self.url("/web/api/bonus_cards")).bearer_auth(access_token);
        let data: Vec<OwnedCardData> =
            self.execute(request, "all_bonus_cards", Rejection::ExternalApi, cancel).await?;
        Ok(data.into_iter().map(BonusCardEntitlement::from).collect())
    }

    async fn activate_bonus_card(
        &self,
        access_token: &str,
        type_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let request = self
            .client
            .post(self.url("/web/api/bonus_cards/activate"))
            .bearer_auth(access_token)
            .json(&ActivateCardRequest { prop_id: type_id });
        self.execute_unit(request, "activate_bonus_card", Rejection::ExternalApi, cancel).await
    }
}
