//! Auth service - owns the CAPTCHA -> SMS -> token state machine.
//!
//! The remote rewards API drives the state transitions; this service wires
//! the calls together and is the only writer of the persisted
//! [`LoginSession`]. An operation-level mutex serializes every mutating flow
//! so two concurrent login/refresh attempts can never interleave their
//! writes; readers always observe a complete session record.

use std::sync::Arc;

use chrono::Utc;
use harvester_domain::{CaptchaChallenge, HarvesterError, LoginSession, Result};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::ports::{LoginStore, RewardsApi};

/// Auth service for the tiantang account.
pub struct AuthService {
    api: Arc<dyn RewardsApi>,
    store: Arc<dyn LoginStore>,
    // Serializes verify/refresh/logout. Plain reads bypass it.
    write_lock: Mutex<()>,
}

impl AuthService {
    /// Create a new auth service.
    pub fn new(api: Arc<dyn RewardsApi>, store: Arc<dyn LoginStore>) -> Self {
        Self { api, store, write_lock: Mutex::new(()) }
    }

    /// Request a new CAPTCHA challenge, superseding any prior one.
    pub async fn request_captcha(&self) -> Result<CaptchaChallenge> {
        let challenge = self.api.fetch_captcha(&CancellationToken::new()).await?;
        info!(captcha_id = %challenge.captcha_id, "issued new captcha challenge");
        Ok(challenge)
    }

    /// Validate the CAPTCHA pair remotely and request an SMS code.
    ///
    /// Does not change persisted state. An invalid CAPTCHA surfaces as
    /// `Validation`; a transport failure as `ExternalApi`.
    pub async fn request_sms(
        &self,
        phone_number: &str,
        captcha_id: &str,
        captcha_code: &str,
    ) -> Result<()> {
        self.api
            .send_sms(phone_number, captcha_id, captcha_code, &CancellationToken::new())
            .await?;
        info!(phone_number = %mask_phone(phone_number), "sms code requested");
        Ok(())
    }

    /// Exchange the one-time code for a token and persist a fresh session,
    /// overwriting any existing one.
    pub async fn verify_sms(&self, phone_number: &str, otp_code: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let token =
            self.api.verify_sms(phone_number, otp_code, &CancellationToken::new()).await?;
        self.store
            .put(LoginSession {
                phone_number: phone_number.to_owned(),
                access_token: token,
                obtained_at: Utc::now(),
            })
            .await?;

        info!(phone_number = %mask_phone(phone_number), "login verified, session persisted");
        Ok(())
    }

    /// Force a re-login with the stored phone number.
    ///
    /// On any failure the prior session is left untouched - the store is
    /// only written once a fresh token has been obtained.
    pub async fn refresh_login(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let Some(session) = self.store.get().await? else {
            return Err(HarvesterError::Validation(
                "no persisted login to refresh".into(),
            ));
        };

        let token =
            self.api.refresh_login(&session.phone_number, &CancellationToken::new()).await?;
        self.store
            .put(LoginSession {
                phone_number: session.phone_number.clone(),
                access_token: token,
                obtained_at: Utc::now(),
            })
            .await?;

        info!(phone_number = %mask_phone(&session.phone_number), "login refreshed");
        Ok(())
    }

    /// Current session, if any. Pure read; `None` means "not logged in".
    pub async fn current_session(&self) -> Result<Option<LoginSession>> {
        self.store.get().await
    }

    /// Drop the persisted session.
    pub async fn logout(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.clear().await?;
        info!("session cleared");
        Ok(())
    }
}

// Counts characters, not bytes: the number is caller-supplied and may hold
// multi-byte text, which must never split mid-character.
fn mask_phone(phone_number: &str) -> String {
    let char_count = phone_number.chars().count();
    if char_count <= 4 {
        return "****".into();
    }
    let tail: String = phone_number.chars().skip(char_count - 4).collect();
    format!("****{tail}")
}
