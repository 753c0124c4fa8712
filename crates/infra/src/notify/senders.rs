//! HTTP delivery for the supported notification channels.
//!
//! One sender dispatches on the channel name. Base URLs are configurable so
//! tests can point them at a local mock server.

use std::time::Duration;

use async_trait::async_trait;
use harvester_core::ports::ChannelSender;
use harvester_domain::constants::{CHANNEL_BARK, CHANNEL_SERVERCHAN, CHANNEL_TELEGRAM};
use harvester_domain::{HarvesterError, NotificationChannel, Result};
use serde_json::json;
use tracing::debug;

use crate::errors::InfraError;

const MESSAGE_TITLE: &str = "tiantang-harvester";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Configuration for [`HttpChannelSender`].
#[derive(Debug, Clone)]
pub struct HttpChannelSenderConfig {
    pub serverchan_base_url: String,
    pub bark_base_url: String,
    pub telegram_base_url: String,
    pub request_timeout: Duration,
}

impl Default for HttpChannelSenderConfig {
    fn default() -> Self {
        Self {
            serverchan_base_url: "https://sctapi.ftqq.com".into(),
            bark_base_url: "https://api.day.app".into(),
            telegram_base_url: "https://api.telegram.org".into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Reqwest-based implementation of [`ChannelSender`].
pub struct HttpChannelSender {
    config: HttpChannelSenderConfig,
    client: reqwest::Client,
}

impl HttpChannelSender {
    /// Create a sender from configuration.
    pub fn new(config: HttpChannelSenderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| HarvesterError::Config(format!("http client build failed: {err}")))?;
        Ok(Self { config, client })
    }

    async fn send_serverchan(&self, key: &str, message: &str) -> Result<()> {
        let url = format!("{}/{key}.send", self.config.serverchan_base_url);
        let response = self
            .client
            .post(url)
            .form(&[("title", MESSAGE_TITLE), ("desp", message)])
            .send()
            .await
            .map_err(|err| HarvesterError::from(InfraError::from(err)))?;
        check_status(CHANNEL_SERVERCHAN, response.status())
    }

    async fn send_bark(&self, key: &str, message: &str) -> Result<()> {
        let url = format!("{}/{key}", self.config.bark_base_url);
        let response = self
            .client
            .post(url)
            .form(&[("title", MESSAGE_TITLE), ("body", message)])
            .send()
            .await
            .map_err(|err| HarvesterError::from(InfraError::from(err)))?;
        check_status(CHANNEL_BARK, response.status())
    }

    async fn send_telegram(&self, key: &str, message: &str) -> Result<()> {
        // Telegram keys carry both halves: "<bot_token>@<chat_id>".
        let (bot_token, chat_id) = key.split_once('@').ok_or_else(|| {
            HarvesterError::Validation(
                "telegram channel key must be formatted as <bot_token>@<chat_id>".into(),
            )
        })?;

        let url = format!("{}/bot{bot_token}/sendMessage", self.config.telegram_base_url);
        let response = self
            .client
            .post(url)
            .json(&json!({ "chat_id": chat_id, "text": message }))
            .send()
            .await
            .map_err(|err| HarvesterError::from(InfraError::from(err)))?;
        check_status(CHANNEL_TELEGRAM, response.status())
    }
}

fn check_status(channel: &str, status: reqwest::StatusCode) -> Result<()> {
    if status.is_success() {
        debug!(channel, "notification delivered");
        Ok(())
    } else {
        Err(HarvesterError::ExternalApi(format!(
            "{channel}: delivery rejected with status {status}"
        )))
    }
}

#[async_trait]
impl ChannelSender for HttpChannelSender {
    async fn send(&self, channel: &NotificationChannel, message: &str) -> Result<()> {
        match channel.name.as_str() {
            CHANNEL_SERVERCHAN => self.send_serverchan(&channel.key, message).await,
            CHANNEL_BARK => self.send_bark(&channel.key, message).await,
            CHANNEL_TELEGRAM => self.send_telegram(&channel.key, message).await,
            other => Err(HarvesterError::Validation(format!(
                "unknown notification channel: {other}"
            ))),
        }
    }
}
