//! Notification dispatcher.
//!
//! Fan-out delivery is best-effort: a single channel's failure is logged and
//! never blocks the remaining channels. The explicit test path, by contrast,
//! surfaces the failure to the caller so a misconfigured key is visible.

use std::sync::Arc;

use harvester_domain::constants::KNOWN_CHANNELS;
use harvester_domain::{HarvesterError, NotificationChannel, Result};
use tracing::{debug, error, info};

use crate::ports::{ChannelSender, ChannelStore};

const TEST_MESSAGE: &str = "tiantang-harvester test notification";
const MASKED_KEY: &str = "********";

/// Delivers job outcome and test messages to the configured channels.
pub struct NotificationDispatcher {
    channels: Arc<dyn ChannelStore>,
    sender: Arc<dyn ChannelSender>,
}

impl NotificationDispatcher {
    /// Create a dispatcher over the persisted channel mapping.
    pub fn new(channels: Arc<dyn ChannelStore>, sender: Arc<dyn ChannelSender>) -> Self {
        Self { channels, sender }
    }

    /// Deliver `message` to every enabled channel, best-effort.
    pub async fn send(&self, message: &str) -> Result<()> {
        for channel in self.channels.all().await?.into_iter().filter(|c| c.enabled) {
            match self.sender.send(&channel, message).await {
                Ok(()) => debug!(channel = %channel.name, "notification delivered"),
                Err(err) => {
                    error!(channel = %channel.name, error = ?err, "notification delivery failed");
                }
            }
        }
        Ok(())
    }

    /// Deliver a canned message to one channel, surfacing any failure.
    pub async fn test(&self, channel_name: &str) -> Result<()> {
        let channel = self
            .channels
            .all()
            .await?
            .into_iter()
            .find(|c| c.name == channel_name)
            .ok_or_else(|| {
                HarvesterError::NotFound(format!("unknown notification channel: {channel_name}"))
            })?;

        self.sender.send(&channel, TEST_MESSAGE).await
    }

    /// Replace the whole channel mapping.
    ///
    /// Validation covers every entry before anything is written: one invalid
    /// entry rejects the whole update and leaves the stored mapping intact.
    pub async fn update_channels(&self, channels: Vec<NotificationChannel>) -> Result<()> {
        let mut seen: Vec<&str> = Vec::with_capacity(channels.len());
        for channel in &channels {
            if !KNOWN_CHANNELS.contains(&channel.name.as_str()) {
                return Err(HarvesterError::Validation(format!(
                    "unknown notification channel: {}",
                    channel.name
                )));
            }
            if seen.contains(&channel.name.as_str()) {
                return Err(HarvesterError::Validation(format!(
                    "duplicate notification channel: {}",
                    channel.name
                )));
            }
            if channel.enabled && channel.key.trim().is_empty() {
                return Err(HarvesterError::Validation(format!(
                    "channel {} is enabled but has no key",
                    channel.name
                )));
            }
            seen.push(channel.name.as_str());
        }

        let count = channels.len();
        self.channels.replace(channels).await?;
        info!(count, "notification channels updated");
        Ok(())
    }

    /// Current channel mapping with keys masked.
    pub async fn channels(&self) -> Result<Vec<NotificationChannel>> {
        let mut channels = self.channels.all().await?;
        for channel in &mut channels {
            if !channel.key.is_empty() {
                channel.key = MASKED_KEY.to_owned();
            }
        }
        Ok(channels)
    }
}
