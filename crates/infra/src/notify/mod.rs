//! Outbound notification channel delivery.

mod senders;

pub use senders::{HttpChannelSender, HttpChannelSenderConfig};
