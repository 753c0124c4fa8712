//! Remote rewards API integration.

mod client;
mod types;

pub use client::{RewardsApiClient, RewardsApiClientConfig};
