//! Daily reward harvesting job.

use std::sync::Arc;

use async_trait::async_trait;
use harvester_domain::constants::HARVEST_JOB_NAME;
use harvester_domain::Result;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::notify::NotificationDispatcher;
use crate::ports::{LoginStore, RewardsApi};
use crate::ScheduledJob;

/// Claims the day's reward once per scheduled cycle.
///
/// Not being logged in is a normal, expected state: the cycle logs and
/// reports success without issuing any remote call. A remote failure ends
/// the cycle; no retry is attempted until the next tick.
pub struct HarvestJob {
    api: Arc<dyn RewardsApi>,
    login_store: Arc<dyn LoginStore>,
    notifier: Arc<NotificationDispatcher>,
}

impl HarvestJob {
    /// Create the job with its collaborators.
    pub fn new(
        api: Arc<dyn RewardsApi>,
        login_store: Arc<dyn LoginStore>,
        notifier: Arc<NotificationDispatcher>,
    ) -> Self {
        Self { api, login_store, notifier }
    }
}

#[async_trait]
impl ScheduledJob for HarvestJob {
    fn name(&self) -> &'static str {
        HARVEST_JOB_NAME
    }

    async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        let Some(session) = self.login_store.get().await? else {
            info!("not logged in, skipping reward harvest");
            return Ok(());
        };

        // Token snapshot for this cycle; never cached across cycles.
        let outcome = match self.api.harvest_reward(&session.access_token, cancel).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = ?err, "failed to claim daily reward");
                return Err(err);
            }
        };

        info!(claimed_points = outcome.claimed_points, "daily reward claimed");

        let message = format!("Daily reward claimed: {} points", outcome.claimed_points);
        if let Err(err) = self.notifier.send(&message).await {
            warn!(error = ?err, "failed to dispatch harvest notification");
        }

        Ok(())
    }
}
