//! Electric-bill bonus card activation job.

use std::sync::Arc;

use async_trait::async_trait;
use harvester_domain::constants::{
    APPLY_BONUS_CARDS_JOB_NAME, ELECTRIC_BILL_BONUS_NAME, ELECTRIC_BILL_BONUS_TYPE_ID,
};
use harvester_domain::{ActiveBonusCard, BonusCardEntitlement, HarvesterError, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::ports::{LoginStore, RewardsApi};
use crate::ScheduledJob;

/// Activates an electric-bill bonus card when one is owned and none is
/// currently active.
///
/// The job is idempotent against a fixed external state: an already-active
/// card or an empty inventory resolves to a no-op, so re-running it issues
/// no further activation calls.
pub struct ApplyBonusCardsJob {
    api: Arc<dyn RewardsApi>,
    login_store: Arc<dyn LoginStore>,
}

impl ApplyBonusCardsJob {
    /// Create the job with its collaborators.
    pub fn new(api: Arc<dyn RewardsApi>, login_store: Arc<dyn LoginStore>) -> Self {
        Self { api, login_store }
    }

    async fn check_and_apply_electric_bill_bonus(
        &self,
        access_token: &str,
        activated: &[ActiveBonusCard],
        owned: &[BonusCardEntitlement],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let entitlement = single_or_none(
            owned.iter().filter(|card| card.type_id == ELECTRIC_BILL_BONUS_TYPE_ID),
            "electric bill bonus entitlement",
        )?;

        let Some(entitlement) = entitlement else {
            info!("no electric bill bonus card available, skipping activation");
            return Ok(());
        };

        info!(
            remaining = entitlement.remaining_count,
            "electric bill bonus cards remaining"
        );

        let active = single_or_none(
            activated.iter().filter(|card| card.name == ELECTRIC_BILL_BONUS_NAME),
            "active electric bill bonus card",
        )?;

        if let Some(card) = active {
            info!(expires_at = %card.expires_at, "an electric bill bonus card is already active");
            return Ok(());
        }

        // Entitlement presence was established above; a non-positive count
        // here still must not activate.
        if entitlement.remaining_count <= 0 {
            warn!("electric bill bonus entitlement has no remaining cards, not activating");
            return Ok(());
        }

        info!("activating electric bill bonus card");
        self.api.activate_bonus_card(access_token, ELECTRIC_BILL_BONUS_TYPE_ID, cancel).await
    }
}

#[async_trait]
impl ScheduledJob for ApplyBonusCardsJob {
    fn name(&self) -> &'static str {
        APPLY_BONUS_CARDS_JOB_NAME
    }

    async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        let Some(session) = self.login_store.get().await? else {
            info!("not logged in, skipping bonus card check");
            return Ok(());
        };
        let access_token = session.access_token.as_str();

        // The second fetch is only issued once the first has succeeded.
        let activated = match self.api.activated_bonus_cards(access_token, cancel).await {
            Ok(cards) => cards,
            Err(err) => {
                error!(error = ?err, "failed to fetch activated bonus cards");
                return Err(err);
            }
        };

        let owned = match self.api.all_bonus_cards(access_token, cancel).await {
            Ok(cards) => cards,
            Err(err) => {
                error!(error = ?err, "failed to fetch bonus card inventory");
                return Err(err);
            }
        };

        self.check_and_apply_electric_bill_bonus(access_token, &activated, &owned, cancel).await
    }
}

/// `single-or-none` lookup: more than one match is an invariant violation,
/// never silently resolved by picking one.
fn single_or_none<'a, T>(
    mut matches: impl Iterator<Item = &'a T>,
    what: &str,
) -> Result<Option<&'a T>> {
    let first = matches.next();
    if first.is_some() && matches.next().is_some() {
        return Err(HarvesterError::Internal(format!(
            "expected at most one {what}, found several"
        )));
    }
    Ok(first)
}
