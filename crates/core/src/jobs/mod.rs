//! Scheduled jobs.
//!
//! Each job is a struct that receives its collaborators explicitly at
//! construction time and threads the token snapshot through its own calls -
//! there is no ambient service resolution and no per-instance token state.
//! The scheduler owns the per-job-name mutual exclusion; jobs themselves are
//! free of locking concerns.

use async_trait::async_trait;
use harvester_domain::Result;
use tokio_util::sync::CancellationToken;

mod bonus_cards;
mod harvest;

pub use bonus_cards::ApplyBonusCardsJob;
pub use harvest::HarvestJob;

/// Trait representing one schedulable automation routine.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Stable identifier used for scheduling and manual triggering.
    fn name(&self) -> &'static str;

    /// Execute one cycle. Remote calls must honor `cancel`.
    async fn run(&self, cancel: &CancellationToken) -> Result<()>;
}
