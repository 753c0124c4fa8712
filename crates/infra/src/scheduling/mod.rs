//! Scheduling infrastructure for the automation jobs.
//!
//! One cron-driven scheduler holds a static registry of named jobs built at
//! startup. Every execution path - cron tick or manual trigger - goes
//! through the same per-job-name lock, so two runs of the same job can never
//! overlap while different jobs stay independent.

mod error;
mod scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use scheduler::{AutomationScheduler, SchedulerConfig, TriggerOutcome};
