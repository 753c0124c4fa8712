//! Cron scheduler with per-job-name mutual exclusion.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use harvester_core::ScheduledJob;
use harvester_domain::{HarvesterError, Result};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::error::{SchedulerError, SchedulerResult};

/// Configuration for the automation scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Timeout applied to a single job execution.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            job_timeout: Duration::from_secs(120),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
        }
    }
}

/// Result of a manual trigger request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The job was started.
    Triggered,
    /// The job's previous execution still holds the lock; the trigger was
    /// dropped.
    Busy,
}

struct RegisteredJob {
    job: Arc<dyn ScheduledJob>,
    lock: Arc<Mutex<()>>,
}

/// Scheduler for the fixed set of named automation jobs.
///
/// Each job name carries a mutex acquired with `try_lock` before any
/// execution: an overlapping trigger of the same name is dropped, never run
/// concurrently, while different names stay independent. The lock is held by
/// the executing task and released on every exit path - success, failure,
/// timeout or cancellation - through guard drop.
pub struct AutomationScheduler {
    scheduler: JobScheduler,
    config: SchedulerConfig,
    registry: HashMap<&'static str, RegisteredJob>,
    shutdown: CancellationToken,
    running: bool,
}

impl AutomationScheduler {
    /// Create a scheduler with the given configuration.
    pub async fn new(config: SchedulerConfig) -> SchedulerResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|err| SchedulerError::CreationFailed(err.to_string()))?;

        Ok(Self {
            scheduler,
            config,
            registry: HashMap::new(),
            shutdown: CancellationToken::new(),
            running: false,
        })
    }

    /// Register a job on a recurring cron trigger.
    ///
    /// The registry is static: all jobs are registered before [`Self::start`].
    pub async fn register(
        &mut self,
        job: Arc<dyn ScheduledJob>,
        cron_expression: &str,
    ) -> SchedulerResult<()> {
        if self.running {
            return Err(SchedulerError::AlreadyRunning);
        }

        let name = job.name();
        if self.registry.contains_key(name) {
            return Err(SchedulerError::JobRegistrationFailed(format!(
                "job {name} registered twice"
            )));
        }

        let lock = Arc::new(Mutex::new(()));
        let closure_job = Arc::clone(&job);
        let closure_lock = Arc::clone(&lock);
        let shutdown = self.shutdown.clone();
        let job_timeout = self.config.job_timeout;

        let job_definition = Job::new_async(cron_expression, move |_id, _lock| {
            let job = Arc::clone(&closure_job);
            let lock = Arc::clone(&closure_lock);
            let shutdown = shutdown.clone();

            Box::pin(async move {
                let Ok(guard) = lock.try_lock_owned() else {
                    warn!(job = job.name(), "previous run still in progress, dropping tick");
                    return;
                };
                execute_locked(guard, job, job_timeout, &shutdown).await;
            })
        })
        .map_err(|err| SchedulerError::JobRegistrationFailed(err.to_string()))?;

        self.scheduler
            .add(job_definition)
            .await
            .map_err(|err| SchedulerError::JobRegistrationFailed(err.to_string()))?;

        debug!(job = name, cron = cron_expression, "registered automation job");
        self.registry.insert(name, RegisteredJob { job, lock });
        Ok(())
    }

    /// Trigger a registered job by name, immediately and off-schedule.
    ///
    /// Unknown names fail with `NotFound`. A job whose previous execution is
    /// still running reports [`TriggerOutcome::Busy`] instead of overlapping.
    pub fn trigger(&self, name: &str) -> Result<TriggerOutcome> {
        let entry = self
            .registry
            .get(name)
            .ok_or_else(|| HarvesterError::NotFound(format!("unknown job: {name}")))?;

        let Ok(guard) = Arc::clone(&entry.lock).try_lock_owned() else {
            return Ok(TriggerOutcome::Busy);
        };

        let job = Arc::clone(&entry.job);
        let shutdown = self.shutdown.clone();
        let job_timeout = self.config.job_timeout;
        info!(job = name, "job triggered manually");

        tokio::spawn(async move {
            execute_locked(guard, job, job_timeout, &shutdown).await;
        });

        Ok(TriggerOutcome::Triggered)
    }

    /// Names of all registered jobs.
    pub fn job_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.registry.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Start the cron triggers.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.running {
            return Err(SchedulerError::AlreadyRunning);
        }

        let start_timeout = self.config.start_timeout;
        tokio::time::timeout(start_timeout, self.scheduler.start())
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: start_timeout.as_secs() })?
            .map_err(|err| SchedulerError::StartFailed(err.to_string()))?;

        self.running = true;
        info!(jobs = self.registry.len(), "automation scheduler started");
        Ok(())
    }

    /// Stop the cron triggers and cancel in-flight executions.
    ///
    /// Terminal: a stopped scheduler is not restarted, a fresh one is built.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.running {
            return Err(SchedulerError::NotRunning);
        }

        self.shutdown.cancel();

        let stop_timeout = self.config.stop_timeout;
        tokio::time::timeout(stop_timeout, self.scheduler.shutdown())
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: stop_timeout.as_secs() })?
            .map_err(|err| SchedulerError::StopFailed(err.to_string()))?;

        self.running = false;
        info!("automation scheduler stopped");
        Ok(())
    }

    /// Returns true between a successful start and stop.
    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Run one job cycle while holding its name lock.
///
/// The guard travels into this function and drops on every exit path, so
/// the next tick is never starved by a finished, failed or timed-out run.
async fn execute_locked(
    guard: OwnedMutexGuard<()>,
    job: Arc<dyn ScheduledJob>,
    job_timeout: Duration,
    shutdown: &CancellationToken,
) {
    let _guard = guard;
    let name = job.name();
    let cancel = shutdown.child_token();
    let started = Instant::now();

    match tokio::time::timeout(job_timeout, job.run(&cancel)).await {
        Ok(Ok(())) => {
            debug!(job = name, elapsed = ?started.elapsed(), "job cycle finished");
        }
        Ok(Err(err)) => {
            error!(job = name, error = ?err, "job cycle failed");
        }
        Err(_) => {
            cancel.cancel();
            warn!(
                job = name,
                timeout_secs = job_timeout.as_secs(),
                "job cycle timed out, cancelling remote calls"
            );
        }
    }
}

impl Drop for AutomationScheduler {
    fn drop(&mut self) {
        if self.running {
            warn!("AutomationScheduler dropped while running; cancelling in-flight jobs");
            self.shutdown.cancel();
        }
    }
}
