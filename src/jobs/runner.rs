//! Interval loop for scheduled jobs.

use super::ScheduledJob;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument};

/// Shortest period accepted by [`tokio::time::interval`].
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Counts of one runner lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobRunSummary {
    /// Runs that completed.
    pub succeeded: usize,
    /// Runs that returned an error.
    pub failed: usize,
}

/// Drives a [`ScheduledJob`] until shutdown is signalled.
///
/// The first run starts immediately. Ticks missed while a run is still in
/// progress are skipped rather than replayed in a burst.
#[derive(Debug, Clone)]
pub struct JobRunner {
    shutdown: watch::Receiver<bool>,
}

impl JobRunner {
    /// Creates a runner that stops once `shutdown` holds `true` or its
    /// sender is dropped.
    #[must_use]
    pub const fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self { shutdown }
    }

    /// Runs `job` every `period` until shutdown.
    #[instrument(skip_all, fields(job = job.name(), period_ms = period.as_millis()))]
    pub async fn run<J>(&self, job: &J, period: Duration) -> JobRunSummary
    where
        J: ScheduledJob + ?Sized,
    {
        let mut shutdown = self.shutdown.clone();
        let mut interval = tokio::time::interval(period.max(MIN_PERIOD));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut summary = JobRunSummary::default();

        info!("job runner started");
        loop {
            if *shutdown.borrow_and_update() {
                break;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        debug!("shutdown sender dropped");
                        break;
                    }
                }
                _ = interval.tick() => {
                    match job.run_once().await {
                        Ok(outcome) => {
                            summary.succeeded += 1;
                            info!(%outcome, "job run finished");
                        }
                        Err(err) => {
                            summary.failed += 1;
                            error!(error = %err, "job run failed");
                        }
                    }
                }
            }
        }
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "job runner stopped"
        );
        summary
    }
}
