//! Periodic batch jobs and the loop that drives them.
//!
//! Each job wraps one service batch operation behind [`ScheduledJob`].
//! [`JobRunner`] fires a job on a fixed interval until shutdown is
//! signalled, logging every outcome and carrying on after failures.

mod card_tick;
mod runner;
mod shipment_lock;

pub use card_tick::CardTickJob;
pub use runner::{JobRunSummary, JobRunner};
pub use shipment_lock::ShipmentLockJob;

use crate::card::services::{CardServiceError, TickReport};
use crate::shipment::services::{LockReport, ShipmentServiceError};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Summary of one job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Result of an escalation tick.
    CardTick(TickReport),
    /// Result of a shipment lock pass.
    ShipmentLock(LockReport),
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CardTick(report) => report.fmt(f),
            Self::ShipmentLock(report) => report.fmt(f),
        }
    }
}

/// Errors raised by a job run.
#[derive(Debug, Error)]
pub enum JobError {
    /// The card service failed.
    #[error("card tick failed: {0}")]
    Card(#[from] CardServiceError),
    /// The shipment service failed.
    #[error("shipment lock failed: {0}")]
    Shipment(#[from] ShipmentServiceError),
}

/// Batch operation run on a schedule.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Returns the job name used in logs.
    fn name(&self) -> &'static str;

    /// Runs one batch.
    ///
    /// # Errors
    ///
    /// Returns [`JobError`] when the batch could not run at all.
    async fn run_once(&self) -> Result<JobOutcome, JobError>;
}

#[cfg(test)]
mod tests;
