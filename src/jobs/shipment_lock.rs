//! Scheduled lock pass over departed shipments.

use super::{JobError, JobOutcome, ScheduledJob};
use crate::shipment::{ports::ShipmentRepository, services::ShipmentService};
use async_trait::async_trait;
use mockable::Clock;

/// Locks shipments whose lock time has passed.
pub struct ShipmentLockJob<R, C>
where
    R: ShipmentRepository,
    C: Clock + Send + Sync,
{
    service: ShipmentService<R, C>,
    batch_size: usize,
}

impl<R, C> ShipmentLockJob<R, C>
where
    R: ShipmentRepository,
    C: Clock + Send + Sync,
{
    /// Creates a job locking at most `batch_size` shipments per run.
    #[must_use]
    pub const fn new(service: ShipmentService<R, C>, batch_size: usize) -> Self {
        Self {
            service,
            batch_size,
        }
    }
}

#[async_trait]
impl<R, C> ScheduledJob for ShipmentLockJob<R, C>
where
    R: ShipmentRepository,
    C: Clock + Send + Sync,
{
    fn name(&self) -> &'static str {
        "shipment_lock"
    }

    async fn run_once(&self) -> Result<JobOutcome, JobError> {
        let report = self.service.lock_due(self.batch_size).await?;
        Ok(JobOutcome::ShipmentLock(report))
    }
}
