//! Scheduled escalation tick over due cards.

use super::{JobError, JobOutcome, ScheduledJob};
use crate::card::{
    ports::{CardNotifier, CardRepository},
    services::CardService,
};
use async_trait::async_trait;
use mockable::Clock;

/// Fires due card deadlines in batches.
pub struct CardTickJob<R, N, C>
where
    R: CardRepository,
    N: CardNotifier,
    C: Clock + Send + Sync,
{
    service: CardService<R, N, C>,
    batch_size: usize,
}

impl<R, N, C> CardTickJob<R, N, C>
where
    R: CardRepository,
    N: CardNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a job ticking at most `batch_size` cards per run.
    #[must_use]
    pub const fn new(service: CardService<R, N, C>, batch_size: usize) -> Self {
        Self {
            service,
            batch_size,
        }
    }
}

#[async_trait]
impl<R, N, C> ScheduledJob for CardTickJob<R, N, C>
where
    R: CardRepository,
    N: CardNotifier,
    C: Clock + Send + Sync,
{
    fn name(&self) -> &'static str {
        "card_tick"
    }

    async fn run_once(&self) -> Result<JobOutcome, JobError> {
        let report = self.service.tick(self.batch_size).await?;
        Ok(JobOutcome::CardTick(report))
    }
}
