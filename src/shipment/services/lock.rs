//! Service layer for shipment booking and the departure lock.

use crate::shipment::{
    domain::{
        LockPolicy, ParseTransportModeError, Shipment, ShipmentDomainError, ShipmentReference,
        TransportMode,
    },
    ports::{ShipmentRepository, ShipmentRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Request payload for booking a shipment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookShipmentRequest {
    reference: String,
    mode: String,
    etd: DateTime<Utc>,
}

impl BookShipmentRequest {
    /// Creates a booking request.
    #[must_use]
    pub fn new(reference: impl Into<String>, mode: impl Into<String>, etd: DateTime<Utc>) -> Self {
        Self {
            reference: reference.into(),
            mode: mode.into(),
            etd,
        }
    }
}

/// Service-level errors for shipment operations.
#[derive(Debug, Error)]
pub enum ShipmentServiceError {
    /// Domain validation or lock rules rejected the operation.
    #[error(transparent)]
    Domain(#[from] ShipmentDomainError),
    /// The transport mode is not recognised.
    #[error(transparent)]
    TransportMode(#[from] ParseTransportModeError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ShipmentRepositoryError),
    /// No shipment exists with the given reference.
    #[error("shipment {0} not found")]
    NotFound(ShipmentReference),
}

/// Result type for shipment service operations.
pub type ShipmentServiceResult<T> = Result<T, ShipmentServiceError>;

/// Outcome counters of one lock pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockReport {
    /// Shipments returned by the due query.
    pub examined: usize,
    /// Shipments locked.
    pub locked: usize,
    /// Shipments changed by another writer in the meantime.
    pub skipped: usize,
    /// Shipments whose lock failed.
    pub failed: usize,
}

impl fmt::Display for LockReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "examined={} locked={} skipped={} failed={}",
            self.examined, self.locked, self.skipped, self.failed
        )
    }
}

/// Shipment booking and lock orchestration service.
pub struct ShipmentService<R, C>
where
    R: ShipmentRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    policy: LockPolicy,
}

impl<R, C> Clone for ShipmentService<R, C>
where
    R: ShipmentRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            policy: self.policy,
        }
    }
}

impl<R, C> ShipmentService<R, C>
where
    R: ShipmentRepository,
    C: Clock + Send + Sync,
{
    /// Creates a shipment service locking shipments per `policy`.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>, policy: LockPolicy) -> Self {
        Self {
            repository,
            clock,
            policy,
        }
    }

    /// Books a shipment.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentServiceError`] when validation fails or the
    /// reference is already booked.
    #[instrument(skip_all, fields(reference = %request.reference))]
    pub async fn book(&self, request: BookShipmentRequest) -> ShipmentServiceResult<Shipment> {
        let BookShipmentRequest {
            reference,
            mode,
            etd,
        } = request;
        let shipment_ref = ShipmentReference::new(reference)?;
        let transport_mode = TransportMode::try_from(mode.as_str())?;
        let shipment = Shipment::book(shipment_ref, transport_mode, etd, self.policy, &*self.clock)?;
        self.repository.store(&shipment).await?;
        info!(
            shipment_id = %shipment.id(),
            lock_at = %shipment.lock_at(),
            "shipment booked"
        );
        Ok(shipment)
    }

    /// Finds a shipment by reference.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentServiceError::Domain`] for a malformed reference or
    /// [`ShipmentServiceError::Repository`] when lookup fails.
    pub async fn find_by_reference(&self, reference: &str) -> ShipmentServiceResult<Option<Shipment>> {
        let shipment_ref = ShipmentReference::new(reference)?;
        Ok(self.repository.find_by_reference(&shipment_ref).await?)
    }

    /// Moves a shipment's departure.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentServiceError::NotFound`] for unknown references and
    /// [`ShipmentServiceError::Domain`] when the shipment is not open.
    #[instrument(skip(self))]
    pub async fn reschedule(
        &self,
        reference: &str,
        etd: DateTime<Utc>,
    ) -> ShipmentServiceResult<Shipment> {
        let mut shipment = self.find_or_error(reference).await?;
        shipment.reschedule(etd, self.policy, &*self.clock)?;
        self.repository.update(&shipment).await?;
        info!(shipment_id = %shipment.id(), lock_at = %shipment.lock_at(), "shipment rescheduled");
        Ok(shipment)
    }

    /// Reopens a locked shipment for edits.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentServiceError::NotFound`] for unknown references and
    /// [`ShipmentServiceError::Domain`] when the shipment is not locked.
    #[instrument(skip(self))]
    pub async fn unlock(&self, reference: &str) -> ShipmentServiceResult<Shipment> {
        let mut shipment = self.find_or_error(reference).await?;
        shipment.unlock(self.policy, &*self.clock)?;
        self.repository.update(&shipment).await?;
        info!(shipment_id = %shipment.id(), lock_at = %shipment.lock_at(), "shipment unlocked");
        Ok(shipment)
    }

    /// Cancels a shipment.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentServiceError::NotFound`] for unknown references and
    /// [`ShipmentServiceError::Domain`] when already cancelled.
    #[instrument(skip(self))]
    pub async fn cancel(&self, reference: &str) -> ShipmentServiceResult<Shipment> {
        let mut shipment = self.find_or_error(reference).await?;
        shipment.cancel(&*self.clock)?;
        self.repository.update(&shipment).await?;
        info!(shipment_id = %shipment.id(), "shipment cancelled");
        Ok(shipment)
    }

    /// Locks up to `limit` shipments whose lock time has passed.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentServiceError::Repository`] only when the due query
    /// itself fails.
    #[instrument(skip(self))]
    pub async fn lock_due(&self, limit: usize) -> ShipmentServiceResult<LockReport> {
        let now = self.clock.utc();
        let due = self.repository.list_lock_due(now, limit).await?;
        let mut report = LockReport::default();

        for mut shipment in due {
            report.examined += 1;
            if !shipment.is_lock_due(now) {
                report.skipped += 1;
                continue;
            }
            let shipment_id = shipment.id();
            let outcome = match shipment.lock(&*self.clock) {
                Ok(()) => self.repository.update(&shipment).await.map_err(ShipmentServiceError::from),
                Err(err) => Err(err.into()),
            };
            match outcome {
                Ok(()) => {
                    info!(%shipment_id, reference = %shipment.reference(), "shipment locked");
                    report.locked += 1;
                }
                Err(ShipmentServiceError::Repository(
                    ShipmentRepositoryError::RevisionConflict { .. },
                )) => {
                    debug!(%shipment_id, "shipment changed by another writer");
                    report.skipped += 1;
                }
                Err(err) => {
                    warn!(%shipment_id, error = %err, "shipment lock failed");
                    report.failed += 1;
                }
            }
        }

        info!(%report, "shipment lock pass finished");
        Ok(report)
    }

    async fn find_or_error(&self, reference: &str) -> ShipmentServiceResult<Shipment> {
        let shipment_ref = ShipmentReference::new(reference)?;
        self.repository
            .find_by_reference(&shipment_ref)
            .await?
            .ok_or(ShipmentServiceError::NotFound(shipment_ref))
    }
}
