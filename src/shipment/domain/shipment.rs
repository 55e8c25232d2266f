//! Shipment aggregate and its edit lock.

use super::{
    LockPolicy, ShipmentDomainError, ShipmentId, ShipmentReference, ShipmentStatus, TransportMode,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Booked shipment that becomes read-only once its lock time passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    id: ShipmentId,
    reference: ShipmentReference,
    mode: TransportMode,
    etd: DateTime<Utc>,
    status: ShipmentStatus,
    lock_at: DateTime<Utc>,
    locked_at: Option<DateTime<Utc>>,
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted shipment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedShipmentData {
    /// Persisted identifier.
    pub id: ShipmentId,
    /// Persisted reference.
    pub reference: ShipmentReference,
    /// Persisted transport mode.
    pub mode: TransportMode,
    /// Persisted estimated departure.
    pub etd: DateTime<Utc>,
    /// Persisted status.
    pub status: ShipmentStatus,
    /// Persisted lock time.
    pub lock_at: DateTime<Utc>,
    /// Persisted lock timestamp.
    pub locked_at: Option<DateTime<Utc>>,
    /// Persisted revision.
    pub revision: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Shipment {
    /// Books a shipment departing at `etd`.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentDomainError::LockTimeOutOfRange`] when the lock
    /// time overflows.
    pub fn book(
        reference: ShipmentReference,
        mode: TransportMode,
        etd: DateTime<Utc>,
        policy: LockPolicy,
        clock: &impl Clock,
    ) -> Result<Self, ShipmentDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: ShipmentId::new(),
            reference,
            mode,
            etd,
            status: ShipmentStatus::Open,
            lock_at: policy.lock_at(etd)?,
            locked_at: None,
            revision: 1,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a shipment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedShipmentData) -> Self {
        Self {
            id: data.id,
            reference: data.reference,
            mode: data.mode,
            etd: data.etd,
            status: data.status,
            lock_at: data.lock_at,
            locked_at: data.locked_at,
            revision: data.revision,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the shipment identifier.
    #[must_use]
    pub const fn id(&self) -> ShipmentId {
        self.id
    }

    /// Returns the shipment reference.
    #[must_use]
    pub const fn reference(&self) -> &ShipmentReference {
        &self.reference
    }

    /// Returns the transport mode.
    #[must_use]
    pub const fn mode(&self) -> TransportMode {
        self.mode
    }

    /// Returns the estimated time of departure.
    #[must_use]
    pub const fn etd(&self) -> DateTime<Utc> {
        self.etd
    }

    /// Returns the shipment status.
    #[must_use]
    pub const fn status(&self) -> ShipmentStatus {
        self.status
    }

    /// Returns when the shipment locks.
    #[must_use]
    pub const fn lock_at(&self) -> DateTime<Utc> {
        self.lock_at
    }

    /// Returns when the shipment was locked.
    #[must_use]
    pub const fn locked_at(&self) -> Option<DateTime<Utc>> {
        self.locked_at
    }

    /// Returns the revision, bumped by every change.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when the shipment is open and its lock time passed.
    #[must_use]
    pub fn is_lock_due(&self, now: DateTime<Utc>) -> bool {
        self.status == ShipmentStatus::Open && now >= self.lock_at
    }

    /// Locks the shipment against edits.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentDomainError::AlreadyLocked`] or
    /// [`ShipmentDomainError::Cancelled`] when the shipment is not open.
    pub fn lock(&mut self, clock: &impl Clock) -> Result<(), ShipmentDomainError> {
        match self.status {
            ShipmentStatus::Open => {}
            ShipmentStatus::Locked => return Err(ShipmentDomainError::AlreadyLocked(self.id)),
            ShipmentStatus::Cancelled => return Err(ShipmentDomainError::Cancelled(self.id)),
        }
        let now = clock.utc();
        self.status = ShipmentStatus::Locked;
        self.locked_at = Some(now);
        self.touch(now);
        Ok(())
    }

    /// Moves the departure and the lock time with it.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentDomainError::ShipmentLocked`] or
    /// [`ShipmentDomainError::Cancelled`] when the shipment is not open,
    /// and [`ShipmentDomainError::LockTimeOutOfRange`] on overflow.
    pub fn reschedule(
        &mut self,
        etd: DateTime<Utc>,
        policy: LockPolicy,
        clock: &impl Clock,
    ) -> Result<(), ShipmentDomainError> {
        self.ensure_open()?;
        let lock_at = policy.lock_at(etd)?;
        self.etd = etd;
        self.lock_at = lock_at;
        self.touch(clock.utc());
        Ok(())
    }

    /// Reopens a locked shipment, re-arming the lock from the clock's time.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentDomainError::NotLocked`] unless the shipment is
    /// locked, and [`ShipmentDomainError::LockTimeOutOfRange`] on overflow.
    pub fn unlock(&mut self, policy: LockPolicy, clock: &impl Clock) -> Result<(), ShipmentDomainError> {
        if self.status != ShipmentStatus::Locked {
            return Err(ShipmentDomainError::NotLocked {
                id: self.id,
                status: self.status,
            });
        }
        let now = clock.utc();
        let lock_at = policy.lock_at(now)?;
        self.status = ShipmentStatus::Open;
        self.lock_at = lock_at;
        self.locked_at = None;
        self.touch(now);
        Ok(())
    }

    /// Cancels the shipment.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentDomainError::Cancelled`] when already cancelled.
    pub fn cancel(&mut self, clock: &impl Clock) -> Result<(), ShipmentDomainError> {
        if self.status == ShipmentStatus::Cancelled {
            return Err(ShipmentDomainError::Cancelled(self.id));
        }
        self.status = ShipmentStatus::Cancelled;
        self.touch(clock.utc());
        Ok(())
    }

    const fn ensure_open(&self) -> Result<(), ShipmentDomainError> {
        match self.status {
            ShipmentStatus::Open => Ok(()),
            ShipmentStatus::Locked => Err(ShipmentDomainError::ShipmentLocked(self.id)),
            ShipmentStatus::Cancelled => Err(ShipmentDomainError::Cancelled(self.id)),
        }
    }

    const fn touch(&mut self, now: DateTime<Utc>) {
        self.revision += 1;
        self.updated_at = now;
    }
}
