//! Lock timing relative to departure.

use super::ShipmentDomainError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// How long after ETD a shipment stays editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockPolicy {
    lock_after_secs: i64,
}

impl LockPolicy {
    /// Creates a policy locking `lock_after` past ETD.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentDomainError::NonPositiveLockAfter`] for zero or
    /// negative offsets.
    pub fn new(lock_after: TimeDelta) -> Result<Self, ShipmentDomainError> {
        Self::from_secs(lock_after.num_seconds())
    }

    /// Creates a policy from whole hours.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentDomainError::NonPositiveLockAfter`] for zero.
    pub fn from_hours(hours: u32) -> Result<Self, ShipmentDomainError> {
        Self::from_secs(i64::from(hours).saturating_mul(3600))
    }

    /// Creates a policy from seconds, as stored.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentDomainError::NonPositiveLockAfter`] for zero or
    /// negative values.
    pub const fn from_secs(lock_after_secs: i64) -> Result<Self, ShipmentDomainError> {
        if lock_after_secs <= 0 {
            return Err(ShipmentDomainError::NonPositiveLockAfter);
        }
        Ok(Self { lock_after_secs })
    }

    /// Returns the lock offset in seconds.
    #[must_use]
    pub const fn lock_after_secs(&self) -> i64 {
        self.lock_after_secs
    }

    /// Returns when a shipment anchored at `anchor` locks.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentDomainError::LockTimeOutOfRange`] on overflow.
    pub fn lock_at(&self, anchor: DateTime<Utc>) -> Result<DateTime<Utc>, ShipmentDomainError> {
        TimeDelta::try_seconds(self.lock_after_secs)
            .and_then(|offset| anchor.checked_add_signed(offset))
            .ok_or(ShipmentDomainError::LockTimeOutOfRange)
    }
}
