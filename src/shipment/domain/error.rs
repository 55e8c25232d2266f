//! Error types for shipment validation and lock transitions.

use super::{ShipmentId, ShipmentStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating shipment domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShipmentDomainError {
    /// The shipment reference is empty after trimming.
    #[error("shipment reference must not be empty")]
    EmptyReference,

    /// The shipment reference contains unsupported characters.
    #[error("invalid shipment reference '{0}', expected letters, digits or '-'")]
    InvalidReference(String),

    /// The shipment reference is shorter or longer than allowed.
    #[error("shipment reference '{0}' must be 3 to 40 characters long")]
    ReferenceLength(String),

    /// The lock offset is zero or negative.
    #[error("lock_after must be positive")]
    NonPositiveLockAfter,

    /// The computed lock time does not fit the timestamp range.
    #[error("lock time is out of range")]
    LockTimeOutOfRange,

    /// The shipment is already locked.
    #[error("shipment {0} is already locked")]
    AlreadyLocked(ShipmentId),

    /// The shipment is locked and rejects edits.
    #[error("shipment {0} is locked")]
    ShipmentLocked(ShipmentId),

    /// The shipment was cancelled.
    #[error("shipment {0} is cancelled")]
    Cancelled(ShipmentId),

    /// Only locked shipments can be unlocked.
    #[error("shipment {id} cannot be unlocked from {status}")]
    NotLocked {
        /// Shipment identifier.
        id: ShipmentId,
        /// Status the shipment is in.
        status: ShipmentStatus,
    },
}

/// Error returned when parsing an unknown transport mode.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown transport mode: {0}")]
pub struct ParseTransportModeError(pub String);

/// Error returned when parsing an unknown shipment status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown shipment status: {0}")]
pub struct ParseShipmentStatusError(pub String);
