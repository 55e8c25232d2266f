//! Repository port for shipment persistence and lock scheduling.

use crate::shipment::domain::{Shipment, ShipmentId, ShipmentReference};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for shipment repository operations.
pub type ShipmentRepositoryResult<T> = Result<T, ShipmentRepositoryError>;

/// Shipment persistence contract.
#[async_trait]
pub trait ShipmentRepository: Send + Sync {
    /// Stores a newly booked shipment.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentRepositoryError::DuplicateShipment`] when the
    /// identifier exists or [`ShipmentRepositoryError::DuplicateReference`]
    /// when the reference is taken.
    async fn store(&self, shipment: &Shipment) -> ShipmentRepositoryResult<()>;

    /// Replaces the stored shipment with `shipment`.
    ///
    /// The stored revision must be exactly one below the shipment's.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentRepositoryError::NotFound`] for unknown shipments
    /// and [`ShipmentRepositoryError::RevisionConflict`] when another writer
    /// updated it first.
    async fn update(&self, shipment: &Shipment) -> ShipmentRepositoryResult<()>;

    /// Finds a shipment by identifier.
    async fn find_by_id(&self, id: ShipmentId) -> ShipmentRepositoryResult<Option<Shipment>>;

    /// Finds a shipment by reference.
    async fn find_by_reference(
        &self,
        reference: &ShipmentReference,
    ) -> ShipmentRepositoryResult<Option<Shipment>>;

    /// Returns up to `limit` open shipments whose lock time is at or before
    /// `now`, earliest lock time first.
    async fn list_lock_due(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> ShipmentRepositoryResult<Vec<Shipment>>;
}

/// Errors returned by shipment repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ShipmentRepositoryError {
    /// A shipment with the same identifier already exists.
    #[error("duplicate shipment identifier: {0}")]
    DuplicateShipment(ShipmentId),

    /// A shipment with the same reference already exists.
    #[error("duplicate shipment reference: {0}")]
    DuplicateReference(ShipmentReference),

    /// The shipment was not found.
    #[error("shipment not found: {0}")]
    NotFound(ShipmentId),

    /// The stored shipment moved on since it was loaded.
    #[error("shipment {id} revision conflict: expected {expected}, found {found}")]
    RevisionConflict {
        /// Shipment identifier.
        id: ShipmentId,
        /// Revision the writer expected to replace.
        expected: u64,
        /// Revision actually stored.
        found: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ShipmentRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
