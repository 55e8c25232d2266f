//! In-memory shipment repository for tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::shipment::{
    domain::{Shipment, ShipmentId, ShipmentReference},
    ports::{ShipmentRepository, ShipmentRepositoryError, ShipmentRepositoryResult},
};

/// Thread-safe in-memory shipment repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShipmentRepository {
    state: Arc<RwLock<InMemoryShipmentState>>,
}

#[derive(Debug, Default)]
struct InMemoryShipmentState {
    shipments: HashMap<ShipmentId, Shipment>,
    reference_index: HashMap<ShipmentReference, ShipmentId>,
}

impl InMemoryShipmentRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ShipmentRepositoryResult<RwLockReadGuard<'_, InMemoryShipmentState>> {
        self.state.read().map_err(|err| {
            ShipmentRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> ShipmentRepositoryResult<RwLockWriteGuard<'_, InMemoryShipmentState>> {
        self.state.write().map_err(|err| {
            ShipmentRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl ShipmentRepository for InMemoryShipmentRepository {
    async fn store(&self, shipment: &Shipment) -> ShipmentRepositoryResult<()> {
        let mut state = self.write()?;
        if state.shipments.contains_key(&shipment.id()) {
            return Err(ShipmentRepositoryError::DuplicateShipment(shipment.id()));
        }
        if state.reference_index.contains_key(shipment.reference()) {
            return Err(ShipmentRepositoryError::DuplicateReference(
                shipment.reference().clone(),
            ));
        }
        state
            .reference_index
            .insert(shipment.reference().clone(), shipment.id());
        state.shipments.insert(shipment.id(), shipment.clone());
        Ok(())
    }

    async fn update(&self, shipment: &Shipment) -> ShipmentRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .shipments
            .get(&shipment.id())
            .map(Shipment::revision)
            .ok_or(ShipmentRepositoryError::NotFound(shipment.id()))?;
        let expected = shipment.revision().saturating_sub(1);
        if stored != expected {
            return Err(ShipmentRepositoryError::RevisionConflict {
                id: shipment.id(),
                expected,
                found: stored,
            });
        }
        state.shipments.insert(shipment.id(), shipment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ShipmentId) -> ShipmentRepositoryResult<Option<Shipment>> {
        let state = self.read()?;
        Ok(state.shipments.get(&id).cloned())
    }

    async fn find_by_reference(
        &self,
        reference: &ShipmentReference,
    ) -> ShipmentRepositoryResult<Option<Shipment>> {
        let state = self.read()?;
        Ok(state
            .reference_index
            .get(reference)
            .and_then(|id| state.shipments.get(id))
            .cloned())
    }

    async fn list_lock_due(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> ShipmentRepositoryResult<Vec<Shipment>> {
        let state = self.read()?;
        let mut due: Vec<Shipment> = state
            .shipments
            .values()
            .filter(|shipment| shipment.is_lock_due(now))
            .cloned()
            .collect();
        due.sort_by(|left, right| {
            left.lock_at()
                .cmp(&right.lock_at())
                .then_with(|| left.id().cmp(&right.id()))
        });
        due.truncate(limit);
        Ok(due)
    }
}
