//! Shared world state for shipment lock BDD scenarios.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use freightdesk::clock::ManualClock;
use freightdesk::shipment::{
    adapters::memory::InMemoryShipmentRepository,
    domain::{LockPolicy, Shipment},
    services::{LockReport, ShipmentService, ShipmentServiceError},
};
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestShipmentService = ShipmentService<InMemoryShipmentRepository, ManualClock>;

/// Scenario world for shipment lock behaviour tests.
pub struct ShipmentLockWorld {
    pub service: TestShipmentService,
    pub clock: ManualClock,
    pub start: DateTime<Utc>,
    pub shipment: Option<Shipment>,
    pub last_pass: Option<LockReport>,
    pub last_edit_result: Option<Result<Shipment, ShipmentServiceError>>,
}

impl ShipmentLockWorld {
    /// Creates a world locking shipments 48 hours after departure.
    ///
    /// # Panics
    ///
    /// Panics if the fixed start time or policy is invalid.
    #[must_use]
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 6, 1, 9, 0, 0)
            .single()
            .expect("valid start timestamp");
        let clock = ManualClock::new(start);
        let service = ShipmentService::new(
            Arc::new(InMemoryShipmentRepository::new()),
            Arc::new(clock.clone()),
            LockPolicy::from_hours(48).expect("valid lock policy"),
        );

        Self {
            service,
            clock,
            start,
            shipment: None,
            last_pass: None,
            last_edit_result: None,
        }
    }

    /// Returns the shipment under test.
    ///
    /// # Errors
    ///
    /// Returns an error when no shipment has been booked yet.
    pub fn shipment(&self) -> Result<&Shipment, eyre::Report> {
        self.shipment
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing shipment in scenario world"))
    }

    /// Returns the reference of the shipment under test.
    ///
    /// # Errors
    ///
    /// Returns an error when no shipment has been booked yet.
    pub fn reference(&self) -> Result<String, eyre::Report> {
        Ok(self.shipment()?.reference().as_str().to_owned())
    }
}

impl Default for ShipmentLockWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ShipmentLockWorld {
    ShipmentLockWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
