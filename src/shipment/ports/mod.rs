//! Port contracts for the shipment context.

pub mod repository;

pub use repository::{ShipmentRepository, ShipmentRepositoryError, ShipmentRepositoryResult};
