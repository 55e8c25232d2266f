//! In-memory adapters for the shipment context.

mod repository;

pub use repository::InMemoryShipmentRepository;
