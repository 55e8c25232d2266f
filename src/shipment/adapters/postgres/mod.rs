//! `PostgreSQL` adapters for shipment persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresShipmentRepository, ShipmentPgPool};
