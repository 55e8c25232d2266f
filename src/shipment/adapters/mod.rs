//! Adapter implementations for shipment ports.

pub mod memory;
pub mod postgres;
