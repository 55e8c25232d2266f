//! Shipments and their departure lock.
//!
//! A booked shipment stays editable until a configured time after its
//! estimated departure. The scheduled lock pass then freezes it; operations
//! staff can unlock it again, which re-arms the lock from that moment.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
