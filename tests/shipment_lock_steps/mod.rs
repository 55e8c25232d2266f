//! Step definitions for shipment lock scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
