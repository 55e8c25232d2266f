//! Domain model for shipments and their edit lock.

mod error;
mod ids;
mod policy;
mod shipment;
mod status;

pub use error::{ParseShipmentStatusError, ParseTransportModeError, ShipmentDomainError};
pub use ids::{ShipmentId, ShipmentReference};
pub use policy::LockPolicy;
pub use shipment::{PersistedShipmentData, Shipment};
pub use status::{ShipmentStatus, TransportMode};
