//! Application services for shipment orchestration.

mod lock;

pub use lock::{
    BookShipmentRequest, LockReport, ShipmentService, ShipmentServiceError,
    ShipmentServiceResult,
};
