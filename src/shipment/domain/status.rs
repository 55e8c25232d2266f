//! Transport mode and shipment status.

use super::{ParseShipmentStatusError, ParseTransportModeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the freight moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// Sea freight.
    Ocean,
    /// Air freight.
    Air,
    /// Trucking.
    Road,
    /// Rail freight.
    Rail,
}

impl TransportMode {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ocean => "ocean",
            Self::Air => "air",
            Self::Road => "road",
            Self::Rail => "rail",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransportMode {
    type Error = ParseTransportModeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "ocean" => Ok(Self::Ocean),
            "air" => Ok(Self::Air),
            "road" => Ok(Self::Road),
            "rail" => Ok(Self::Rail),
            _ => Err(ParseTransportModeError(value.to_owned())),
        }
    }
}

/// Edit state of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    /// Editable; the lock job closes it once `lock_at` passes.
    Open,
    /// Frozen for edits after departure.
    Locked,
    /// Withdrawn; final.
    Cancelled,
}

impl ShipmentStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Locked => "locked",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ShipmentStatus {
    type Error = ParseShipmentStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "locked" => Ok(Self::Locked),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseShipmentStatusError(value.to_owned())),
        }
    }
}
