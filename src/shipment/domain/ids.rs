//! Identifier and reference types for shipments.

use super::ShipmentDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const MIN_REFERENCE_LENGTH: usize = 3;
const MAX_REFERENCE_LENGTH: usize = 40;

/// Internal shipment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipmentId(Uuid);

impl ShipmentId {
    /// Generates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ShipmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ShipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Human-facing shipment reference such as `SHP-2026-0042`.
///
/// The input is trimmed and upper-cased. Only `[A-Z0-9-]` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShipmentReference(String);

impl ShipmentReference {
    /// Creates a validated reference.
    ///
    /// # Errors
    ///
    /// Returns [`ShipmentDomainError::EmptyReference`],
    /// [`ShipmentDomainError::ReferenceLength`] or
    /// [`ShipmentDomainError::InvalidReference`] for malformed input.
    pub fn new(value: impl Into<String>) -> Result<Self, ShipmentDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_uppercase();

        if normalized.is_empty() {
            return Err(ShipmentDomainError::EmptyReference);
        }
        let length = normalized.chars().count();
        if !(MIN_REFERENCE_LENGTH..=MAX_REFERENCE_LENGTH).contains(&length) {
            return Err(ShipmentDomainError::ReferenceLength(raw));
        }
        let is_valid = normalized
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-');
        if !is_valid {
            return Err(ShipmentDomainError::InvalidReference(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ShipmentReference {
    type Error = ShipmentDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShipmentReference> for String {
    fn from(value: ShipmentReference) -> Self {
        value.0
    }
}

impl fmt::Display for ShipmentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
