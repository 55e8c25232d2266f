//! Identifier and validated scalar types for the card domain.

use super::CardDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a task card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(Uuid);

impl CardId {
    /// Creates a new random card identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a card identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for CardId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized handle of an operations user who can own a card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssigneeId(String);

impl AssigneeId {
    /// Longest handle accepted by the `cards` schema.
    const MAX_LENGTH: usize = 255;

    /// Creates a validated assignee handle.
    ///
    /// The handle is trimmed and lower-cased.
    ///
    /// # Errors
    ///
    /// Returns [`CardDomainError::EmptyAssignee`] for blank input,
    /// [`CardDomainError::AssigneeTooLong`] past 255 characters, and
    /// [`CardDomainError::InvalidAssignee`] for characters outside
    /// `[a-z0-9._@-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, CardDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(CardDomainError::EmptyAssignee);
        }
        if normalized.chars().count() > Self::MAX_LENGTH {
            return Err(CardDomainError::AssigneeTooLong(raw));
        }
        let is_valid = normalized
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-' | '@'));
        if !is_valid {
            return Err(CardDomainError::InvalidAssignee(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the handle as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AssigneeId {
    type Error = CardDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssigneeId> for String {
    fn from(value: AssigneeId) -> Self {
        value.0
    }
}

impl AsRef<str> for AssigneeId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AssigneeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
