//! Card statuses, triggers, and the transition table that joins them.

use super::{ParseCardStatusError, ParseCardTriggerError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Card lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    /// The card is assigned and within its deadlines.
    Created,
    /// The warning deadline has passed.
    Warning,
    /// The breach deadline has passed.
    Breached,
    /// The work was completed.
    Completed,
    /// The card was withdrawn.
    Deleted,
}

impl CardStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Created,
        Self::Warning,
        Self::Breached,
        Self::Completed,
        Self::Deleted,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Warning => "warning",
            Self::Breached => "breached",
            Self::Completed => "completed",
            Self::Deleted => "deleted",
        }
    }

    /// Returns `true` for statuses that accept no further transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Deleted)
    }

    /// Looks up the status reached by firing `trigger` from this status.
    #[must_use]
    pub fn next(self, trigger: CardTrigger) -> Option<Self> {
        TRANSITIONS
            .iter()
            .find(|(from, fired, _)| *from == self && *fired == trigger)
            .map(|(_, _, to)| *to)
    }

    /// Returns `true` when the table allows `trigger` from this status.
    #[must_use]
    pub fn can_fire(self, trigger: CardTrigger) -> bool {
        self.next(trigger).is_some()
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CardStatus {
    type Error = ParseCardStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "created" => Ok(Self::Created),
            "warning" => Ok(Self::Warning),
            "breached" => Ok(Self::Breached),
            "completed" => Ok(Self::Completed),
            "deleted" => Ok(Self::Deleted),
            _ => Err(ParseCardStatusError(value.to_owned())),
        }
    }
}

/// Event that may move a card between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardTrigger {
    /// The warning deadline passed.
    WarningDeadlinePassed,
    /// The breach deadline passed.
    BreachDeadlinePassed,
    /// The re-escalation deadline of a breached card passed.
    EscalationDeadlinePassed,
    /// The card was handed to another assignee.
    Reassign,
    /// The work was completed.
    Complete,
    /// The card was withdrawn.
    Delete,
}

impl CardTrigger {
    /// Every trigger.
    pub const ALL: [Self; 6] = [
        Self::WarningDeadlinePassed,
        Self::BreachDeadlinePassed,
        Self::EscalationDeadlinePassed,
        Self::Reassign,
        Self::Complete,
        Self::Delete,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WarningDeadlinePassed => "warning_deadline_passed",
            Self::BreachDeadlinePassed => "breach_deadline_passed",
            Self::EscalationDeadlinePassed => "escalation_deadline_passed",
            Self::Reassign => "reassign",
            Self::Complete => "complete",
            Self::Delete => "delete",
        }
    }

    /// Returns `true` for triggers fired by the clock rather than a user.
    #[must_use]
    pub const fn is_time_driven(self) -> bool {
        matches!(
            self,
            Self::WarningDeadlinePassed | Self::BreachDeadlinePassed | Self::EscalationDeadlinePassed
        )
    }
}

impl fmt::Display for CardTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CardTrigger {
    type Error = ParseCardTriggerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|trigger| trigger.as_str() == normalized)
            .ok_or_else(|| ParseCardTriggerError(value.to_owned()))
    }
}

/// Every permitted `(from, trigger, to)` move. Pairs absent from the
/// table are rejected.
pub const TRANSITIONS: [(CardStatus, CardTrigger, CardStatus); 13] = [
    (
        CardStatus::Created,
        CardTrigger::WarningDeadlinePassed,
        CardStatus::Warning,
    ),
    (
        CardStatus::Created,
        CardTrigger::BreachDeadlinePassed,
        CardStatus::Breached,
    ),
    (
        CardStatus::Warning,
        CardTrigger::BreachDeadlinePassed,
        CardStatus::Breached,
    ),
    (
        CardStatus::Breached,
        CardTrigger::EscalationDeadlinePassed,
        CardStatus::Breached,
    ),
    (CardStatus::Created, CardTrigger::Reassign, CardStatus::Created),
    (CardStatus::Warning, CardTrigger::Reassign, CardStatus::Created),
    (CardStatus::Breached, CardTrigger::Reassign, CardStatus::Created),
    (CardStatus::Created, CardTrigger::Complete, CardStatus::Completed),
    (CardStatus::Warning, CardTrigger::Complete, CardStatus::Completed),
    (CardStatus::Breached, CardTrigger::Complete, CardStatus::Completed),
    (CardStatus::Created, CardTrigger::Delete, CardStatus::Deleted),
    (CardStatus::Warning, CardTrigger::Delete, CardStatus::Deleted),
    (CardStatus::Breached, CardTrigger::Delete, CardStatus::Deleted),
];
