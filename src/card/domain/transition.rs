//! Records of accepted card transitions and the actors behind them.

use super::{AssigneeId, CardId, CardStatus, CardTrigger};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Originator of a card transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Actor {
    /// The scheduled escalation job.
    System,
    /// An operations user.
    User(AssigneeId),
}

impl Actor {
    /// Returns `true` for the scheduler.
    #[must_use]
    pub const fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => f.write_str("system"),
            Self::User(id) => write!(f, "user:{id}"),
        }
    }
}

/// One accepted move through the transition table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTransition {
    /// Card that moved.
    pub card_id: CardId,
    /// Revision the card reached through this transition.
    pub revision: u64,
    /// Status before the transition.
    pub from: CardStatus,
    /// Trigger that fired.
    pub trigger: CardTrigger,
    /// Status after the transition.
    pub to: CardStatus,
    /// Who fired the trigger.
    pub actor: Actor,
    /// Assignee before the transition.
    pub assignee_before: AssigneeId,
    /// Assignee after the transition.
    pub assignee_after: AssigneeId,
    /// Escalation level before the transition.
    pub level_before: usize,
    /// Escalation level after the transition.
    pub level_after: usize,
    /// Clock time of the transition.
    pub occurred_at: DateTime<Utc>,
}

impl CardTransition {
    /// Returns `true` when the transition moved the card up its chain.
    #[must_use]
    pub const fn escalated(&self) -> bool {
        self.level_after > self.level_before
    }

    /// Returns `true` when the responsible assignee changed.
    #[must_use]
    pub fn changed_assignee(&self) -> bool {
        self.assignee_before != self.assignee_after
    }
}
