//! Error types for card domain validation, parsing, and transitions.

use super::{AssigneeId, CardId, CardStatus, CardTrigger};
use thiserror::Error;

/// Errors returned while constructing or mutating card domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CardDomainError {
    /// The assignee handle is empty after trimming.
    #[error("assignee must not be empty")]
    EmptyAssignee,

    /// The assignee handle contains unsupported characters.
    #[error("invalid assignee '{0}', expected letters, digits, '.', '_', '-' or '@'")]
    InvalidAssignee(String),

    /// The assignee handle exceeds the storage limit.
    #[error("assignee exceeds 255 character limit: {0}")]
    AssigneeTooLong(String),

    /// The subject reference is empty after trimming.
    #[error("card subject reference must not be empty")]
    EmptySubjectReference,

    /// The card title is empty after trimming.
    #[error("card title must not be empty")]
    EmptyTitle,

    /// The card title exceeds the storage limit.
    #[error("card title is {0} characters long, limit is 200")]
    TitleTooLong(usize),

    /// The escalation chain has no members.
    #[error("escalation chain must contain at least one assignee")]
    EmptyEscalationChain,

    /// The escalation chain lists the same assignee twice.
    #[error("assignee {0} appears more than once in the escalation chain")]
    DuplicateChainMember(AssigneeId),

    /// A policy duration is zero or negative.
    #[error("escalation policy field '{0}' must be a positive duration")]
    NonPositiveDuration(&'static str),

    /// The warning threshold does not precede the breach threshold.
    #[error("warning threshold must be earlier than the breach threshold")]
    WarningNotBeforeBreach,

    /// A computed deadline does not fit the timestamp range.
    #[error("deadline is out of the representable timestamp range")]
    DeadlineOutOfRange,

    /// The transition table has no entry for the status and trigger.
    #[error("card {card_id} cannot fire '{trigger}' while '{from}'")]
    InvalidTransition {
        /// Card identifier.
        card_id: CardId,
        /// Status at the time of the attempt.
        from: CardStatus,
        /// Rejected trigger.
        trigger: CardTrigger,
    },

    /// A time-driven trigger was fired before its deadline.
    #[error("trigger '{trigger}' is not due for card {card_id}")]
    TriggerNotDue {
        /// Card identifier.
        card_id: CardId,
        /// Trigger that is not yet due.
        trigger: CardTrigger,
    },

    /// A time-driven trigger was fired by a user.
    #[error("trigger '{trigger}' on card {card_id} may only be fired by the scheduler")]
    SystemTriggerOnly {
        /// Card identifier.
        card_id: CardId,
        /// Time-driven trigger.
        trigger: CardTrigger,
    },

    /// A reassignment was requested through the generic trigger path.
    #[error("reassigning card {0} requires a target assignee")]
    AssigneeRequired(CardId),

    /// Reassignment targets the current assignee.
    #[error("card {card_id} is already assigned to {assignee}")]
    SameAssignee {
        /// Card identifier.
        card_id: CardId,
        /// Current assignee.
        assignee: AssigneeId,
    },

    /// Reassignment targets an assignee holding another chain level.
    #[error("assignee {assignee} already holds another escalation level on card {card_id}")]
    AssigneeAlreadyInChain {
        /// Card identifier.
        card_id: CardId,
        /// Conflicting assignee.
        assignee: AssigneeId,
    },

    /// The audit payload could not be encoded.
    #[error("failed to encode audit payload: {0}")]
    AuditEncoding(String),
}

/// Error returned while parsing card statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown card status: {0}")]
pub struct ParseCardStatusError(pub String);

/// Error returned while parsing card triggers from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown card trigger: {0}")]
pub struct ParseCardTriggerError(pub String);

/// Error returned while parsing subject kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown card subject kind: {0}")]
pub struct ParseSubjectKindError(pub String);
