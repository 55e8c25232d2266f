//! Domain model for task cards and their escalation.
//!
//! A card follows up on one business record. It is owned by the first
//! assignee of its escalation chain, carries its deadlines as data, and
//! moves only along the entries of [`TRANSITIONS`]. Every accepted move
//! yields a [`CardTransition`] that is persisted as a [`CardAuditEntry`].

mod audit;
mod card;
mod chain;
mod error;
mod ids;
mod policy;
mod status;
mod subject;
mod transition;

pub use audit::CardAuditEntry;
pub use card::{Card, PersistedCardData};
pub use chain::EscalationChain;
pub use error::{
    CardDomainError, ParseCardStatusError, ParseCardTriggerError, ParseSubjectKindError,
};
pub use ids::{AssigneeId, CardId};
pub use policy::{CardDeadlines, EscalationPolicy};
pub use status::{CardStatus, CardTrigger, TRANSITIONS};
pub use subject::{CardSubject, CardTitle, SubjectKind};
pub use transition::{Actor, CardTransition};
