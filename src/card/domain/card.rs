//! Card aggregate root.

use super::{
    Actor, AssigneeId, CardDeadlines, CardDomainError, CardId, CardStatus, CardSubject,
    CardTitle, CardTransition, CardTrigger, EscalationChain, EscalationPolicy,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task card assigned to an operations user, driven through its
/// deadlines by the escalation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    subject: CardSubject,
    title: CardTitle,
    chain: EscalationChain,
    level: usize,
    status: CardStatus,
    policy: EscalationPolicy,
    deadlines: CardDeadlines,
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCardData {
    /// Persisted card identifier.
    pub id: CardId,
    /// Persisted subject reference.
    pub subject: CardSubject,
    /// Persisted title.
    pub title: CardTitle,
    /// Persisted escalation chain.
    pub chain: EscalationChain,
    /// Persisted escalation level.
    pub level: usize,
    /// Persisted status.
    pub status: CardStatus,
    /// Persisted escalation policy.
    pub policy: EscalationPolicy,
    /// Persisted deadlines.
    pub deadlines: CardDeadlines,
    /// Persisted revision.
    pub revision: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest change timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted completion or deletion timestamp.
    pub closed_at: Option<DateTime<Utc>>,
}

/// Fields a transition rewrites, staged before they replace the card's.
struct Staged {
    chain: EscalationChain,
    level: usize,
    deadlines: CardDeadlines,
    closed_at: Option<DateTime<Utc>>,
}

impl Card {
    /// Opens a new card owned by the chain's level 0 assignee.
    ///
    /// # Errors
    ///
    /// Returns [`CardDomainError::DeadlineOutOfRange`] when the policy
    /// deadlines overflow from the clock's time.
    pub fn open(
        subject: CardSubject,
        title: CardTitle,
        chain: EscalationChain,
        policy: EscalationPolicy,
        clock: &impl Clock,
    ) -> Result<Self, CardDomainError> {
        let timestamp = clock.utc();
        let deadlines = policy.deadlines_from(timestamp)?;
        Ok(Self {
            id: CardId::new(),
            subject,
            title,
            chain,
            level: 0,
            status: CardStatus::Created,
            policy,
            deadlines,
            revision: 1,
            created_at: timestamp,
            updated_at: timestamp,
            closed_at: None,
        })
    }

    /// Reconstructs a card from persisted storage.
    ///
    /// A level beyond the chain is clamped to the top level.
    #[must_use]
    pub fn from_persisted(data: PersistedCardData) -> Self {
        let level = data.level.min(data.chain.len().saturating_sub(1));
        Self {
            id: data.id,
            subject: data.subject,
            title: data.title,
            chain: data.chain,
            level,
            status: data.status,
            policy: data.policy,
            deadlines: data.deadlines,
            revision: data.revision,
            created_at: data.created_at,
            updated_at: data.updated_at,
            closed_at: data.closed_at,
        }
    }

    /// Returns the card identifier.
    #[must_use]
    pub const fn id(&self) -> CardId {
        self.id
    }

    /// Returns the tracked business record.
    #[must_use]
    pub const fn subject(&self) -> &CardSubject {
        &self.subject
    }

    /// Returns the card title.
    #[must_use]
    pub const fn title(&self) -> &CardTitle {
        &self.title
    }

    /// Returns the escalation chain.
    #[must_use]
    pub const fn chain(&self) -> &EscalationChain {
        &self.chain
    }

    /// Returns the current escalation level.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Returns the assignee currently responsible for the card.
    #[must_use]
    pub fn assignee(&self) -> &AssigneeId {
        self.chain
            .assignee_at(self.level)
            .unwrap_or_else(|| self.chain.owner())
    }

    /// Returns the card status.
    #[must_use]
    pub const fn status(&self) -> CardStatus {
        self.status
    }

    /// Returns the escalation policy.
    #[must_use]
    pub const fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    /// Returns the armed deadlines.
    #[must_use]
    pub const fn deadlines(&self) -> &CardDeadlines {
        &self.deadlines
    }

    /// Returns the revision, bumped by every accepted transition.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the completion or deletion timestamp.
    #[must_use]
    pub const fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    /// Returns the next time a time-driven trigger becomes due, or `None`
    /// when nothing is pending.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<DateTime<Utc>> {
        match self.status {
            CardStatus::Created => Some(self.deadlines.warning_at()),
            CardStatus::Warning => Some(self.deadlines.breach_at()),
            CardStatus::Breached => self.deadlines.next_escalation_at(),
            CardStatus::Completed | CardStatus::Deleted => None,
        }
    }

    /// Returns the time-driven trigger due at `now`, if any.
    #[must_use]
    pub fn due_trigger(&self, now: DateTime<Utc>) -> Option<CardTrigger> {
        match self.status {
            CardStatus::Created if now >= self.deadlines.breach_at() => {
                Some(CardTrigger::BreachDeadlinePassed)
            }
            CardStatus::Created if now >= self.deadlines.warning_at() => {
                Some(CardTrigger::WarningDeadlinePassed)
            }
            CardStatus::Warning if now >= self.deadlines.breach_at() => {
                Some(CardTrigger::BreachDeadlinePassed)
            }
            CardStatus::Breached => self
                .deadlines
                .next_escalation_at()
                .filter(|at| now >= *at && self.chain.has_level_above(self.level))
                .map(|_| CardTrigger::EscalationDeadlinePassed),
            _ => None,
        }
    }

    /// Fires `trigger` on the card.
    ///
    /// Time-driven triggers are accepted only from [`Actor::System`] and
    /// only when due at the clock's time. A breach moves the card to the
    /// next chain level when one exists and arms a re-escalation deadline
    /// while a further level remains.
    ///
    /// # Errors
    ///
    /// Returns [`CardDomainError::InvalidTransition`] when the transition
    /// table has no entry, [`CardDomainError::SystemTriggerOnly`] or
    /// [`CardDomainError::TriggerNotDue`] for misuse of time-driven
    /// triggers, and [`CardDomainError::AssigneeRequired`] for
    /// [`CardTrigger::Reassign`], which goes through [`Card::reassign`].
    /// The card is unchanged on error.
    pub fn apply(
        &mut self,
        trigger: CardTrigger,
        actor: &Actor,
        clock: &impl Clock,
    ) -> Result<CardTransition, CardDomainError> {
        if trigger == CardTrigger::Reassign {
            return Err(CardDomainError::AssigneeRequired(self.id));
        }
        let to = self.target_of(trigger)?;
        let now = clock.utc();

        if trigger.is_time_driven() {
            if !actor.is_system() {
                return Err(CardDomainError::SystemTriggerOnly {
                    card_id: self.id,
                    trigger,
                });
            }
            if self.due_trigger(now) != Some(trigger) {
                return Err(CardDomainError::TriggerNotDue {
                    card_id: self.id,
                    trigger,
                });
            }
        }

        let staged = match trigger {
            CardTrigger::BreachDeadlinePassed | CardTrigger::EscalationDeadlinePassed => {
                self.stage_escalation(now)?
            }
            CardTrigger::WarningDeadlinePassed => Staged {
                chain: self.chain.clone(),
                level: self.level,
                deadlines: self.deadlines,
                closed_at: None,
            },
            CardTrigger::Complete | CardTrigger::Delete | CardTrigger::Reassign => Staged {
                chain: self.chain.clone(),
                level: self.level,
                deadlines: self.deadlines.with_next_escalation_at(None),
                closed_at: Some(now),
            },
        };
        Ok(self.commit(trigger, to, actor, staged, now))
    }

    /// Hands the card to `assignee` at the current escalation level.
    ///
    /// The card returns to [`CardStatus::Created`] with deadlines re-armed
    /// from the clock's time.
    ///
    /// # Errors
    ///
    /// Returns [`CardDomainError::InvalidTransition`] for terminal cards,
    /// [`CardDomainError::SameAssignee`] when `assignee` already holds the
    /// card, and [`CardDomainError::AssigneeAlreadyInChain`] when
    /// `assignee` holds another level. The card is unchanged on error.
    pub fn reassign(
        &mut self,
        assignee: AssigneeId,
        actor: &Actor,
        clock: &impl Clock,
    ) -> Result<CardTransition, CardDomainError> {
        let to = self.target_of(CardTrigger::Reassign)?;
        if *self.assignee() == assignee {
            return Err(CardDomainError::SameAssignee {
                card_id: self.id,
                assignee,
            });
        }
        if self.chain.position(&assignee).is_some() {
            return Err(CardDomainError::AssigneeAlreadyInChain {
                card_id: self.id,
                assignee,
            });
        }

        let now = clock.utc();
        let staged = Staged {
            chain: self.chain.with_replaced(self.level, assignee)?,
            level: self.level,
            deadlines: self.policy.deadlines_from(now)?,
            closed_at: None,
        };
        Ok(self.commit(CardTrigger::Reassign, to, actor, staged, now))
    }

    /// Marks the card completed.
    ///
    /// # Errors
    ///
    /// Returns [`CardDomainError::InvalidTransition`] for terminal cards.
    pub fn complete(
        &mut self,
        actor: &Actor,
        clock: &impl Clock,
    ) -> Result<CardTransition, CardDomainError> {
        self.apply(CardTrigger::Complete, actor, clock)
    }

    /// Withdraws the card.
    ///
    /// # Errors
    ///
    /// Returns [`CardDomainError::InvalidTransition`] for terminal cards.
    pub fn delete(
        &mut self,
        actor: &Actor,
        clock: &impl Clock,
    ) -> Result<CardTransition, CardDomainError> {
        self.apply(CardTrigger::Delete, actor, clock)
    }

    fn target_of(&self, trigger: CardTrigger) -> Result<CardStatus, CardDomainError> {
        self.status
            .next(trigger)
            .ok_or(CardDomainError::InvalidTransition {
                card_id: self.id,
                from: self.status,
                trigger,
            })
    }

    fn stage_escalation(&self, now: DateTime<Utc>) -> Result<Staged, CardDomainError> {
        let level = if self.chain.has_level_above(self.level) {
            self.level + 1
        } else {
            self.level
        };
        let next_escalation_at = if self.chain.has_level_above(level) {
            Some(self.policy.next_escalation_from(now)?)
        } else {
            None
        };
        Ok(Staged {
            chain: self.chain.clone(),
            level,
            deadlines: self.deadlines.with_next_escalation_at(next_escalation_at),
            closed_at: None,
        })
    }

    fn commit(
        &mut self,
        trigger: CardTrigger,
        to: CardStatus,
        actor: &Actor,
        staged: Staged,
        now: DateTime<Utc>,
    ) -> CardTransition {
        let from = self.status;
        let level_before = self.level;
        let assignee_before = self.assignee().clone();

        self.chain = staged.chain;
        self.level = staged.level;
        self.deadlines = staged.deadlines;
        self.closed_at = staged.closed_at;
        self.status = to;
        self.revision += 1;
        self.updated_at = now;

        CardTransition {
            card_id: self.id,
            revision: self.revision,
            from,
            trigger,
            to,
            actor: actor.clone(),
            assignee_before,
            assignee_after: self.assignee().clone(),
            level_before,
            level_after: self.level,
            occurred_at: now,
        }
    }
}
