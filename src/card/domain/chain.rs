//! Ordered escalation chain for a card.

use super::{AssigneeId, CardDomainError};
use serde::{Deserialize, Serialize};

/// Ordered list of distinct assignees; level 0 owns the card and each
/// higher level is the next escalation contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AssigneeId>", into = "Vec<AssigneeId>")]
pub struct EscalationChain {
    owner: AssigneeId,
    escalations: Vec<AssigneeId>,
}

impl EscalationChain {
    /// Creates a chain from assignees ordered by level.
    ///
    /// # Errors
    ///
    /// Returns [`CardDomainError::EmptyEscalationChain`] for an empty list
    /// and [`CardDomainError::DuplicateChainMember`] when an assignee
    /// appears twice.
    pub fn new(assignees: impl IntoIterator<Item = AssigneeId>) -> Result<Self, CardDomainError> {
        let mut members = assignees.into_iter();
        let owner = members
            .next()
            .ok_or(CardDomainError::EmptyEscalationChain)?;
        let mut escalations: Vec<AssigneeId> = Vec::new();
        for member in members {
            if member == owner || escalations.contains(&member) {
                return Err(CardDomainError::DuplicateChainMember(member));
            }
            escalations.push(member);
        }
        Ok(Self { owner, escalations })
    }

    /// Creates a single-level chain.
    #[must_use]
    pub const fn single(owner: AssigneeId) -> Self {
        Self {
            owner,
            escalations: Vec::new(),
        }
    }

    /// Returns the level 0 owner.
    #[must_use]
    pub const fn owner(&self) -> &AssigneeId {
        &self.owner
    }

    /// Returns the assignee holding `level`, if the chain is that deep.
    #[must_use]
    pub fn assignee_at(&self, level: usize) -> Option<&AssigneeId> {
        match level.checked_sub(1) {
            None => Some(&self.owner),
            Some(index) => self.escalations.get(index),
        }
    }

    /// Returns the number of levels.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.escalations.len() + 1
    }

    /// Always `false`; a chain holds at least its owner.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Returns `true` when a level exists above `level`.
    #[must_use]
    pub const fn has_level_above(&self, level: usize) -> bool {
        level < self.escalations.len()
    }

    /// Returns the level held by `assignee`.
    #[must_use]
    pub fn position(&self, assignee: &AssigneeId) -> Option<usize> {
        self.iter().position(|member| member == assignee)
    }

    /// Iterates assignees from the owner upwards.
    pub fn iter(&self) -> impl Iterator<Item = &AssigneeId> {
        std::iter::once(&self.owner).chain(self.escalations.iter())
    }

    /// Returns a copy of the chain with `level` held by `assignee`.
    ///
    /// # Errors
    ///
    /// Returns [`CardDomainError::DuplicateChainMember`] when `assignee`
    /// already holds another level.
    pub fn with_replaced(&self, level: usize, assignee: AssigneeId) -> Result<Self, CardDomainError> {
        let members = self.iter().enumerate().map(|(index, member)| {
            if index == level {
                assignee.clone()
            } else {
                member.clone()
            }
        });
        Self::new(members.collect::<Vec<_>>())
    }
}

impl TryFrom<Vec<AssigneeId>> for EscalationChain {
    type Error = CardDomainError;

    fn try_from(value: Vec<AssigneeId>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EscalationChain> for Vec<AssigneeId> {
    fn from(value: EscalationChain) -> Self {
        let EscalationChain {
            owner,
            mut escalations,
        } = value;
        escalations.insert(0, owner);
        escalations
    }
}
