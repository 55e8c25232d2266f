//! In-memory card repository for tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::card::{
    domain::{AssigneeId, Card, CardAuditEntry, CardId, CardSubject},
    ports::{CardRepository, CardRepositoryError, CardRepositoryResult},
};

/// Thread-safe in-memory card repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCardRepository {
    state: Arc<RwLock<InMemoryCardState>>,
}

#[derive(Debug, Default)]
struct InMemoryCardState {
    cards: HashMap<CardId, Card>,
    audit: HashMap<CardId, BTreeMap<u64, CardAuditEntry>>,
}

impl InMemoryCardRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> CardRepositoryResult<RwLockReadGuard<'_, InMemoryCardState>> {
        self.state.read().map_err(|err| {
            CardRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> CardRepositoryResult<RwLockWriteGuard<'_, InMemoryCardState>> {
        self.state.write().map_err(|err| {
            CardRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Sorts cards newest first with the identifier as a stable tiebreak.
fn newest_first(mut cards: Vec<Card>) -> Vec<Card> {
    cards.sort_by(|left, right| {
        right
            .created_at()
            .cmp(&left.created_at())
            .then_with(|| left.id().cmp(&right.id()))
    });
    cards
}

#[async_trait]
impl CardRepository for InMemoryCardRepository {
    async fn store(&self, card: &Card) -> CardRepositoryResult<()> {
        let mut state = self.write()?;
        if state.cards.contains_key(&card.id()) {
            return Err(CardRepositoryError::DuplicateCard(card.id()));
        }
        state.cards.insert(card.id(), card.clone());
        Ok(())
    }

    async fn commit_transition(
        &self,
        card: &Card,
        entry: &CardAuditEntry,
    ) -> CardRepositoryResult<()> {
        let mut state = self.write()?;
        let stored_revision = state
            .cards
            .get(&card.id())
            .map(Card::revision)
            .ok_or(CardRepositoryError::NotFound(card.id()))?;

        let expected = card.revision().saturating_sub(1);
        if stored_revision != expected {
            // Same revision already committed: identical replays succeed,
            // divergent payloads are an audit conflict.
            let committed = (stored_revision == card.revision())
                .then(|| {
                    state
                        .audit
                        .get(&card.id())
                        .and_then(|entries| entries.get(&entry.revision()))
                })
                .flatten();
            if let Some(existing) = committed {
                if existing.is_replay_of(entry) {
                    return Ok(());
                }
                return Err(CardRepositoryError::AuditConflict {
                    card_id: card.id(),
                    revision: entry.revision(),
                });
            }
            return Err(CardRepositoryError::RevisionConflict {
                card_id: card.id(),
                expected,
                found: stored_revision,
            });
        }

        let entries = state.audit.entry(card.id()).or_default();
        if let Some(existing) = entries.get(&entry.revision()) {
            if !existing.is_replay_of(entry) {
                return Err(CardRepositoryError::AuditConflict {
                    card_id: card.id(),
                    revision: entry.revision(),
                });
            }
        } else {
            entries.insert(entry.revision(), entry.clone());
        }
        state.cards.insert(card.id(), card.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: CardId) -> CardRepositoryResult<Option<Card>> {
        let state = self.read()?;
        Ok(state.cards.get(&id).cloned())
    }

    async fn list_by_assignee(
        &self,
        assignee: &AssigneeId,
        include_closed: bool,
    ) -> CardRepositoryResult<Vec<Card>> {
        let state = self.read()?;
        let cards = state
            .cards
            .values()
            .filter(|card| card.assignee() == assignee)
            .filter(|card| include_closed || !card.status().is_terminal())
            .cloned()
            .collect();
        Ok(newest_first(cards))
    }

    async fn list_by_subject(&self, subject: &CardSubject) -> CardRepositoryResult<Vec<Card>> {
        let state = self.read()?;
        let cards = state
            .cards
            .values()
            .filter(|card| card.subject() == subject)
            .cloned()
            .collect();
        Ok(newest_first(cards))
    }

    async fn list_due(&self, now: DateTime<Utc>, limit: usize) -> CardRepositoryResult<Vec<Card>> {
        let state = self.read()?;
        let mut due: Vec<(DateTime<Utc>, Card)> = state
            .cards
            .values()
            .filter_map(|card| {
                card.next_deadline()
                    .filter(|deadline| *deadline <= now)
                    .map(|deadline| (deadline, card.clone()))
            })
            .collect();
        due.sort_by(|(left_at, left), (right_at, right)| {
            left_at.cmp(right_at).then_with(|| left.id().cmp(&right.id()))
        });
        Ok(due.into_iter().take(limit).map(|(_, card)| card).collect())
    }

    async fn history(&self, id: CardId) -> CardRepositoryResult<Vec<CardAuditEntry>> {
        let state = self.read()?;
        Ok(state
            .audit
            .get(&id)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default())
    }
}
