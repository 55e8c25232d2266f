//! Repository port for card persistence and the card audit trail.

use crate::card::domain::{AssigneeId, Card, CardAuditEntry, CardId, CardSubject};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for card repository operations.
pub type CardRepositoryResult<T> = Result<T, CardRepositoryError>;

/// Card persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CardRepository: Send + Sync {
    /// Stores a newly opened card.
    ///
    /// # Errors
    ///
    /// Returns [`CardRepositoryError::DuplicateCard`] when the identifier
    /// already exists.
    async fn store(&self, card: &Card) -> CardRepositoryResult<()>;

    /// Persists a transitioned card together with its audit entry.
    ///
    /// The card is written only if the stored revision is exactly one less
    /// than `card.revision()`. The audit append is idempotent: an entry
    /// already stored for the same `(card_id, revision)` with the same
    /// fingerprint is accepted silently.
    ///
    /// # Errors
    ///
    /// Returns [`CardRepositoryError::NotFound`] when the card does not
    /// exist, [`CardRepositoryError::RevisionConflict`] when the stored
    /// revision does not match, and [`CardRepositoryError::AuditConflict`]
    /// when a different entry is already stored for the revision.
    async fn commit_transition(&self, card: &Card, entry: &CardAuditEntry)
    -> CardRepositoryResult<()>;

    /// Finds a card by identifier.
    async fn find_by_id(&self, id: CardId) -> CardRepositoryResult<Option<Card>>;

    /// Lists cards currently held by `assignee`, newest first.
    async fn list_by_assignee(
        &self,
        assignee: &AssigneeId,
        include_closed: bool,
    ) -> CardRepositoryResult<Vec<Card>>;

    /// Lists all cards tracking `subject`, newest first.
    async fn list_by_subject(&self, subject: &CardSubject) -> CardRepositoryResult<Vec<Card>>;

    /// Lists open cards whose next deadline is at or before `now`, earliest
    /// deadline first, capped at `limit`.
    async fn list_due(&self, now: DateTime<Utc>, limit: usize) -> CardRepositoryResult<Vec<Card>>;

    /// Returns the audit trail of a card ordered by revision.
    async fn history(&self, id: CardId) -> CardRepositoryResult<Vec<CardAuditEntry>>;
}

/// Errors returned by card repository implementations.
#[derive(Debug, Clone, Error)]
pub enum CardRepositoryError {
    /// A card with the same identifier already exists.
    #[error("duplicate card identifier: {0}")]
    DuplicateCard(CardId),

    /// The card was not found.
    #[error("card not found: {0}")]
    NotFound(CardId),

    /// The stored card moved on since it was loaded.
    #[error("card {card_id} revision conflict: expected {expected}, found {found}")]
    RevisionConflict {
        /// Card identifier.
        card_id: CardId,
        /// Revision the writer expected to replace.
        expected: u64,
        /// Revision actually stored.
        found: u64,
    },

    /// A different audit entry is already stored for the revision.
    #[error("card {card_id} already has a different audit entry for revision {revision}")]
    AuditConflict {
        /// Card identifier.
        card_id: CardId,
        /// Conflicting revision.
        revision: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CardRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
