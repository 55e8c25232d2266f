//! Service layer for card assignment, escalation ticks, and closing.

use super::NotificationTemplates;
use crate::card::{
    domain::{
        Actor, AssigneeId, Card, CardAuditEntry, CardDomainError, CardId, CardSubject, CardTitle,
        CardTransition, CardTrigger, EscalationChain, EscalationPolicy, ParseSubjectKindError,
        SubjectKind,
    },
    ports::{CardNotification, CardNotifier, CardRepository, CardRepositoryError},
};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Request payload for opening a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenCardRequest {
    subject_kind: String,
    subject_ref: String,
    title: String,
    chain: Vec<String>,
    policy: Option<EscalationPolicy>,
}

impl OpenCardRequest {
    /// Creates a request for a card owned by `owner`.
    #[must_use]
    pub fn new(
        subject_kind: impl Into<String>,
        subject_ref: impl Into<String>,
        title: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            subject_kind: subject_kind.into(),
            subject_ref: subject_ref.into(),
            title: title.into(),
            chain: vec![owner.into()],
            policy: None,
        }
    }

    /// Appends escalation contacts above the owner, lowest level first.
    #[must_use]
    pub fn with_escalations(mut self, contacts: impl IntoIterator<Item = String>) -> Self {
        self.chain.extend(contacts);
        self
    }

    /// Overrides the service's default escalation policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: EscalationPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

/// Service-level errors for card operations.
#[derive(Debug, Error)]
pub enum CardServiceError {
    /// Domain validation or transition rules rejected the operation.
    #[error(transparent)]
    Domain(#[from] CardDomainError),
    /// The subject kind is not recognised.
    #[error(transparent)]
    SubjectKind(#[from] ParseSubjectKindError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] CardRepositoryError),
    /// No card exists with the given identifier.
    #[error("card {0} not found")]
    NotFound(CardId),
}

/// Result type for card service operations.
pub type CardServiceResult<T> = Result<T, CardServiceError>;

/// Outcome counters of one escalation tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Cards returned by the due query.
    pub examined: usize,
    /// Cards moved to warning.
    pub warned: usize,
    /// Cards moved to breached.
    pub breached: usize,
    /// Cards handed to a higher chain level, on breach or re-escalation.
    pub escalated: usize,
    /// Cards left alone because nothing was due or another writer won.
    pub skipped: usize,
    /// Cards whose transition failed.
    pub failed: usize,
}

impl TickReport {
    fn record(&mut self, transition: &CardTransition) {
        match transition.trigger {
            CardTrigger::WarningDeadlinePassed => self.warned += 1,
            CardTrigger::BreachDeadlinePassed => self.breached += 1,
            _ => {}
        }
        if transition.escalated() {
            self.escalated += 1;
        }
    }
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "examined={} warned={} breached={} escalated={} skipped={} failed={}",
            self.examined, self.warned, self.breached, self.escalated, self.skipped, self.failed
        )
    }
}

/// Card assignment and escalation orchestration service.
pub struct CardService<R, N, C>
where
    R: CardRepository,
    N: CardNotifier,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    notifier: Arc<N>,
    clock: Arc<C>,
    policy: EscalationPolicy,
    templates: Arc<NotificationTemplates>,
}

impl<R, N, C> Clone for CardService<R, N, C>
where
    R: CardRepository,
    N: CardNotifier,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            notifier: Arc::clone(&self.notifier),
            clock: Arc::clone(&self.clock),
            policy: self.policy,
            templates: Arc::clone(&self.templates),
        }
    }
}

impl<R, N, C> CardService<R, N, C>
where
    R: CardRepository,
    N: CardNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a card service applying `policy` to cards opened without
    /// their own.
    #[must_use]
    pub fn new(repository: Arc<R>, notifier: Arc<N>, clock: Arc<C>, policy: EscalationPolicy) -> Self {
        Self {
            repository,
            notifier,
            clock,
            policy,
            templates: Arc::new(NotificationTemplates::new()),
        }
    }

    /// Opens a card and notifies its owner.
    ///
    /// # Errors
    ///
    /// Returns [`CardServiceError`] when validation fails or the repository
    /// rejects persistence.
    #[instrument(skip_all, fields(subject_kind = %request.subject_kind, subject_ref = %request.subject_ref))]
    pub async fn open(&self, request: OpenCardRequest) -> CardServiceResult<Card> {
        let OpenCardRequest {
            subject_kind,
            subject_ref,
            title,
            chain,
            policy,
        } = request;

        let kind = SubjectKind::try_from(subject_kind.as_str())?;
        let subject = CardSubject::new(kind, subject_ref)?;
        let card_title = CardTitle::new(title)?;
        let assignees = chain
            .into_iter()
            .map(AssigneeId::new)
            .collect::<Result<Vec<_>, _>>()?;
        let escalation_chain = EscalationChain::new(assignees)?;

        let card = Card::open(
            subject,
            card_title,
            escalation_chain,
            policy.unwrap_or(self.policy),
            &*self.clock,
        )?;
        self.repository.store(&card).await?;
        info!(card_id = %card.id(), assignee = %card.assignee(), "card opened");

        match self.templates.render_opened(&card) {
            Ok(notification) => self.deliver(&notification).await,
            Err(err) => warn!(card_id = %card.id(), error = %err, "failed to render notification"),
        }
        Ok(card)
    }

    /// Finds a card by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CardServiceError::Repository`] when lookup fails.
    pub async fn find_by_id(&self, id: CardId) -> CardServiceResult<Option<Card>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Lists cards held by `assignee`.
    ///
    /// # Errors
    ///
    /// Returns [`CardServiceError::Domain`] for an invalid handle or
    /// [`CardServiceError::Repository`] when lookup fails.
    pub async fn list_for_assignee(
        &self,
        assignee: &str,
        include_closed: bool,
    ) -> CardServiceResult<Vec<Card>> {
        let assignee_id = AssigneeId::new(assignee)?;
        Ok(self
            .repository
            .list_by_assignee(&assignee_id, include_closed)
            .await?)
    }

    /// Lists cards tracking a business record.
    ///
    /// # Errors
    ///
    /// Returns [`CardServiceError`] when the subject is invalid or lookup
    /// fails.
    pub async fn list_for_subject(
        &self,
        subject_kind: &str,
        subject_ref: &str,
    ) -> CardServiceResult<Vec<Card>> {
        let kind = SubjectKind::try_from(subject_kind)?;
        let subject = CardSubject::new(kind, subject_ref)?;
        Ok(self.repository.list_by_subject(&subject).await?)
    }

    /// Returns the audit trail of a card.
    ///
    /// # Errors
    ///
    /// Returns [`CardServiceError::NotFound`] when the card does not exist
    /// or [`CardServiceError::Repository`] when lookup fails.
    pub async fn history(&self, id: CardId) -> CardServiceResult<Vec<CardAuditEntry>> {
        self.find_or_error(id).await?;
        Ok(self.repository.history(id).await?)
    }

    /// Hands a card to another assignee.
    ///
    /// # Errors
    ///
    /// Returns [`CardServiceError::NotFound`] for unknown cards, domain
    /// errors for rejected transitions, and repository errors.
    #[instrument(skip(self, actor), fields(actor = %actor))]
    pub async fn reassign(
        &self,
        id: CardId,
        assignee: &str,
        actor: &Actor,
    ) -> CardServiceResult<Card> {
        let target = AssigneeId::new(assignee)?;
        let mut card = self.find_or_error(id).await?;
        let transition = card.reassign(target, actor, &*self.clock)?;
        self.commit(&card, transition).await?;
        Ok(card)
    }

    /// Completes a card.
    ///
    /// # Errors
    ///
    /// Returns [`CardServiceError::NotFound`] for unknown cards, domain
    /// errors for terminal cards, and repository errors.
    #[instrument(skip(self, actor), fields(actor = %actor))]
    pub async fn complete(&self, id: CardId, actor: &Actor) -> CardServiceResult<Card> {
        self.close(id, CardTrigger::Complete, actor).await
    }

    /// Deletes a card.
    ///
    /// # Errors
    ///
    /// Returns [`CardServiceError::NotFound`] for unknown cards, domain
    /// errors for terminal cards, and repository errors.
    #[instrument(skip(self, actor), fields(actor = %actor))]
    pub async fn delete(&self, id: CardId, actor: &Actor) -> CardServiceResult<Card> {
        self.close(id, CardTrigger::Delete, actor).await
    }

    /// Fires every due time-driven trigger on up to `limit` cards.
    ///
    /// Failures on one card are logged and counted without stopping the
    /// batch. A revision or audit conflict means another writer already
    /// advanced the card and is counted as skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CardServiceError::Repository`] only when the due query
    /// itself fails.
    #[instrument(skip(self))]
    pub async fn tick(&self, limit: usize) -> CardServiceResult<TickReport> {
        let now = self.clock.utc();
        let due = self.repository.list_due(now, limit).await?;
        let mut report = TickReport::default();

        for mut card in due {
            report.examined += 1;
            let Some(trigger) = card.due_trigger(now) else {
                report.skipped += 1;
                continue;
            };
            let card_id = card.id();
            match self.advance(&mut card, trigger).await {
                Ok(transition) => report.record(&transition),
                Err(CardServiceError::Repository(
                    CardRepositoryError::RevisionConflict { .. }
                    | CardRepositoryError::AuditConflict { .. },
                )) => {
                    debug!(%card_id, %trigger, "card advanced by another writer");
                    report.skipped += 1;
                }
                Err(err) => {
                    warn!(%card_id, %trigger, error = %err, "card transition failed");
                    report.failed += 1;
                }
            }
        }

        info!(%report, "card tick finished");
        Ok(report)
    }

    async fn advance(
        &self,
        card: &mut Card,
        trigger: CardTrigger,
    ) -> CardServiceResult<CardTransition> {
        let transition = card.apply(trigger, &Actor::System, &*self.clock)?;
        self.commit(card, transition.clone()).await?;
        Ok(transition)
    }

    async fn close(
        &self,
        id: CardId,
        trigger: CardTrigger,
        actor: &Actor,
    ) -> CardServiceResult<Card> {
        let mut card = self.find_or_error(id).await?;
        let transition = card.apply(trigger, actor, &*self.clock)?;
        self.commit(&card, transition).await?;
        Ok(card)
    }

    async fn commit(&self, card: &Card, transition: CardTransition) -> CardServiceResult<()> {
        let entry = CardAuditEntry::record(transition)?;
        self.repository.commit_transition(card, &entry).await?;
        let recorded = entry.transition();
        info!(
            card_id = %card.id(),
            revision = recorded.revision,
            from = %recorded.from,
            to = %recorded.to,
            trigger = %recorded.trigger,
            assignee = %recorded.assignee_after,
            "card transitioned"
        );

        match self.templates.render_transition(card, recorded) {
            Ok(Some(notification)) => self.deliver(&notification).await,
            Ok(None) => {}
            Err(err) => warn!(card_id = %card.id(), error = %err, "failed to render notification"),
        }
        Ok(())
    }

    async fn deliver(&self, notification: &CardNotification) {
        if let Err(err) = self.notifier.send(notification).await {
            warn!(
                card_id = %notification.card_id,
                kind = %notification.kind,
                error = %err,
                "card notification not delivered"
            );
        }
    }

    async fn find_or_error(&self, id: CardId) -> CardServiceResult<Card> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(CardServiceError::NotFound(id))
    }
}
