//! `PostgreSQL` repository implementation for cards and their audit trail.

use super::{
    models::{AuditRow, CardRow, NewCardRow},
    schema::{card_audit_log, cards},
};
use crate::card::{
    domain::{
        AssigneeId, Card, CardAuditEntry, CardDeadlines, CardId, CardStatus, CardSubject,
        CardTitle, CardTransition, EscalationChain, EscalationPolicy, PersistedCardData,
        SubjectKind,
    },
    ports::{CardRepository, CardRepositoryError, CardRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by card adapters.
pub type CardPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed card repository.
#[derive(Debug, Clone)]
pub struct PostgresCardRepository {
    pool: CardPgPool,
}

/// Error type for the transaction closure, which must absorb Diesel errors.
enum TransactionError {
    Repository(CardRepositoryError),
    Diesel(DieselError),
}

impl From<DieselError> for TransactionError {
    fn from(err: DieselError) -> Self {
        Self::Diesel(err)
    }
}

impl From<CardRepositoryError> for TransactionError {
    fn from(err: CardRepositoryError) -> Self {
        Self::Repository(err)
    }
}

impl From<TransactionError> for CardRepositoryError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::Repository(inner) => inner,
            TransactionError::Diesel(inner) => Self::persistence(inner),
        }
    }
}

impl PostgresCardRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: CardPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> CardRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> CardRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(CardRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(CardRepositoryError::persistence)?
    }
}

#[async_trait]
impl CardRepository for PostgresCardRepository {
    async fn store(&self, card: &Card) -> CardRepositoryResult<()> {
        let card_id = card.id();
        let new_row = to_row(card)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(cards::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        CardRepositoryError::DuplicateCard(card_id)
                    }
                    _ => CardRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn commit_transition(
        &self,
        card: &Card,
        entry: &CardAuditEntry,
    ) -> CardRepositoryResult<()> {
        let card_id = card.id();
        let next_revision = card.revision();
        let expected_revision = next_revision.saturating_sub(1);
        let revision = to_i64(next_revision)?;
        let expected = to_i64(expected_revision)?;
        let row = to_row(card)?;
        let audit_row = to_audit_row(entry)?;

        self.run_blocking(move |connection| {
            connection
                .transaction::<_, TransactionError, _>(|tx| {
                    let stored = cards::table
                        .find(card_id.into_inner())
                        .select(cards::revision)
                        .for_update()
                        .first::<i64>(tx)
                        .optional()?
                        .ok_or(CardRepositoryError::NotFound(card_id))?;

                    if stored != expected {
                        if stored == revision {
                            match stored_fingerprint(tx, &audit_row)? {
                                Some(fingerprint) if fingerprint == audit_row.fingerprint => {
                                    return Ok(());
                                }
                                Some(_) => {
                                    return Err(CardRepositoryError::AuditConflict {
                                        card_id,
                                        revision: next_revision,
                                    }
                                    .into());
                                }
                                None => {}
                            }
                        }
                        let found =
                            u64::try_from(stored).map_err(CardRepositoryError::persistence)?;
                        return Err(CardRepositoryError::RevisionConflict {
                            card_id,
                            expected: expected_revision,
                            found,
                        }
                        .into());
                    }

                    let inserted = diesel::insert_into(card_audit_log::table)
                        .values(&audit_row)
                        .on_conflict((card_audit_log::card_id, card_audit_log::revision))
                        .do_nothing()
                        .execute(tx)?;
                    if inserted == 0
                        && stored_fingerprint(tx, &audit_row)?.as_deref()
                            != Some(audit_row.fingerprint.as_str())
                    {
                        return Err(CardRepositoryError::AuditConflict {
                            card_id,
                            revision: next_revision,
                        }
                        .into());
                    }

                    diesel::update(
                        cards::table
                            .filter(cards::id.eq(card_id.into_inner()))
                            .filter(cards::revision.eq(expected)),
                    )
                    .set(&row)
                    .execute(tx)?;
                    Ok(())
                })
                .map_err(CardRepositoryError::from)
        })
        .await
    }

    async fn find_by_id(&self, id: CardId) -> CardRepositoryResult<Option<Card>> {
        self.run_blocking(move |connection| {
            let row = cards::table
                .find(id.into_inner())
                .select(CardRow::as_select())
                .first::<CardRow>(connection)
                .optional()
                .map_err(CardRepositoryError::persistence)?;
            row.map(row_to_card).transpose()
        })
        .await
    }

    async fn list_by_assignee(
        &self,
        assignee: &AssigneeId,
        include_closed: bool,
    ) -> CardRepositoryResult<Vec<Card>> {
        let handle = assignee.as_str().to_owned();
        self.run_blocking(move |connection| {
            let query = cards::table
                .filter(cards::current_assignee.eq(handle))
                .order((cards::created_at.desc(), cards::id.asc()))
                .select(CardRow::as_select());
            let rows = if include_closed {
                query.load::<CardRow>(connection)
            } else {
                query
                    .filter(cards::closed_at.is_null())
                    .load::<CardRow>(connection)
            }
            .map_err(CardRepositoryError::persistence)?;
            rows.into_iter().map(row_to_card).collect()
        })
        .await
    }

    async fn list_by_subject(&self, subject: &CardSubject) -> CardRepositoryResult<Vec<Card>> {
        let kind = subject.kind().as_str();
        let reference = subject.reference().to_owned();
        self.run_blocking(move |connection| {
            let rows = cards::table
                .filter(cards::subject_kind.eq(kind))
                .filter(cards::subject_ref.eq(reference))
                .order((cards::created_at.desc(), cards::id.asc()))
                .select(CardRow::as_select())
                .load::<CardRow>(connection)
                .map_err(CardRepositoryError::persistence)?;
            rows.into_iter().map(row_to_card).collect()
        })
        .await
    }

    async fn list_due(&self, now: DateTime<Utc>, limit: usize) -> CardRepositoryResult<Vec<Card>> {
        let row_limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.run_blocking(move |connection| {
            let rows = cards::table
                .filter(cards::due_at.le(now))
                .order((cards::due_at.asc(), cards::id.asc()))
                .limit(row_limit)
                .select(CardRow::as_select())
                .load::<CardRow>(connection)
                .map_err(CardRepositoryError::persistence)?;
            rows.into_iter().map(row_to_card).collect()
        })
        .await
    }

    async fn history(&self, id: CardId) -> CardRepositoryResult<Vec<CardAuditEntry>> {
        self.run_blocking(move |connection| {
            let rows = card_audit_log::table
                .filter(card_audit_log::card_id.eq(id.into_inner()))
                .order(card_audit_log::revision.asc())
                .select(AuditRow::as_select())
                .load::<AuditRow>(connection)
                .map_err(CardRepositoryError::persistence)?;
            rows.into_iter().map(row_to_audit_entry).collect()
        })
        .await
    }
}

fn stored_fingerprint(
    connection: &mut PgConnection,
    audit_row: &AuditRow,
) -> Result<Option<String>, DieselError> {
    card_audit_log::table
        .find((audit_row.card_id, audit_row.revision))
        .select(card_audit_log::fingerprint)
        .first::<String>(connection)
        .optional()
}

fn to_i64(value: u64) -> CardRepositoryResult<i64> {
    i64::try_from(value).map_err(CardRepositoryError::persistence)
}

fn to_row(card: &Card) -> CardRepositoryResult<NewCardRow> {
    let chain = serde_json::to_value(card.chain()).map_err(CardRepositoryError::persistence)?;
    let level = i32::try_from(card.level()).map_err(CardRepositoryError::persistence)?;
    let policy = card.policy();
    let deadlines = card.deadlines();

    Ok(NewCardRow {
        id: card.id().into_inner(),
        subject_kind: card.subject().kind().as_str().to_owned(),
        subject_ref: card.subject().reference().to_owned(),
        title: card.title().as_str().to_owned(),
        chain,
        level,
        current_assignee: card.assignee().as_str().to_owned(),
        status: card.status().as_str().to_owned(),
        warning_after_secs: policy.warning_after_secs(),
        breach_after_secs: policy.breach_after_secs(),
        re_escalate_after_secs: policy.re_escalate_after_secs(),
        warning_at: deadlines.warning_at(),
        breach_at: deadlines.breach_at(),
        next_escalation_at: deadlines.next_escalation_at(),
        due_at: card.next_deadline(),
        revision: to_i64(card.revision())?,
        created_at: card.created_at(),
        updated_at: card.updated_at(),
        closed_at: card.closed_at(),
    })
}

fn row_to_card(row: CardRow) -> CardRepositoryResult<Card> {
    let CardRow {
        id,
        subject_kind,
        subject_ref,
        title,
        chain,
        level,
        current_assignee,
        status,
        warning_after_secs,
        breach_after_secs,
        re_escalate_after_secs,
        warning_at,
        breach_at,
        next_escalation_at,
        due_at,
        revision,
        created_at,
        updated_at,
        closed_at,
    } = row;

    let kind = SubjectKind::try_from(subject_kind.as_str())
        .map_err(CardRepositoryError::persistence)?;
    let subject = CardSubject::new(kind, subject_ref).map_err(CardRepositoryError::persistence)?;
    let persisted_title = CardTitle::new(title).map_err(CardRepositoryError::persistence)?;
    let persisted_chain = serde_json::from_value::<EscalationChain>(chain)
        .map_err(CardRepositoryError::persistence)?;
    let persisted_status =
        CardStatus::try_from(status.as_str()).map_err(CardRepositoryError::persistence)?;
    let policy = EscalationPolicy::from_secs(
        warning_after_secs,
        breach_after_secs,
        re_escalate_after_secs,
    )
    .map_err(CardRepositoryError::persistence)?;
    let deadlines = CardDeadlines::new(warning_at, breach_at)
        .map_err(CardRepositoryError::persistence)?
        .with_next_escalation_at(next_escalation_at);

    let card = Card::from_persisted(PersistedCardData {
        id: CardId::from_uuid(id),
        subject,
        title: persisted_title,
        chain: persisted_chain,
        level: usize::try_from(level).map_err(CardRepositoryError::persistence)?,
        status: persisted_status,
        policy,
        deadlines,
        revision: u64::try_from(revision).map_err(CardRepositoryError::persistence)?,
        created_at,
        updated_at,
        closed_at,
    });

    // Denormalized query columns must agree with the chain and deadlines.
    if card.assignee().as_str() != current_assignee || card.next_deadline() != due_at {
        return Err(CardRepositoryError::persistence(std::io::Error::other(
            format!(
                "card {} has stale query columns: assignee {current_assignee}, due_at {due_at:?}",
                card.id()
            ),
        )));
    }
    Ok(card)
}

fn to_audit_row(entry: &CardAuditEntry) -> CardRepositoryResult<AuditRow> {
    let transition = entry.transition();
    let payload = serde_json::to_value(transition).map_err(CardRepositoryError::persistence)?;
    Ok(AuditRow {
        card_id: transition.card_id.into_inner(),
        revision: to_i64(transition.revision)?,
        trigger_name: transition.trigger.as_str().to_owned(),
        from_status: transition.from.as_str().to_owned(),
        to_status: transition.to.as_str().to_owned(),
        actor: transition.actor.to_string(),
        payload,
        fingerprint: entry.fingerprint().to_owned(),
        occurred_at: transition.occurred_at,
    })
}

fn row_to_audit_entry(row: AuditRow) -> CardRepositoryResult<CardAuditEntry> {
    let transition = serde_json::from_value::<CardTransition>(row.payload)
        .map_err(CardRepositoryError::persistence)?;
    Ok(CardAuditEntry::from_persisted(transition, row.fingerprint))
}
