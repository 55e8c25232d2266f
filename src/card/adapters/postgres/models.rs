//! Diesel row models for card persistence.

use super::schema::{card_audit_log, cards};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for card records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CardRow {
    /// Card identifier.
    pub id: uuid::Uuid,
    /// Subject kind.
    pub subject_kind: String,
    /// Subject reference.
    pub subject_ref: String,
    /// Title.
    pub title: String,
    /// Escalation chain JSON.
    pub chain: Value,
    /// Escalation level.
    pub level: i32,
    /// Current assignee.
    pub current_assignee: String,
    /// Status.
    pub status: String,
    /// Warning threshold in seconds.
    pub warning_after_secs: i64,
    /// Breach threshold in seconds.
    pub breach_after_secs: i64,
    /// Re-escalation interval in seconds.
    pub re_escalate_after_secs: i64,
    /// Warning deadline.
    pub warning_at: DateTime<Utc>,
    /// Breach deadline.
    pub breach_at: DateTime<Utc>,
    /// Re-escalation deadline.
    pub next_escalation_at: Option<DateTime<Utc>>,
    /// Next pending deadline.
    pub due_at: Option<DateTime<Utc>>,
    /// Revision.
    pub revision: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
    /// Closing timestamp.
    pub closed_at: Option<DateTime<Utc>>,
}

/// Insert and update model for card records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = cards)]
#[diesel(treat_none_as_null = true)]
pub struct NewCardRow {
    /// Card identifier.
    pub id: uuid::Uuid,
    /// Subject kind.
    pub subject_kind: String,
    /// Subject reference.
    pub subject_ref: String,
    /// Title.
    pub title: String,
    /// Escalation chain JSON.
    pub chain: Value,
    /// Escalation level.
    pub level: i32,
    /// Current assignee.
    pub current_assignee: String,
    /// Status.
    pub status: String,
    /// Warning threshold in seconds.
    pub warning_after_secs: i64,
    /// Breach threshold in seconds.
    pub breach_after_secs: i64,
    /// Re-escalation interval in seconds.
    pub re_escalate_after_secs: i64,
    /// Warning deadline.
    pub warning_at: DateTime<Utc>,
    /// Breach deadline.
    pub breach_at: DateTime<Utc>,
    /// Re-escalation deadline.
    pub next_escalation_at: Option<DateTime<Utc>>,
    /// Next pending deadline.
    pub due_at: Option<DateTime<Utc>>,
    /// Revision.
    pub revision: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
    /// Closing timestamp.
    pub closed_at: Option<DateTime<Utc>>,
}

/// Row model for audit entries, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = card_audit_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AuditRow {
    /// Card identifier.
    pub card_id: uuid::Uuid,
    /// Revision.
    pub revision: i64,
    /// Trigger name.
    pub trigger_name: String,
    /// Status before.
    pub from_status: String,
    /// Status after.
    pub to_status: String,
    /// Actor label.
    pub actor: String,
    /// Transition payload.
    pub payload: Value,
    /// Payload fingerprint.
    pub fingerprint: String,
    /// Transition time.
    pub occurred_at: DateTime<Utc>,
}
