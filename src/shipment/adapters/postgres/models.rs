//! Diesel row models for shipment persistence.

use super::schema::shipments;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row model for shipments, used for reads, inserts and updates.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = shipments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct ShipmentRow {
    /// Shipment identifier.
    pub id: uuid::Uuid,
    /// Reference.
    pub reference: String,
    /// Transport mode.
    pub mode: String,
    /// Estimated departure.
    pub etd: DateTime<Utc>,
    /// Status.
    pub status: String,
    /// Lock time.
    pub lock_at: DateTime<Utc>,
    /// Lock timestamp.
    pub locked_at: Option<DateTime<Utc>>,
    /// Revision.
    pub revision: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}
