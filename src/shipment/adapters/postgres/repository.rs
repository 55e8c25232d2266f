//! `PostgreSQL` repository implementation for shipments.

use super::{models::ShipmentRow, schema::shipments};
use crate::shipment::{
    domain::{
        PersistedShipmentData, Shipment, ShipmentId, ShipmentReference, ShipmentStatus,
        TransportMode,
    },
    ports::{ShipmentRepository, ShipmentRepositoryError, ShipmentRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by shipment adapters.
pub type ShipmentPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed shipment repository.
#[derive(Debug, Clone)]
pub struct PostgresShipmentRepository {
    pool: ShipmentPgPool,
}

impl PostgresShipmentRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ShipmentPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ShipmentRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ShipmentRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ShipmentRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ShipmentRepositoryError::persistence)?
    }
}

#[async_trait]
impl ShipmentRepository for PostgresShipmentRepository {
    async fn store(&self, shipment: &Shipment) -> ShipmentRepositoryResult<()> {
        let shipment_id = shipment.id();
        let reference = shipment.reference().clone();
        let row = to_row(shipment)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(shipments::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_reference_unique_violation(info.as_ref()) =>
                    {
                        ShipmentRepositoryError::DuplicateReference(reference.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ShipmentRepositoryError::DuplicateShipment(shipment_id)
                    }
                    _ => ShipmentRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, shipment: &Shipment) -> ShipmentRepositoryResult<()> {
        let shipment_id = shipment.id();
        let expected_revision = shipment.revision().saturating_sub(1);
        let expected = to_i64(expected_revision)?;
        let row = to_row(shipment)?;

        self.run_blocking(move |connection| {
            let updated = diesel::update(
                shipments::table
                    .filter(shipments::id.eq(shipment_id.into_inner()))
                    .filter(shipments::revision.eq(expected)),
            )
            .set(&row)
            .execute(connection)
            .map_err(ShipmentRepositoryError::persistence)?;
            if updated > 0 {
                return Ok(());
            }

            let stored = shipments::table
                .find(shipment_id.into_inner())
                .select(shipments::revision)
                .first::<i64>(connection)
                .optional()
                .map_err(ShipmentRepositoryError::persistence)?
                .ok_or(ShipmentRepositoryError::NotFound(shipment_id))?;
            let found = u64::try_from(stored).map_err(ShipmentRepositoryError::persistence)?;
            Err(ShipmentRepositoryError::RevisionConflict {
                id: shipment_id,
                expected: expected_revision,
                found,
            })
        })
        .await
    }

    async fn find_by_id(&self, id: ShipmentId) -> ShipmentRepositoryResult<Option<Shipment>> {
        self.run_blocking(move |connection| {
            let row = shipments::table
                .find(id.into_inner())
                .select(ShipmentRow::as_select())
                .first::<ShipmentRow>(connection)
                .optional()
                .map_err(ShipmentRepositoryError::persistence)?;
            row.map(row_to_shipment).transpose()
        })
        .await
    }

    async fn find_by_reference(
        &self,
        reference: &ShipmentReference,
    ) -> ShipmentRepositoryResult<Option<Shipment>> {
        let reference_str = reference.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = shipments::table
                .filter(shipments::reference.eq(&reference_str))
                .select(ShipmentRow::as_select())
                .first::<ShipmentRow>(connection)
                .optional()
                .map_err(ShipmentRepositoryError::persistence)?;
            row.map(row_to_shipment).transpose()
        })
        .await
    }

    async fn list_lock_due(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> ShipmentRepositoryResult<Vec<Shipment>> {
        let row_limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.run_blocking(move |connection| {
            let rows = shipments::table
                .filter(shipments::status.eq(ShipmentStatus::Open.as_str()))
                .filter(shipments::lock_at.le(now))
                .order((shipments::lock_at.asc(), shipments::id.asc()))
                .limit(row_limit)
                .select(ShipmentRow::as_select())
                .load::<ShipmentRow>(connection)
                .map_err(ShipmentRepositoryError::persistence)?;
            rows.into_iter().map(row_to_shipment).collect()
        })
        .await
    }
}

fn to_i64(value: u64) -> ShipmentRepositoryResult<i64> {
    i64::try_from(value).map_err(ShipmentRepositoryError::persistence)
}

fn to_row(shipment: &Shipment) -> ShipmentRepositoryResult<ShipmentRow> {
    Ok(ShipmentRow {
        id: shipment.id().into_inner(),
        reference: shipment.reference().as_str().to_owned(),
        mode: shipment.mode().as_str().to_owned(),
        etd: shipment.etd(),
        status: shipment.status().as_str().to_owned(),
        lock_at: shipment.lock_at(),
        locked_at: shipment.locked_at(),
        revision: to_i64(shipment.revision())?,
        created_at: shipment.created_at(),
        updated_at: shipment.updated_at(),
    })
}

fn row_to_shipment(row: ShipmentRow) -> ShipmentRepositoryResult<Shipment> {
    let ShipmentRow {
        id,
        reference,
        mode,
        etd,
        status,
        lock_at,
        locked_at,
        revision,
        created_at,
        updated_at,
    } = row;

    let parsed_reference =
        ShipmentReference::new(reference).map_err(ShipmentRepositoryError::persistence)?;
    let parsed_mode =
        TransportMode::try_from(mode.as_str()).map_err(ShipmentRepositoryError::persistence)?;
    let parsed_status =
        ShipmentStatus::try_from(status.as_str()).map_err(ShipmentRepositoryError::persistence)?;

    Ok(Shipment::from_persisted(PersistedShipmentData {
        id: ShipmentId::from_uuid(id),
        reference: parsed_reference,
        mode: parsed_mode,
        etd,
        status: parsed_status,
        lock_at,
        locked_at,
        revision: u64::try_from(revision).map_err(ShipmentRepositoryError::persistence)?,
        created_at,
        updated_at,
    }))
}

fn is_reference_unique_violation(info: &dyn diesel::result::DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "idx_shipments_reference")
}
