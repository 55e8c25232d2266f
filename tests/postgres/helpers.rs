//! Shared fixtures and builders for `PostgreSQL` integration tests.

use super::cluster::{
    BoxError, CleanupGuard, TestCluster, create_from_template, ensure_template,
    shared_test_cluster,
};
use chrono::{DateTime, TimeZone, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use freightdesk::card::{
    adapters::postgres::PostgresCardRepository,
    domain::{AssigneeId, Card, CardSubject, CardTitle, EscalationChain, EscalationPolicy, SubjectKind},
};
use freightdesk::clock::ManualClock;
use freightdesk::shipment::{
    adapters::postgres::PostgresShipmentRepository,
    domain::{LockPolicy, Shipment, ShipmentReference, TransportMode},
};
use rstest::fixture;
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Repositories bound to a throwaway database.
///
/// Field order matters: the pool closes before the database is dropped.
pub struct TestDatabase {
    pub url: String,
    pub runtime: Runtime,
    pub cards: PostgresCardRepository,
    pub shipments: PostgresShipmentRepository,
    pub clock: ManualClock,
    _cleanup: CleanupGuard,
}

/// Monday 2026-06-01 09:00 UTC.
#[must_use]
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0)
        .single()
        .expect("valid start timestamp")
}

fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

fn setup_database(cluster: &'static TestCluster) -> Result<TestDatabase, BoxError> {
    ensure_template(cluster)?;
    let db_name = format!("freightdesk_{}", Uuid::new_v4().simple());
    let cleanup = CleanupGuard::new(cluster, db_name.clone());
    let url = create_from_template(cluster, &db_name)?;
    let manager = ConnectionManager::<PgConnection>::new(url.clone());
    let pool = Pool::builder()
        .max_size(2)
        .build(manager)
        .map_err(|e| Box::new(e) as BoxError)?;

    Ok(TestDatabase {
        url,
        runtime: test_runtime(),
        cards: PostgresCardRepository::new(pool.clone()),
        shipments: PostgresShipmentRepository::new(pool),
        clock: ManualClock::new(start()),
        _cleanup: cleanup,
    })
}

/// Provides repositories over a freshly migrated database.
#[fixture]
pub fn database(shared_test_cluster: &'static TestCluster) -> TestDatabase {
    setup_database(shared_test_cluster).expect("test database setup")
}

/// Warning after 30 minutes, breach after 60, re-escalate every 30.
#[must_use]
pub fn escalation_policy() -> EscalationPolicy {
    EscalationPolicy::from_minutes(30, 60, 30).expect("valid escalation policy")
}

/// Opens an AMS filing card on `reference` owned by alice, escalating to bob.
#[must_use]
pub fn filing_card(clock: &ManualClock, reference: &str) -> Card {
    let chain = EscalationChain::new(
        ["alice", "bob"]
            .into_iter()
            .map(|handle| AssigneeId::new(handle).expect("valid assignee")),
    )
    .expect("valid chain");
    Card::open(
        CardSubject::new(SubjectKind::AmsFiling, reference).expect("valid subject"),
        CardTitle::new("File export declaration").expect("valid title"),
        chain,
        escalation_policy(),
        clock,
    )
    .expect("card opens")
}

/// Books an ocean shipment departing `etd` with a 24 hour lock.
#[must_use]
pub fn ocean_shipment(clock: &ManualClock, reference: &str, etd: DateTime<Utc>) -> Shipment {
    Shipment::book(
        ShipmentReference::new(reference).expect("valid reference"),
        TransportMode::Ocean,
        etd,
        LockPolicy::from_hours(24).expect("valid lock policy"),
        clock,
    )
    .expect("shipment books")
}
