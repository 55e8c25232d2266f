//! Shipment repository tests against `PostgreSQL`.

use super::helpers::{TestDatabase, database, ocean_shipment, start};
use chrono::TimeDelta;
use freightdesk::shipment::{
    domain::{Shipment, ShipmentId, ShipmentReference, ShipmentStatus},
    ports::{ShipmentRepository, ShipmentRepositoryError},
};
use rstest::rstest;

#[rstest]
fn store_and_find_by_reference(database: TestDatabase) {
    let shipment = ocean_shipment(&database.clock, "MSKU-100", start() + TimeDelta::days(3));
    database
        .runtime
        .block_on(database.shipments.store(&shipment))
        .expect("store succeeds");

    let by_id = database
        .runtime
        .block_on(database.shipments.find_by_id(shipment.id()))
        .expect("lookup succeeds");
    let by_reference = database
        .runtime
        .block_on(
            database
                .shipments
                .find_by_reference(&ShipmentReference::new("msku-100").expect("valid reference")),
        )
        .expect("lookup succeeds");

    assert_eq!(by_id, Some(shipment.clone()));
    assert_eq!(by_reference, Some(shipment));
}

#[rstest]
fn reused_references_map_to_duplicate_reference(database: TestDatabase) {
    let first = ocean_shipment(&database.clock, "MSKU-200", start() + TimeDelta::days(3));
    let second = ocean_shipment(&database.clock, "MSKU-200", start() + TimeDelta::days(5));
    database
        .runtime
        .block_on(database.shipments.store(&first))
        .expect("store succeeds");

    let reused = database.runtime.block_on(database.shipments.store(&second));
    let repeated = database.runtime.block_on(database.shipments.store(&first));

    assert!(matches!(
        reused,
        Err(ShipmentRepositoryError::DuplicateReference(ref reference))
            if reference.as_str() == "MSKU-200"
    ));
    assert!(matches!(
        repeated,
        Err(ShipmentRepositoryError::DuplicateShipment(_)
            | ShipmentRepositoryError::DuplicateReference(_))
    ));
}

#[rstest]
fn updates_check_the_stored_revision(database: TestDatabase) {
    let booked = ocean_shipment(&database.clock, "MSKU-300", start() + TimeDelta::days(1));
    database
        .runtime
        .block_on(database.shipments.store(&booked))
        .expect("store succeeds");
    let mut stale = booked.clone();
    let mut cancelled = booked.clone();
    cancelled.cancel(&database.clock).expect("cancel succeeds");
    database
        .runtime
        .block_on(database.shipments.update(&cancelled))
        .expect("update succeeds");

    database.clock.advance(TimeDelta::days(3));
    stale.lock(&database.clock).expect("stale copy still locks");
    let conflict = database.runtime.block_on(database.shipments.update(&stale));
    let mut ghost = ocean_shipment(&database.clock, "MSKU-301", start());
    ghost.cancel(&database.clock).expect("cancel succeeds");
    let missing = database.runtime.block_on(database.shipments.update(&ghost));

    assert!(matches!(
        conflict,
        Err(ShipmentRepositoryError::RevisionConflict {
            expected: 1,
            found: 2,
            ..
        })
    ));
    assert!(matches!(missing, Err(ShipmentRepositoryError::NotFound(id)) if id == ghost.id()));
    let stored = database
        .runtime
        .block_on(database.shipments.find_by_id(booked.id()))
        .expect("lookup succeeds")
        .expect("shipment exists");
    assert_eq!(stored.status(), ShipmentStatus::Cancelled);
}

#[rstest]
fn lock_due_lists_open_shipments_earliest_first(database: TestDatabase) {
    let late = ocean_shipment(&database.clock, "MSKU-401", start() + TimeDelta::days(2));
    let early = ocean_shipment(&database.clock, "MSKU-402", start() + TimeDelta::days(1));
    let future = ocean_shipment(&database.clock, "MSKU-403", start() + TimeDelta::days(9));
    let mut cancelled = ocean_shipment(&database.clock, "MSKU-404", start());
    for shipment in [&late, &early, &future, &cancelled] {
        database
            .runtime
            .block_on(database.shipments.store(shipment))
            .expect("store succeeds");
    }
    cancelled.cancel(&database.clock).expect("cancel succeeds");
    database
        .runtime
        .block_on(database.shipments.update(&cancelled))
        .expect("update succeeds");
    let now = start() + TimeDelta::days(4);

    let due = database
        .runtime
        .block_on(database.shipments.list_lock_due(now, 10))
        .expect("due query succeeds");
    let limited = database
        .runtime
        .block_on(database.shipments.list_lock_due(now, 1))
        .expect("due query succeeds");

    let ids: Vec<ShipmentId> = due.iter().map(Shipment::id).collect();
    assert_eq!(ids, vec![early.id(), late.id()]);
    let limited_ids: Vec<ShipmentId> = limited.iter().map(Shipment::id).collect();
    assert_eq!(limited_ids, vec![early.id()]);
}
