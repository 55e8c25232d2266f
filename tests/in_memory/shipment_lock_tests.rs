//! In-memory integration tests for shipment booking and the departure lock.

use super::helpers::{Desk, desk, start};
use chrono::TimeDelta;
use freightdesk::jobs::{JobOutcome, ScheduledJob, ShipmentLockJob};
use freightdesk::shipment::{
    domain::{ShipmentDomainError, ShipmentStatus, TransportMode},
    services::{BookShipmentRequest, LockReport, ShipmentServiceError},
};
use rstest::rstest;

async fn lock_pass(job: &impl ScheduledJob) -> LockReport {
    let outcome = job.run_once().await.expect("lock job runs");
    let JobOutcome::ShipmentLock(report) = outcome else {
        panic!("expected a shipment lock outcome");
    };
    report
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn departed_shipment_locks_and_can_be_reopened(desk: Desk) {
    let Desk {
        shipments, clock, ..
    } = desk;
    let booked = shipments
        .book(BookShipmentRequest::new(
            "msku-2210",
            "ocean",
            start() + TimeDelta::hours(24),
        ))
        .await
        .expect("shipment books");
    assert_eq!(booked.reference().as_str(), "MSKU-2210");
    assert_eq!(booked.mode(), TransportMode::Ocean);
    assert_eq!(booked.lock_at(), start() + TimeDelta::hours(72));
    let job = ShipmentLockJob::new(shipments.clone(), 50);

    clock.advance(TimeDelta::hours(71));
    assert_eq!(lock_pass(&job).await, LockReport::default());

    clock.advance(TimeDelta::hours(1));
    let report = lock_pass(&job).await;
    assert_eq!((report.examined, report.locked), (1, 1));

    let edit = shipments
        .reschedule("MSKU-2210", start() + TimeDelta::hours(96))
        .await;
    assert!(matches!(
        edit,
        Err(ShipmentServiceError::Domain(ShipmentDomainError::ShipmentLocked(_)))
    ));

    let reopened = shipments.unlock("MSKU-2210").await.expect("unlock succeeds");
    assert_eq!(reopened.status(), ShipmentStatus::Open);
    assert_eq!(reopened.locked_at(), None);
    assert_eq!(reopened.lock_at(), start() + TimeDelta::hours(120));

    clock.advance(TimeDelta::hours(24));
    assert_eq!(lock_pass(&job).await.examined, 0);

    let rescheduled = shipments
        .reschedule("MSKU-2210", start() + TimeDelta::hours(100))
        .await
        .expect("open shipment reschedules");
    assert_eq!(rescheduled.lock_at(), start() + TimeDelta::hours(148));
    assert_eq!(rescheduled.revision(), 4);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lock_pass_only_touches_due_open_shipments(desk: Desk) {
    let Desk {
        shipments, clock, ..
    } = desk;
    for (reference, hours) in [("AIR-1", 1), ("AIR-2", 2), ("ROAD-3", 200)] {
        shipments
            .book(BookShipmentRequest::new(
                reference,
                "air",
                start() + TimeDelta::hours(hours),
            ))
            .await
            .expect("shipment books");
    }
    shipments.cancel("AIR-2").await.expect("cancel succeeds");
    let job = ShipmentLockJob::new(shipments.clone(), 50);

    clock.advance(TimeDelta::days(3));
    let report = lock_pass(&job).await;

    assert_eq!(report.examined, 1);
    assert_eq!(report.locked, 1);
    let cancelled = shipments
        .find_by_reference("AIR-2")
        .await
        .expect("lookup succeeds")
        .expect("shipment exists");
    assert_eq!(cancelled.status(), ShipmentStatus::Cancelled);
    let far_off = shipments
        .find_by_reference("ROAD-3")
        .await
        .expect("lookup succeeds")
        .expect("shipment exists");
    assert_eq!(far_off.status(), ShipmentStatus::Open);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn booking_rejects_duplicates_and_unknown_modes(desk: Desk) {
    let Desk { shipments, .. } = desk;
    let etd = start() + TimeDelta::days(2);
    shipments
        .book(BookShipmentRequest::new("RAIL-88", "rail", etd))
        .await
        .expect("shipment books");

    let duplicate = shipments
        .book(BookShipmentRequest::new("rail-88", "rail", etd))
        .await;
    let unknown_mode = shipments
        .book(BookShipmentRequest::new("SEA-1", "barge", etd))
        .await;

    assert!(matches!(duplicate, Err(ShipmentServiceError::Repository(_))));
    assert!(matches!(
        unknown_mode,
        Err(ShipmentServiceError::TransportMode(_))
    ));
}
