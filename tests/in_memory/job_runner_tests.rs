//! In-memory integration tests for the periodic job runner.

use std::time::Duration;

use super::helpers::{Desk, customs_card, desk, start};
use chrono::TimeDelta;
use freightdesk::card::domain::CardStatus;
use freightdesk::jobs::{CardTickJob, JobRunner, ShipmentLockJob};
use freightdesk::shipment::{domain::ShipmentStatus, services::BookShipmentRequest};
use rstest::rstest;
use tokio::sync::watch;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn runners_drive_both_jobs_until_shutdown(desk: Desk) {
    let Desk {
        cards,
        shipments,
        clock,
        ..
    } = desk;
    let card = cards
        .open(customs_card("CUS-90", "maria", &["omar"]))
        .await
        .expect("card opens");
    shipments
        .book(BookShipmentRequest::new("ROAD-90", "road", start()))
        .await
        .expect("shipment books");
    clock.advance(TimeDelta::hours(48));

    let (shutdown, receiver) = watch::channel(false);
    let card_runner = JobRunner::new(receiver.clone());
    let shipment_runner = JobRunner::new(receiver);
    let card_job = CardTickJob::new(cards.clone(), 10);
    let shipment_job = ShipmentLockJob::new(shipments.clone(), 10);
    let card_task = tokio::spawn(async move {
        card_runner
            .run(&card_job, Duration::from_millis(10))
            .await
    });
    let shipment_task = tokio::spawn(async move {
        shipment_runner
            .run(&shipment_job, Duration::from_millis(10))
            .await
    });

    tokio::time::sleep(Duration::from_millis(60)).await;
    shutdown.send_replace(true);
    let card_summary = card_task.await.expect("card runner joins");
    let shipment_summary = shipment_task.await.expect("shipment runner joins");

    assert!(card_summary.succeeded >= 1);
    assert!(shipment_summary.succeeded >= 1);
    assert_eq!(card_summary.failed + shipment_summary.failed, 0);

    let stored = cards
        .find_by_id(card.id())
        .await
        .expect("lookup succeeds")
        .expect("card exists");
    assert_eq!(stored.status(), CardStatus::Breached);
    let locked = shipments
        .find_by_reference("ROAD-90")
        .await
        .expect("lookup succeeds")
        .expect("shipment exists");
    assert_eq!(locked.status(), ShipmentStatus::Locked);
}
