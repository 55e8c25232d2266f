//! In-memory integration tests for card escalation through the tick job.

use super::helpers::{Desk, customs_card, desk, handle, start};
use chrono::TimeDelta;
use freightdesk::card::{
    domain::{Actor, CardAuditEntry, CardStatus, CardTrigger},
    ports::NotificationKind,
    services::{OpenCardRequest, TickReport},
};
use freightdesk::jobs::{CardTickJob, JobOutcome, ScheduledJob};
use rstest::rstest;

async fn tick(job: &impl ScheduledJob) -> TickReport {
    let outcome = job.run_once().await.expect("tick job runs");
    let JobOutcome::CardTick(report) = outcome else {
        panic!("expected a card tick outcome");
    };
    report
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unattended_card_climbs_the_chain_until_completed(desk: Desk) {
    let Desk {
        cards,
        notifier,
        clock,
        ..
    } = desk;
    let card = cards
        .open(customs_card("CUS-77", "maria", &["omar", "li"]))
        .await
        .expect("card opens");
    let job = CardTickJob::new(cards.clone(), 100);

    clock.advance(TimeDelta::hours(4));
    assert_eq!(tick(&job).await.warned, 1);

    clock.advance(TimeDelta::hours(4));
    let breach = tick(&job).await;
    assert_eq!((breach.breached, breach.escalated), (1, 1));

    clock.advance(TimeDelta::hours(2));
    assert_eq!(tick(&job).await.examined, 0);

    clock.advance(TimeDelta::hours(2));
    assert_eq!(tick(&job).await.escalated, 1);

    let held = cards
        .list_for_assignee("li", false)
        .await
        .expect("listing succeeds");
    assert_eq!(held.len(), 1);

    let completed = cards
        .complete(card.id(), &Actor::User(handle("li")))
        .await
        .expect("complete succeeds");
    assert_eq!(completed.status(), CardStatus::Completed);
    assert_eq!(completed.closed_at(), Some(start() + TimeDelta::hours(12)));

    let history = cards.history(card.id()).await.expect("history loads");
    let revisions: Vec<u64> = history.iter().map(CardAuditEntry::revision).collect();
    assert_eq!(revisions, vec![2, 3, 4, 5]);
    assert!(history.iter().all(CardAuditEntry::verify));
    let last = history.last().expect("completion entry");
    assert_eq!(last.transition().trigger, CardTrigger::Complete);
    assert_eq!(last.transition().actor, Actor::User(handle("li")));

    let kinds: Vec<NotificationKind> = notifier.sent().iter().map(|sent| sent.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::Assigned,
            NotificationKind::Warning,
            NotificationKind::Breached,
            NotificationKind::Escalated,
            NotificationKind::Completed,
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reassigned_card_restarts_its_deadlines(desk: Desk) {
    let Desk { cards, clock, .. } = desk;
    let card = cards
        .open(customs_card("CUS-78", "maria", &["omar"]))
        .await
        .expect("card opens");
    let job = CardTickJob::new(cards.clone(), 100);

    clock.advance(TimeDelta::hours(5));
    assert_eq!(tick(&job).await.warned, 1);

    let reassigned = cards
        .reassign(card.id(), "priya", &Actor::User(handle("maria")))
        .await
        .expect("reassign succeeds");
    assert_eq!(reassigned.status(), CardStatus::Created);
    assert_eq!(
        reassigned.deadlines().warning_at(),
        start() + TimeDelta::hours(9)
    );

    clock.advance(TimeDelta::hours(3));
    assert_eq!(tick(&job).await.examined, 0);

    clock.advance(TimeDelta::hours(5));
    let report = tick(&job).await;
    assert_eq!(report.breached, 1);
    let stored = cards
        .find_by_id(card.id())
        .await
        .expect("lookup succeeds")
        .expect("card exists");
    assert_eq!(stored.assignee(), &handle("omar"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cards_on_one_shipment_are_listed_together(desk: Desk) {
    let Desk { cards, .. } = desk;
    for title in ["Book haulage", "Send pre-alert"] {
        cards
            .open(OpenCardRequest::new("shipment", "SHP-4410", title, "maria"))
            .await
            .expect("card opens");
    }
    cards
        .open(customs_card("CUS-79", "maria", &[]))
        .await
        .expect("card opens");

    let on_shipment = cards
        .list_for_subject("shipment", "SHP-4410")
        .await
        .expect("listing succeeds");
    let held = cards
        .list_for_assignee("maria", false)
        .await
        .expect("listing succeeds");

    assert_eq!(on_shipment.len(), 2);
    assert_eq!(held.len(), 3);
}
