//! Card repository tests against `PostgreSQL`.

use super::helpers::{TestDatabase, database, filing_card};
use chrono::TimeDelta;
use diesel::prelude::*;
use freightdesk::card::{
    domain::{Actor, AssigneeId, Card, CardAuditEntry, CardId, CardTransition, CardTrigger},
    ports::{CardRepository, CardRepositoryError},
};
use mockable::Clock;
use rstest::rstest;

#[rstest]
fn store_and_find_round_trip(database: TestDatabase) {
    let card = filing_card(&database.clock, "AMS-100");

    database
        .runtime
        .block_on(database.cards.store(&card))
        .expect("store succeeds");
    let found = database
        .runtime
        .block_on(database.cards.find_by_id(card.id()))
        .expect("lookup succeeds");
    let missing = database
        .runtime
        .block_on(database.cards.find_by_id(CardId::new()))
        .expect("lookup succeeds");

    assert_eq!(found, Some(card));
    assert!(missing.is_none());
}

#[rstest]
fn storing_a_card_twice_is_a_duplicate(database: TestDatabase) {
    let card = filing_card(&database.clock, "AMS-101");
    database
        .runtime
        .block_on(database.cards.store(&card))
        .expect("store succeeds");

    let result = database.runtime.block_on(database.cards.store(&card));

    assert!(matches!(
        result,
        Err(CardRepositoryError::DuplicateCard(id)) if id == card.id()
    ));
}

#[rstest]
fn committed_transitions_are_recorded_and_replays_accepted(database: TestDatabase) {
    let card = filing_card(&database.clock, "AMS-102");
    database
        .runtime
        .block_on(database.cards.store(&card))
        .expect("store succeeds");
    database.clock.advance(TimeDelta::minutes(31));
    let mut warned = card.clone();
    let entry = CardAuditEntry::record(
        warned
            .apply(CardTrigger::WarningDeadlinePassed, &Actor::System, &database.clock)
            .expect("warning fires"),
    )
    .expect("entry encodes");

    database
        .runtime
        .block_on(database.cards.commit_transition(&warned, &entry))
        .expect("commit succeeds");
    database
        .runtime
        .block_on(database.cards.commit_transition(&warned, &entry))
        .expect("replay is accepted");

    let stored = database
        .runtime
        .block_on(database.cards.find_by_id(card.id()))
        .expect("lookup succeeds");
    assert_eq!(stored, Some(warned));
    let history = database
        .runtime
        .block_on(database.cards.history(card.id()))
        .expect("history loads");
    assert_eq!(history, vec![entry]);
    assert!(history.iter().all(CardAuditEntry::verify));
}

#[rstest]
fn divergent_commit_at_a_committed_revision_is_an_audit_conflict(database: TestDatabase) {
    let card = filing_card(&database.clock, "AMS-103");
    database
        .runtime
        .block_on(database.cards.store(&card))
        .expect("store succeeds");
    let mut first = card.clone();
    let first_entry = CardAuditEntry::record(
        first
            .complete(&Actor::System, &database.clock)
            .expect("complete succeeds"),
    )
    .expect("entry encodes");
    database
        .runtime
        .block_on(database.cards.commit_transition(&first, &first_entry))
        .expect("first commit succeeds");

    database.clock.advance(TimeDelta::seconds(1));
    let mut second = card.clone();
    let second_entry = CardAuditEntry::record(
        second
            .complete(&Actor::System, &database.clock)
            .expect("complete succeeds"),
    )
    .expect("entry encodes");
    let result = database
        .runtime
        .block_on(database.cards.commit_transition(&second, &second_entry));

    assert!(matches!(
        result,
        Err(CardRepositoryError::AuditConflict { card_id, revision: 2 }) if card_id == card.id()
    ));
    let history = database
        .runtime
        .block_on(database.cards.history(card.id()))
        .expect("history loads");
    assert_eq!(history, vec![first_entry]);
}

/// Stores `card` and commits `transition` applied to a copy of it.
fn store_and_commit(
    database: &TestDatabase,
    card: &Card,
    transition: impl FnOnce(&mut Card) -> CardTransition,
) -> Card {
    database
        .runtime
        .block_on(database.cards.store(card))
        .expect("store succeeds");
    let mut advanced = card.clone();
    let entry = CardAuditEntry::record(transition(&mut advanced)).expect("entry encodes");
    database
        .runtime
        .block_on(database.cards.commit_transition(&advanced, &entry))
        .expect("commit succeeds");
    advanced
}

#[rstest]
fn stale_commits_are_revision_conflicts(database: TestDatabase) {
    let card = filing_card(&database.clock, "AMS-104");
    let clock = database.clock.clone();
    let reassigned = store_and_commit(&database, &card, |copy| {
        copy.reassign(
            AssigneeId::new("dave").expect("valid assignee"),
            &Actor::System,
            &clock,
        )
        .expect("reassign succeeds")
    });
    let mut completed = reassigned.clone();
    let completed_entry = CardAuditEntry::record(
        completed
            .complete(&Actor::System, &database.clock)
            .expect("complete succeeds"),
    )
    .expect("entry encodes");
    database
        .runtime
        .block_on(database.cards.commit_transition(&completed, &completed_entry))
        .expect("commit succeeds");

    database.clock.advance(TimeDelta::minutes(31));
    let mut stale = card.clone();
    let stale_entry = CardAuditEntry::record(
        stale
            .apply(CardTrigger::WarningDeadlinePassed, &Actor::System, &database.clock)
            .expect("stale copy still warns"),
    )
    .expect("entry encodes");
    let result = database
        .runtime
        .block_on(database.cards.commit_transition(&stale, &stale_entry));

    assert!(matches!(
        result,
        Err(CardRepositoryError::RevisionConflict {
            expected: 1,
            found: 3,
            ..
        })
    ));
}

#[rstest]
fn unknown_cards_cannot_be_committed(database: TestDatabase) {
    let mut card = filing_card(&database.clock, "AMS-105");
    let entry = CardAuditEntry::record(
        card.complete(&Actor::System, &database.clock)
            .expect("complete succeeds"),
    )
    .expect("entry encodes");

    let result = database
        .runtime
        .block_on(database.cards.commit_transition(&card, &entry));

    assert!(matches!(result, Err(CardRepositoryError::NotFound(id)) if id == card.id()));
}

#[rstest]
fn due_cards_are_listed_earliest_deadline_first(database: TestDatabase) {
    let later = filing_card(&database.clock, "AMS-201");
    database.clock.advance(TimeDelta::minutes(-10));
    let earliest = filing_card(&database.clock, "AMS-202");
    database.clock.advance(TimeDelta::minutes(5));
    let middle = filing_card(&database.clock, "AMS-203");
    let clock = database.clock.clone();
    store_and_commit(&database, &filing_card(&clock, "AMS-204"), |copy| {
        copy.complete(&Actor::System, &clock)
            .expect("complete succeeds")
    });
    for card in [&later, &earliest, &middle] {
        database
            .runtime
            .block_on(database.cards.store(card))
            .expect("store succeeds");
    }
    let now = database.clock.utc() + TimeDelta::minutes(40);

    let due = database
        .runtime
        .block_on(database.cards.list_due(now, 10))
        .expect("due query succeeds");
    let limited = database
        .runtime
        .block_on(database.cards.list_due(now, 2))
        .expect("due query succeeds");
    let none_yet = database
        .runtime
        .block_on(database.cards.list_due(now - TimeDelta::hours(1), 10))
        .expect("due query succeeds");

    let ids: Vec<CardId> = due.iter().map(Card::id).collect();
    assert_eq!(ids, vec![earliest.id(), middle.id(), later.id()]);
    let limited_ids: Vec<CardId> = limited.iter().map(Card::id).collect();
    assert_eq!(limited_ids, vec![earliest.id(), middle.id()]);
    assert!(none_yet.is_empty());
}

#[rstest]
fn assignee_listing_hides_closed_cards_unless_asked(database: TestDatabase) {
    let open = filing_card(&database.clock, "AMS-301");
    database
        .runtime
        .block_on(database.cards.store(&open))
        .expect("store succeeds");
    database.clock.advance(TimeDelta::minutes(1));
    let clock = database.clock.clone();
    let closed = store_and_commit(&database, &filing_card(&clock, "AMS-302"), |copy| {
        copy.complete(&Actor::System, &clock)
            .expect("complete succeeds")
    });
    let alice = AssigneeId::new("alice").expect("valid assignee");

    let open_only = database
        .runtime
        .block_on(database.cards.list_by_assignee(&alice, false))
        .expect("listing succeeds");
    let everything = database
        .runtime
        .block_on(database.cards.list_by_assignee(&alice, true))
        .expect("listing succeeds");

    assert_eq!(open_only, vec![open.clone()]);
    assert_eq!(everything, vec![closed, open]);
}

#[rstest]
fn rows_with_stale_query_columns_are_rejected(database: TestDatabase) {
    let card = filing_card(&database.clock, "AMS-401");
    database
        .runtime
        .block_on(database.cards.store(&card))
        .expect("store succeeds");
    let mut conn = PgConnection::establish(&database.url).expect("direct connection");
    diesel::sql_query("UPDATE cards SET current_assignee = 'mallory' WHERE id = $1")
        .bind::<diesel::sql_types::Uuid, _>(card.id().into_inner())
        .execute(&mut conn)
        .expect("row updated");

    let result = database
        .runtime
        .block_on(database.cards.find_by_id(card.id()));

    assert!(matches!(result, Err(CardRepositoryError::Persistence(_))));
}
