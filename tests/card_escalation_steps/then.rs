//! Then steps for card escalation BDD scenarios.

use super::world::CardEscalationWorld;
use freightdesk::card::{
    domain::{CardDomainError, CardStatus},
    services::CardServiceError,
};
use rstest_bdd_macros::then;

#[then(r#"the card status is "{status}""#)]
fn card_status_is(world: &CardEscalationWorld, status: String) -> Result<(), eyre::Report> {
    let expected = CardStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let card = world.card()?;

    eyre::ensure!(
        card.status() == expected,
        "expected status {}, found {}",
        expected,
        card.status()
    );
    Ok(())
}

#[then(r#"the card is held by "{handle}""#)]
fn card_is_held_by(world: &CardEscalationWorld, handle: String) -> Result<(), eyre::Report> {
    let card = world.card()?;

    eyre::ensure!(
        card.assignee().as_str() == handle,
        "expected card held by {handle}, found {}",
        card.assignee()
    );
    Ok(())
}

#[then(r#"the last notification is "{kind}""#)]
fn last_notification_is(world: &CardEscalationWorld, kind: String) -> Result<(), eyre::Report> {
    let sent = world.notifier.sent();
    let last = sent
        .last()
        .ok_or_else(|| eyre::eyre!("no notification was sent"))?;

    eyre::ensure!(
        last.kind.as_str() == kind,
        "expected {kind} notification, found {}",
        last.kind
    );
    Ok(())
}

#[then("the tick examined {count:usize} cards")]
fn tick_examined(world: &CardEscalationWorld, count: usize) -> Result<(), eyre::Report> {
    let report = world
        .last_tick
        .ok_or_else(|| eyre::eyre!("no tick has run"))?;

    eyre::ensure!(
        report.examined == count,
        "expected {count} examined cards, got {report}"
    );
    Ok(())
}

#[then("the reassignment fails because the assignee is already in the chain")]
fn reassignment_rejected(world: &CardEscalationWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_reassign_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing reassign result"))?;

    eyre::ensure!(
        matches!(
            result,
            Err(CardServiceError::Domain(
                CardDomainError::AssigneeAlreadyInChain { .. }
            ))
        ),
        "expected AssigneeAlreadyInChain error, got {result:?}"
    );
    Ok(())
}
