//! Given steps for card escalation BDD scenarios.

use super::when::advance_and_tick;
use super::world::{CardEscalationWorld, run_async};
use eyre::WrapErr;
use freightdesk::card::{
    domain::{Actor, AssigneeId},
    services::OpenCardRequest,
};
use rstest_bdd_macros::given;

#[given(r#"a card on shipment "{reference}" owned by "{owner}" escalating to "{next}""#)]
fn card_on_shipment(
    world: &mut CardEscalationWorld,
    reference: String,
    owner: String,
    next: String,
) -> Result<(), eyre::Report> {
    let request = OpenCardRequest::new("shipment", reference, "Release cargo", owner)
        .with_escalations([next]);
    let card = run_async(world.service.open(request)).wrap_err("open card for scenario")?;
    world.card = Some(card);
    Ok(())
}

#[given(r#"the card has been completed by "{handle}""#)]
fn card_completed_by(world: &mut CardEscalationWorld, handle: String) -> Result<(), eyre::Report> {
    let card_id = world.card()?.id();
    let actor = Actor::User(AssigneeId::new(handle)?);
    let completed = run_async(world.service.complete(card_id, &actor))
        .wrap_err("complete card in scenario setup")?;
    world.card = Some(completed);
    Ok(())
}

#[given("{hours:i64} hours have passed and the escalation tick has run")]
fn hours_passed_and_ticked(world: &mut CardEscalationWorld, hours: i64) -> Result<(), eyre::Report> {
    advance_and_tick(world, hours)
}
