//! Given steps for shipment lock BDD scenarios.

use super::when::advance_and_lock;
use super::world::{ShipmentLockWorld, run_async};
use chrono::TimeDelta;
use eyre::WrapErr;
use freightdesk::shipment::services::BookShipmentRequest;
use rstest_bdd_macros::given;

#[given(r#"shipment "{reference}" travelling by "{mode}" departs in {hours:i64} hours"#)]
fn shipment_departs_in(
    world: &mut ShipmentLockWorld,
    reference: String,
    mode: String,
    hours: i64,
) -> Result<(), eyre::Report> {
    let etd = world.start + TimeDelta::hours(hours);
    let booked = run_async(world.service.book(BookShipmentRequest::new(reference, mode, etd)))
        .wrap_err("book shipment for scenario")?;
    world.shipment = Some(booked);
    Ok(())
}

#[given("{hours:i64} hours have passed and the lock pass has run")]
fn hours_passed_and_locked(world: &mut ShipmentLockWorld, hours: i64) -> Result<(), eyre::Report> {
    advance_and_lock(world, hours)
}

#[given("the shipment has been cancelled")]
fn shipment_cancelled(world: &mut ShipmentLockWorld) -> Result<(), eyre::Report> {
    let reference = world.reference()?;
    let cancelled = run_async(world.service.cancel(&reference))
        .wrap_err("cancel shipment in scenario setup")?;
    world.shipment = Some(cancelled);
    Ok(())
}
