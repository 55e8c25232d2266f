//! When steps for shipment lock BDD scenarios.

use super::world::{ShipmentLockWorld, run_async};
use chrono::TimeDelta;
use eyre::WrapErr;
use rstest_bdd_macros::when;

/// Moves the clock forward and runs one lock pass.
///
/// # Errors
///
/// Returns an error when the pass or the shipment reload fails.
pub fn advance_and_lock(world: &mut ShipmentLockWorld, hours: i64) -> Result<(), eyre::Report> {
    world.clock.advance(TimeDelta::hours(hours));
    let report = run_async(world.service.lock_due(100)).wrap_err("run lock pass")?;
    world.last_pass = Some(report);

    let reference = world.reference()?;
    let reloaded = run_async(world.service.find_by_reference(&reference))
        .wrap_err("reload shipment after lock pass")?
        .ok_or_else(|| eyre::eyre!("shipment vanished after lock pass"))?;
    world.shipment = Some(reloaded);
    Ok(())
}

#[when("{hours:i64} hours pass and the lock pass runs")]
fn hours_pass_and_lock(world: &mut ShipmentLockWorld, hours: i64) -> Result<(), eyre::Report> {
    advance_and_lock(world, hours)
}

#[when("the departure is moved by {hours:i64} hours")]
fn move_departure(world: &mut ShipmentLockWorld, hours: i64) -> Result<(), eyre::Report> {
    let shipment = world.shipment()?;
    let reference = shipment.reference().as_str().to_owned();
    let etd = shipment.etd() + TimeDelta::hours(hours);
    let result = run_async(world.service.reschedule(&reference, etd));
    if let Ok(ref updated) = result {
        world.shipment = Some(updated.clone());
    }
    world.last_edit_result = Some(result);
    Ok(())
}

#[when("the shipment is unlocked")]
fn unlock_shipment(world: &mut ShipmentLockWorld) -> Result<(), eyre::Report> {
    let reference = world.reference()?;
    let reopened =
        run_async(world.service.unlock(&reference)).wrap_err("unlock shipment in scenario")?;
    world.shipment = Some(reopened);
    Ok(())
}
