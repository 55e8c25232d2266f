//! Then steps for shipment lock BDD scenarios.

use super::world::ShipmentLockWorld;
use freightdesk::shipment::{
    domain::{ShipmentDomainError, ShipmentStatus},
    services::ShipmentServiceError,
};
use rstest_bdd_macros::then;

#[then(r#"the shipment status is "{status}""#)]
fn shipment_status_is(world: &ShipmentLockWorld, status: String) -> Result<(), eyre::Report> {
    let expected = ShipmentStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let shipment = world.shipment()?;

    eyre::ensure!(
        shipment.status() == expected,
        "expected status {}, found {}",
        expected,
        shipment.status()
    );
    Ok(())
}

#[then("the lock pass locked {count:usize} shipments")]
fn lock_pass_locked(world: &ShipmentLockWorld, count: usize) -> Result<(), eyre::Report> {
    let report = world
        .last_pass
        .ok_or_else(|| eyre::eyre!("no lock pass has run"))?;

    eyre::ensure!(
        report.locked == count,
        "expected {count} locked shipments, got {report}"
    );
    Ok(())
}

#[then("the edit is rejected because the shipment is locked")]
fn edit_rejected_while_locked(world: &ShipmentLockWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_edit_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing edit result"))?;

    eyre::ensure!(
        matches!(
            result,
            Err(ShipmentServiceError::Domain(
                ShipmentDomainError::ShipmentLocked(_)
            ))
        ),
        "expected ShipmentLocked error, got {result:?}"
    );
    Ok(())
}
