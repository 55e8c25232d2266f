//! Task cards and their escalation engine.
//!
//! A card asks one operations user to act on a business record (shipment,
//! RFQ, quote, invoice, AMS filing, SIS booking) before its deadlines pass.
//! The scheduled tick moves overdue cards to warning and breach, hands
//! breached cards up their escalation chain, and records every move in an
//! idempotent audit trail. The module follows hexagonal architecture:
//!
//! - Domain types and the transition table in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
