//! Freightdesk: card escalation and shipment lock engine for freight
//! operations.
//!
//! Operations staff work through task cards attached to shipments, RFQs,
//! quotes, invoices and customs filings. This crate owns the rules that
//! chase those cards through their deadlines and up their escalation
//! chains, and the rule that freezes shipments after departure.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//! - **Services**: Orchestration over ports with an injected clock
//!
//! # Modules
//!
//! - [`card`]: Task cards, escalation chains and the audit trail
//! - [`shipment`]: Shipments and their departure lock
//! - [`jobs`]: Periodic batch jobs and their runner
//! - [`config`]: Typed application configuration
//! - [`telemetry`]: Structured logging setup
//! - [`clock`]: Manually driven clock for deterministic scheduling

pub mod card;
pub mod clock;
pub mod config;
pub mod jobs;
pub mod shipment;
pub mod telemetry;
