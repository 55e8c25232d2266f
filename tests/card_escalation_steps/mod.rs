//! Step definitions for card escalation scenarios.

pub mod given;
pub mod then;
