//! Adapter implementations for the card context.

mod log_notifier;
pub mod memory;
pub mod postgres;

pub use log_notifier::LogNotifier;
