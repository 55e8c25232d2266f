//! Port contracts for the card context.
//!
//! Ports define infrastructure-agnostic interfaces used by card services.

pub mod notifier;
pub mod repository;

pub use notifier::{
    CardNotification, CardNotifier, CardNotifierError, CardNotifierResult, NotificationKind,
};
pub use repository::{CardRepository, CardRepositoryError, CardRepositoryResult};
