//! In-memory adapters for the card context.

mod notifier;
mod repository;

pub use notifier::RecordingNotifier;
pub use repository::InMemoryCardRepository;
