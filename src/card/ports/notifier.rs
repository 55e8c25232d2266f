//! Outbound notification port for card events.

use crate::card::domain::{AssigneeId, CardId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notifier operations.
pub type CardNotifierResult<T> = Result<T, CardNotifierError>;

/// Reason a notification is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A card was opened for its owner.
    Assigned,
    /// The warning deadline passed.
    Warning,
    /// The breach deadline passed.
    Breached,
    /// A breached card moved up its chain.
    Escalated,
    /// The card was handed to another assignee.
    Reassigned,
    /// The card was completed.
    Completed,
}

impl NotificationKind {
    /// Returns the canonical name, also used as the template prefix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Warning => "warning",
            Self::Breached => "breached",
            Self::Escalated => "escalated",
            Self::Reassigned => "reassigned",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendered message about a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardNotification {
    /// Card the message concerns.
    pub card_id: CardId,
    /// Reason for the message.
    pub kind: NotificationKind,
    /// Distinct recipients.
    pub recipients: Vec<AssigneeId>,
    /// Rendered subject line.
    pub subject: String,
    /// Rendered body.
    pub body: String,
}

/// Delivery contract for the external notification service.
#[async_trait]
pub trait CardNotifier: Send + Sync {
    /// Delivers a notification.
    async fn send(&self, notification: &CardNotification) -> CardNotifierResult<()>;
}

/// Errors returned by notifier adapters.
#[derive(Debug, Clone, Error)]
pub enum CardNotifierError {
    /// The service refused the message.
    #[error("notification for card {card_id} rejected: {reason}")]
    Rejected {
        /// Card identifier.
        card_id: CardId,
        /// Reason reported by the service.
        reason: String,
    },

    /// Transport or service failure.
    #[error("notification delivery failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl CardNotifierError {
    /// Wraps a delivery failure.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
