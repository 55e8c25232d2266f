//! Notifier that keeps delivered messages in memory.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::card::ports::{
    CardNotification, CardNotifier, CardNotifierError, CardNotifierResult,
};

/// Records every notification it is asked to send.
///
/// A rejecting notifier refuses all messages, which lets tests exercise
/// delivery failures.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<CardNotification>>>,
    reject_reason: Option<String>,
}

impl RecordingNotifier {
    /// Creates a notifier that accepts every message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notifier that rejects every message with `reason`.
    #[must_use]
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            sent: Arc::default(),
            reject_reason: Some(reason.into()),
        }
    }

    /// Returns the notifications delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<CardNotification> {
        self.sent
            .read()
            .map(|sent| sent.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl CardNotifier for RecordingNotifier {
    async fn send(&self, notification: &CardNotification) -> CardNotifierResult<()> {
        if let Some(reason) = &self.reject_reason {
            return Err(CardNotifierError::Rejected {
                card_id: notification.card_id,
                reason: reason.clone(),
            });
        }
        let mut sent = self.sent.write().map_err(|err| {
            CardNotifierError::delivery(std::io::Error::other(err.to_string()))
        })?;
        sent.push(notification.clone());
        Ok(())
    }
}
