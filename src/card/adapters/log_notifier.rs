//! Notifier that writes card notifications to the log.
//!
//! Used when no notification service is configured, so deployments still
//! surface warnings and escalations.

use async_trait::async_trait;
use tracing::info;

use crate::card::ports::{CardNotification, CardNotifier, CardNotifierResult};

/// Emits each notification as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl CardNotifier for LogNotifier {
    async fn send(&self, notification: &CardNotification) -> CardNotifierResult<()> {
        let recipients = notification
            .recipients
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        info!(
            card_id = %notification.card_id,
            kind = %notification.kind,
            recipients = %recipients,
            subject = %notification.subject,
            "card notification"
        );
        Ok(())
    }
}
