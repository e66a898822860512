//! Background consumer turning approval events into emails.
//!
//! Runs as a long-lived task subscribed to the [`EventBus`](crate::bus::EventBus)
//! and exits when the bus is dropped. Delivery failures are logged and never
//! reach the request that triggered the event.

use std::sync::Arc;

use plug_core::transition::EVENT_RECORD_APPROVED;
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;
use crate::delivery::Notifier;

/// What the dispatcher did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Sent,
    /// Not an approval, or the record has no email address.
    Ignored,
    /// No mailer configured.
    Skipped,
    Failed,
}

pub struct NotificationDispatcher {
    notifier: Option<Arc<dyn Notifier>>,
}

impl NotificationDispatcher {
    /// `notifier` is `None` when SMTP is not configured; approvals are then
    /// logged and skipped.
    pub fn new(notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self { notifier }
    }

    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.handle(&event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification dispatcher lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    pub async fn handle(&self, event: &PlatformEvent) -> Dispatch {
        if event.event_type != EVENT_RECORD_APPROVED {
            return Dispatch::Ignored;
        }
        let Some(to) = event.payload_str("email") else {
            tracing::debug!(
                entity = ?event.entity,
                id = ?event.entity_id,
                "Approved record has no email, skipping notification"
            );
            return Dispatch::Ignored;
        };
        let Some(notifier) = &self.notifier else {
            tracing::info!(
                entity = ?event.entity,
                id = ?event.entity_id,
                "SMTP not configured, approval email not sent"
            );
            return Dispatch::Skipped;
        };

        match notifier.notify(to, event).await {
            Ok(()) => Dispatch::Sent,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    entity = ?event.entity,
                    id = ?event.entity_id,
                    "Failed to send approval email"
                );
                Dispatch::Failed
            }
        }
    }
}
