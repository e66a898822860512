//! Outbound delivery channels for notifications.

use async_trait::async_trait;

use crate::bus::PlatformEvent;

pub mod email;

pub use email::EmailError;

/// Sends a notification about `event` to one recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, to: &str, event: &PlatformEvent) -> Result<(), EmailError>;
}
