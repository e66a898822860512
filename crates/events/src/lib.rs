//! Event bus and notification delivery for the admin backend.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the event envelope published by handlers.
//! - [`delivery`]: outbound channels (SMTP email).
//! - [`NotificationDispatcher`]: background consumer that emails approved
//!   listings.

pub mod bus;
pub mod delivery;
pub mod dispatcher;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use dispatcher::NotificationDispatcher;
