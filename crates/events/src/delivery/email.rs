//! Email notification delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport. If `SMTP_HOST`
//! is not set, [`EmailConfig::from_env`] returns `None` and no mailer is built.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use plug_core::transition::EVENT_RECORD_APPROVED;

use super::Notifier;
use crate::bus::PlatformEvent;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

const DEFAULT_FROM_ADDRESS: &str = "noreply@procurementplug.local";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable        | Required | Default                          |
    /// |-----------------|----------|----------------------------------|
    /// | `SMTP_HOST`     | yes      |                                  |
    /// | `SMTP_PORT`     | no       | `587`                            |
    /// | `SMTP_FROM`     | no       | `noreply@procurementplug.local`  |
    /// | `SMTP_USER`     | no       |                                  |
    /// | `SMTP_PASSWORD` | no       |                                  |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Message content
// ---------------------------------------------------------------------------

/// `"legal_compliance_experts"` -> `"legal compliance experts"`.
fn entity_label(event: &PlatformEvent) -> String {
    event
        .entity
        .as_deref()
        .unwrap_or("directory")
        .replace('_', " ")
}

/// Subject and plain-text body for an event notification.
pub fn compose(event: &PlatformEvent) -> (String, String) {
    let label = entity_label(event);
    let greeting = match event.payload_str("name") {
        Some(name) => format!("Hello {name},"),
        None => "Hello,".to_string(),
    };

    if event.event_type == EVENT_RECORD_APPROVED {
        (
            format!("[Procurement Plug] Your {label} listing is approved"),
            format!(
                "{greeting}\n\nYour listing in {label} has been approved and is now \
                 visible on Procurement Plug.\n"
            ),
        )
    } else {
        (
            format!("[Procurement Plug] {}", event.event_type),
            format!(
                "{greeting}\n\nEvent: {}\nListing: {label}\nTime: {}\n",
                event.event_type, event.timestamp
            ),
        )
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends notification emails via SMTP.
pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send a notification email for the given event to the specified address.
    pub async fn deliver(&self, to_email: &str, event: &PlatformEvent) -> Result<(), EmailError> {
        let (subject, body) = compose(event);

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = to_email, event_type = %event.event_type, "Notification email sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailDelivery {
    async fn notify(&self, to: &str, event: &PlatformEvent) -> Result<(), EmailError> {
        self.deliver(to, event).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
