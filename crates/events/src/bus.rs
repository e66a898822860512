//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Shared as `Arc<EventBus>` through the application state.

use chrono::{DateTime, Utc};
use plug_core::record::Record;
use plug_core::transition::StatusTransition;
use plug_core::types::DbId;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// Something that happened to a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"record.approved"`.
    pub event_type: String,

    /// Entity the event concerns (e.g. `"consultants"`).
    pub entity: Option<String>,

    pub entity_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            entity: None,
            entity_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Event for an approval flip, carrying the record's contact fields.
    pub fn from_transition(transition: &StatusTransition, record: &Record) -> Self {
        let field = |name: &str| record.get(name).cloned().unwrap_or_default();
        Self::new(transition.event_type())
            .with_source(transition.entity, transition.id)
            .with_payload(json!({
                "column": transition.column,
                "from": transition.from,
                "to": transition.to,
                "name": field("name"),
                "email": field("email"),
            }))
    }

    /// Attach a source entity to the event.
    pub fn with_source(mut self, entity: impl Into<String>, entity_id: DbId) -> Self {
        self.entity = Some(entity.into());
        self.entity_id = Some(entity_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// A non-empty string field of the payload.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed messages are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: PlatformEvent) {
        // A send error only means there are no receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => Record::from_map(map),
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            PlatformEvent::new("record.created")
                .with_source("speakers", 42)
                .with_payload(json!({"key": "value"})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "record.created");
        assert_eq!(received.entity.as_deref(), Some("speakers"));
        assert_eq!(received.entity_id, Some(42));
        assert_eq!(received.payload["key"], "value");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(PlatformEvent::new("multi.test"));

        assert_eq!(rx1.recv().await.unwrap().event_type, "multi.test");
        assert_eq!(rx2.recv().await.unwrap().event_type, "multi.test");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(PlatformEvent::new("orphan.event"));
    }

    #[test]
    fn transition_event_carries_contact_fields() {
        let transition =
            StatusTransition::detect("consultants", 8, "is_approved", Some(false), Some(true))
                .unwrap();
        let event = PlatformEvent::from_transition(
            &transition,
            &record(json!({"id": 8, "name": "Priya", "email": "priya@example.com"})),
        );

        assert_eq!(event.event_type, "record.approved");
        assert_eq!(event.entity.as_deref(), Some("consultants"));
        assert_eq!(event.entity_id, Some(8));
        assert_eq!(event.payload_str("email"), Some("priya@example.com"));
        assert_eq!(event.payload_str("name"), Some("Priya"));
    }

    #[test]
    fn missing_payload_fields_read_as_none() {
        let transition =
            StatusTransition::detect("venue_partners", 2, "is_approved", None, Some(true))
                .unwrap();
        let event = PlatformEvent::from_transition(&transition, &record(json!({"id": 2})));
        assert_eq!(event.payload["email"], Value::Null);
        assert_eq!(event.payload_str("email"), None);
    }
}
