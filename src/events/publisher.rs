//! Broadcast publisher behind every registry's event channel.
//!
//! ```rust
//! use component_registry::events::EventPublisher;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let publisher = EventPublisher::new(16);
//! let mut receiver = publisher.subscribe();
//!
//! publisher.publish("object.created", json!({"name": "clock"})).unwrap();
//! assert_eq!(receiver.recv().await.unwrap().context_str("name"), Some("clock"));
//! # });
//! ```

use serde_json::Value;
use tokio::sync::broadcast;

/// Broadcast publisher for container lifecycle events.
///
/// Publishing never blocks and never fails for lack of subscribers, so it is
/// safe to call from inside object construction and shutdown.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<PublishedEvent>,
}

/// Event that has been published
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub name: String,
    pub context: Value,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl PublishedEvent {
    /// String field of the event context, if present
    pub fn context_str(&self, key: &str) -> Option<&str> {
        self.context.get(key).and_then(Value::as_str)
    }
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event with the given name and context
    pub fn publish(&self, event_name: impl Into<String>, context: Value) -> Result<(), PublishError> {
        let event = PublishedEvent {
            name: event_name.into(),
            context,
            published_at: chrono::Utc::now(),
        };

        // No subscribers is not an error for container events
        match self.sender.send(event) {
            Ok(_) => Ok(()),
            Err(broadcast::error::SendError(_)) => Ok(()),
        }
    }

    /// Publish a serializable payload as the event context
    pub fn publish_serialized<T: serde::Serialize>(
        &self,
        event_name: impl Into<String>,
        payload: &T,
    ) -> Result<(), PublishError> {
        let context = serde_json::to_value(payload)?;
        self.publish(event_name, context)
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Error types for event publishing
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Event channel is closed")]
    ChannelClosed,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(crate::constants::system::DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}
