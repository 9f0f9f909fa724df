//! Real-time import notifications via a broadcast channel.
//!
//! The pipeline publishes progress events here; the HTTP server streams them
//! to subscribed clients over SSE. The channel is the publish/subscribe seam:
//! subscribers come and go freely and publishing never blocks on them.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Severity for client display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportEvent {
    /// Unique event id, so clients can deduplicate after reconnects.
    pub id: Uuid,
    pub level: EventLevel,
    pub message: String,
}

impl ImportEvent {
    pub fn new(level: EventLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
        }
    }
}

/// Global event broadcaster.
pub static EVENTS: Lazy<EventBroadcaster> = Lazy::new(EventBroadcaster::new);

/// Fans events out to all connected SSE clients.
pub struct EventBroadcaster {
    sender: broadcast::Sender<ImportEvent>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: ImportEvent) {
        // Mirror to stdout for operators tailing the process
        let prefix = match event.level {
            EventLevel::Info => "   ",
            EventLevel::Success => "   ✓",
            EventLevel::Warning => "   ⚠️",
            EventLevel::Error => "   ❌",
        };
        println!("{} {}", prefix, event.message);

        // Ignore the error when no client is connected
        let _ = self.sender.send(event);
    }

    /// Get a receiver for SSE streaming.
    pub fn subscribe(&self) -> broadcast::Receiver<ImportEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience publishers used throughout the pipeline.
pub fn publish_info(msg: impl Into<String>) {
    EVENTS.publish(ImportEvent::new(EventLevel::Info, msg));
}

pub fn publish_success(msg: impl Into<String>) {
    EVENTS.publish(ImportEvent::new(EventLevel::Success, msg));
}

pub fn publish_warning(msg: impl Into<String>) {
    EVENTS.publish(ImportEvent::new(EventLevel::Warning, msg));
}

pub fn publish_error(msg: impl Into<String>) {
    EVENTS.publish(ImportEvent::new(EventLevel::Error, msg));
}
