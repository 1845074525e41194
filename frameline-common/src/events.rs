//! Event types for the frameline review-room service
//!
//! # Architecture
//!
//! Frameline uses hybrid communication:
//! - **EventBus** (tokio::broadcast): One-to-many event broadcasting to SSE clients
//! - **Shared state** (Arc<RwLock<T>>): Read-heavy access to room state
//!
//! Every state change in a room (transport, threads, highlights, presence)
//! is published on the room's bus; the SSE endpoint relays it to connected
//! review clients.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::model::{PresenceStatus, Quality, Resource, ThreadData, TransportSnapshot, UserInfo};

/// One reviewer in a room's presence roster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub connection_id: Uuid,
    pub user: UserInfo,
    pub status: PresenceStatus,
}

/// Review room event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReviewEvent {
    /// Transport started/stopped/entered seeking
    PlaybackStateChanged {
        playing: bool,
        seeking: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback position update (normalized time)
    PlaybackPosition {
        time: f64,
        duration_secs: f64,
        playing: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Volume or mute changed
    VolumeChanged {
        volume: f64,
        muted: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback rate changed
    SpeedChanged {
        speed: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Rendition quality changed
    QualityChanged {
        quality: Quality,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A jump-to-time was requested (thread list or pin)
    SkipTo {
        percentage: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A pin was hovered: highlight its thread in the list
    HighlightThread {
        thread_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A thread was hovered: highlight its pin on the timeline
    HighlightPin {
        thread_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Pointer left: clear all highlights
    HighlightsReset {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A new comment thread was created
    ThreadCreated {
        thread: ThreadData,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The presence roster changed (join, leave, or status update)
    PresenceChanged {
        roster: Vec<ParticipantInfo>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Initial state sent on SSE connection
    InitialState {
        resource: Resource,
        transport: TransportSnapshot,
        threads: Vec<ThreadData>,
        roster: Vec<ParticipantInfo>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl ReviewEvent {
    /// Get event type as string for SSE event naming and filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            ReviewEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            ReviewEvent::PlaybackPosition { .. } => "PlaybackPosition",
            ReviewEvent::VolumeChanged { .. } => "VolumeChanged",
            ReviewEvent::SpeedChanged { .. } => "SpeedChanged",
            ReviewEvent::QualityChanged { .. } => "QualityChanged",
            ReviewEvent::SkipTo { .. } => "SkipTo",
            ReviewEvent::HighlightThread { .. } => "HighlightThread",
            ReviewEvent::HighlightPin { .. } => "HighlightPin",
            ReviewEvent::HighlightsReset { .. } => "HighlightsReset",
            ReviewEvent::ThreadCreated { .. } => "ThreadCreated",
            ReviewEvent::PresenceChanged { .. } => "PresenceChanged",
            ReviewEvent::InitialState { .. } => "InitialState",
        }
    }
}

/// One-to-many event broadcaster built on tokio::broadcast
///
/// Non-blocking publish, multiple concurrent subscribers, automatic cleanup
/// when subscribers drop. A receiver subscribed after an emission never sees
/// that emission (fire-and-forget, not a durable log).
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ReviewEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ReviewEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ReviewEvent,
    ) -> Result<usize, broadcast::error::SendError<ReviewEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring whether anyone is listening
    ///
    /// Used for non-critical events (position ticks, highlight pulses) where
    /// an empty room is acceptable.
    pub fn emit_lossy(&self, event: ReviewEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_eventbus_new() {
        let bus = EventBus::new(100);
        assert_eq!(bus.capacity(), 100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_eventbus_subscribe() {
        let bus = EventBus::new(100);
        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_eventbus_emit_no_subscribers() {
        let bus = EventBus::new(100);
        let event = ReviewEvent::PlaybackStateChanged {
            playing: true,
            seeking: false,
            timestamp: chrono::Utc::now(),
        };

        // Should return error when no subscribers
        assert!(bus.emit(event).is_err());
    }

    #[tokio::test]
    async fn test_eventbus_emit_with_subscriber() {
        let bus = Arc::new(EventBus::new(100));
        let mut rx = bus.subscribe();

        let event = ReviewEvent::PlaybackStateChanged {
            playing: true,
            seeking: false,
            timestamp: chrono::Utc::now(),
        };

        assert!(bus.emit(event).is_ok());

        let received = rx.recv().await.unwrap();
        match received {
            ReviewEvent::PlaybackStateChanged {
                playing, seeking, ..
            } => {
                assert!(playing);
                assert!(!seeking);
            }
            _ => panic!("Wrong event type received"),
        }
    }

    #[tokio::test]
    async fn test_eventbus_emit_lossy() {
        let bus = EventBus::new(100);

        // Should not panic even without subscribers
        bus.emit_lossy(ReviewEvent::HighlightsReset {
            timestamp: chrono::Utc::now(),
        });
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_emission() {
        let bus = EventBus::new(100);
        let mut early = bus.subscribe();

        bus.emit_lossy(ReviewEvent::SkipTo {
            percentage: 42.0,
            timestamp: chrono::Utc::now(),
        });

        // A receiver subscribed after the emission never observes it
        let mut late = bus.subscribe();
        assert!(early.try_recv().is_ok());
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn test_event_serialization_tags_type() {
        let event = ReviewEvent::SkipTo {
            percentage: 42.0,
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"SkipTo\""));
        assert!(json.contains("\"percentage\":42.0"));
        assert_eq!(event.event_type(), "SkipTo");
    }
}
