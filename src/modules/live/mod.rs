//! LiveHub - best-effort realtime push to connected clients
//!
//! ```text
//! services (notifications, chat)
//!       │ emit(room, event, payload)
//!       ▼
//! LiveHub
//!   └── rooms: "user:<id>" | "issue:<id>" → broadcast::Sender<LiveEvent>
//!         │
//!         ▼
//!   websocket sessions (one receiver per joined room)
//! ```
//!
//! Nothing is persisted or replayed. A user who is offline when an event is
//! emitted relies on the stored notification instead.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Buffered events per room before slow receivers start lagging
const BROADCAST_CAPACITY: usize = 128;

/// Event pushed to every receiver of a room
#[derive(Debug, Clone, Serialize)]
pub struct LiveEvent {
    pub room: String,
    pub event: String,
    pub payload: serde_json::Value,
}

/// Room of a single user, auto-joined by their websocket sessions
pub fn user_room(user_id: &str) -> String {
    format!("user:{}", user_id)
}

/// Room of an issue's chat and activity stream
pub fn issue_room(issue_id: Uuid) -> String {
    format!("issue:{}", issue_id)
}

/// Process-wide room registry
#[derive(Clone, Default)]
pub struct LiveHub {
    rooms: Arc<DashMap<String, broadcast::Sender<LiveEvent>>>,
}

impl LiveHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `room`, creating it on first use
    pub fn subscribe(&self, room: &str) -> broadcast::Receiver<LiveEvent> {
        self.rooms
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .subscribe()
    }

    /// Push `payload` to everyone in `room`.
    ///
    /// Returns the number of receivers reached; zero when the room is empty
    /// or does not exist. Never fails.
    pub fn emit<T: Serialize>(&self, room: &str, event: &str, payload: &T) -> usize {
        let Some(sender) = self.rooms.get(room) else {
            return 0;
        };

        let payload = match serde_json::to_value(payload) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Failed to serialize live event {} for {}: {}", event, room, e);
                return 0;
            }
        };

        sender
            .send(LiveEvent {
                room: room.to_string(),
                event: event.to_string(),
                payload,
            })
            .unwrap_or(0)
    }

    /// Drop `room` once its last receiver is gone
    pub fn prune(&self, room: &str) {
        self.rooms
            .remove_if(room, |_, sender| sender.receiver_count() == 0);
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_emit_reaches_every_subscriber() {
        let hub = LiveHub::new();
        let room = user_room("u1");
        let mut a = hub.subscribe(&room);
        let mut b = hub.subscribe(&room);

        let reached = hub.emit(&room, "notification", &json!({"message": "hi"}));
        assert_eq!(reached, 2);

        let event = a.recv().await.unwrap();
        assert_eq!(event.event, "notification");
        assert_eq!(event.payload["message"], "hi");
        assert_eq!(b.recv().await.unwrap().room, room);
    }

    #[test]
    fn test_emit_to_unknown_room_is_noop() {
        let hub = LiveHub::new();
        assert_eq!(hub.emit("user:nobody", "notification", &json!({})), 0);
        assert_eq!(hub.room_count(), 0);
    }

    #[test]
    fn test_rooms_are_isolated() {
        let hub = LiveHub::new();
        let issue = Uuid::new_v4();
        let mut chat = hub.subscribe(&issue_room(issue));
        let _user = hub.subscribe(&user_room("u1"));

        hub.emit(&user_room("u1"), "notification", &json!({}));
        assert!(chat.try_recv().is_err());
    }

    #[test]
    fn test_prune_only_removes_empty_rooms() {
        let hub = LiveHub::new();
        let room = user_room("u1");
        let rx = hub.subscribe(&room);

        hub.prune(&room);
        assert_eq!(hub.room_count(), 1);

        drop(rx);
        hub.prune(&room);
        assert_eq!(hub.room_count(), 0);
    }
}
