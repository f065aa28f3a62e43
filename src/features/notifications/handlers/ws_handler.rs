//! Live push websocket.
//!
//! GET /api/ws?token=<JWT>
//! The token travels in the query because browsers cannot set headers on a
//! websocket upgrade.
//!
//! Server → client: `{"room", "event", "payload"}`
//! Client → server: `{"action": "join" | "leave", "issue_id": "<uuid>"}`

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{Sink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::core::extractor::AppQuery;
use crate::features::auth::JwtValidator;
use crate::modules::live::{issue_room, user_room, LiveEvent, LiveHub};

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Events buffered between the room forwarders and the socket writer
const SESSION_BUFFER: usize = 64;

#[derive(Clone)]
pub struct LiveState {
    pub hub: LiveHub,
    pub validator: Arc<JwtValidator>,
}

#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ClientCommand {
    Join { issue_id: Uuid },
    Leave { issue_id: Uuid },
}

#[derive(Debug, Serialize)]
struct RoomAck<'a> {
    event: &'a str,
    room: &'a str,
}

pub async fn live_ws(
    State(state): State<LiveState>,
    AppQuery(query): AppQuery<WsAuthQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .validator
        .validate_token(&query.token)
        .await
        .map_err(|e| {
            tracing::debug!("Live WS token rejected: {}", e);
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?;

    Ok(ws.on_upgrade(move |socket| live_session(socket, state.hub, user.sub)))
}

async fn live_session(socket: WebSocket, hub: LiveHub, user_id: String) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<LiveEvent>(SESSION_BUFFER);
    let mut rooms: HashMap<String, JoinHandle<()>> = HashMap::new();

    tracing::info!("Live WS connected: {}", user_id);

    let own_room = user_room(&user_id);
    rooms.insert(own_room.clone(), forward(&hub, &own_room, tx.clone()));

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await;

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(Vec::<u8>::new().into())).await.is_err() {
                    break;
                }
            }

            Some(event) = rx.recv() => {
                if send_json(&mut sink, &event).await.is_err() {
                    break;
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let Ok(command) = serde_json::from_str::<ClientCommand>(&text) else {
                            tracing::debug!("Ignoring unknown live command from {}", user_id);
                            continue;
                        };

                        let (event, room) = match command {
                            ClientCommand::Join { issue_id } => {
                                let room = issue_room(issue_id);
                                if !rooms.contains_key(&room) {
                                    rooms.insert(room.clone(), forward(&hub, &room, tx.clone()));
                                }
                                ("joined", room)
                            }
                            ClientCommand::Leave { issue_id } => {
                                let room = issue_room(issue_id);
                                if let Some(handle) = rooms.remove(&room) {
                                    release(&hub, &room, handle).await;
                                }
                                ("left", room)
                            }
                        };

                        let ack = RoomAck { event, room: &room };
                        if send_json(&mut sink, &ack).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    for (room, handle) in rooms.drain() {
        release(&hub, &room, handle).await;
    }

    tracing::info!("Live WS disconnected: {}", user_id);
}

/// Copy events of one room into the session queue until either side closes
fn forward(hub: &LiveHub, room: &str, tx: mpsc::Sender<LiveEvent>) -> JoinHandle<()> {
    let mut receiver = hub.subscribe(room);
    let room = room.to_string();

    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Live subscriber of {} lagged, {} events dropped", room, n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Stop a forwarder and drop the room if nobody else listens
async fn release(hub: &LiveHub, room: &str, handle: JoinHandle<()>) {
    handle.abort();
    let _ = handle.await;
    hub.prune(room);
}

async fn send_json<S, T>(sink: &mut S, value: &T) -> Result<(), ()>
where
    S: Sink<Message> + Unpin,
    T: Serialize,
{
    let text = serde_json::to_string(value).map_err(|_| ())?;
    sink.send(Message::Text(text.into())).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_commands_parse() {
        let id = Uuid::now_v7();
        let join: ClientCommand =
            serde_json::from_str(&format!(r#"{{"action":"join","issue_id":"{}"}}"#, id)).unwrap();
        assert_eq!(join, ClientCommand::Join { issue_id: id });

        let leave: ClientCommand =
            serde_json::from_str(&format!(r#"{{"action":"leave","issue_id":"{}"}}"#, id)).unwrap();
        assert_eq!(leave, ClientCommand::Leave { issue_id: id });

        assert!(serde_json::from_str::<ClientCommand>(r#"{"action":"shout"}"#).is_err());
    }

    #[tokio::test]
    async fn test_forwarder_relays_room_events_and_release_prunes() {
        let hub = LiveHub::new();
        let (tx, mut rx) = mpsc::channel(4);
        let handle = forward(&hub, "issue:1", tx);

        assert_eq!(hub.emit("issue:1", "chat_message", &"hello"), 1);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.event, "chat_message");
        assert_eq!(event.payload, serde_json::json!("hello"));

        release(&hub, "issue:1", handle).await;
        assert_eq!(hub.room_count(), 0);
    }
}
