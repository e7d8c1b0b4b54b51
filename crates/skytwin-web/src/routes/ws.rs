//! WebSocket handler for live negotiation events.

use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

/// WebSocket upgrade handler for /ws/events.
pub async fn events_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serialize `data` as `{"type": kind, "data": data}` and send it.
async fn send_json<T: Serialize>(socket: &mut WebSocket, kind: &str, data: &T) -> bool {
    let msg = serde_json::json!({
        "type": kind,
        "data": data
    });
    match serde_json::to_string(&msg) {
        Ok(json) => socket.send(Message::Text(json)).await.is_ok(),
        Err(_) => true,
    }
}

/// Handle a WebSocket connection.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut events = state.subscribe();
    let mut snapshots = state.watch_snapshots();

    // Send initial snapshot
    let initial = snapshots.borrow_and_update().clone();
    if !send_json(&mut socket, "snapshot", &initial).await {
        return;
    }

    loop {
        tokio::select! {
            result = events.recv() => {
                match result {
                    Ok(event) => {
                        if !send_json(&mut socket, "event", &event).await {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "websocket client lagging");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if !send_json(&mut socket, "snapshot", &snapshot).await {
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(cmd) = serde_json::from_str::<ClientCommand>(&text) {
                            let result = match cmd {
                                ClientCommand::Start => state.clock().start().await,
                                ClientCommand::Pause => state.clock().pause().await,
                                ClientCommand::Step => state.clock().step().await.map(|_| ()),
                                ClientCommand::Reset => state.clock().reset(None).await,
                            };
                            if let Err(e) = result {
                                let _ = send_json(&mut socket, "error", &e.to_string()).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }
}

/// Commands that can be sent over WebSocket.
#[derive(Debug, serde::Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
enum ClientCommand {
    Start,
    Pause,
    Step,
    Reset,
}
