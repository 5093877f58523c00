use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use gerobaks_core::types::DbId;
use serde::Deserialize;

use crate::middleware::recipient::Recipient;
use crate::state::AppState;
use crate::ws::manager::WsManager;

/// Messages a client may send over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    /// The device notification permission changed.
    Presentation { enabled: bool },
}

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is registered with `WsManager` for the
/// requesting recipient and managed by a sender task plus the receive loop.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    recipient: Recipient,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, recipient.recipient_id, state.ws_manager))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Processes inbound messages on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, recipient_id: DbId, ws_manager: Arc<WsManager>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, recipient_id, "WebSocket connected");

    let mut rx = ws_manager.add(conn_id.clone(), recipient_id).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                handle_client_message(&ws_manager, &conn_id, text.as_str()).await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, recipient_id, "WebSocket disconnected");
}

async fn handle_client_message(ws_manager: &WsManager, conn_id: &str, text: &str) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Presentation { enabled }) => {
            ws_manager.set_presentation(conn_id, enabled).await;
            tracing::debug!(conn_id, enabled, "Presentation permission updated");
        }
        Err(e) => {
            tracing::debug!(conn_id, error = %e, "Ignoring unrecognized client message");
        }
    }
}
