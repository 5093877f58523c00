use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use gerobaks_core::types::DbId;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Recipient the client signed in as.
    pub recipient_id: DbId,
    /// Whether the client currently allows on-device presentation (the
    /// device-level notification permission).
    pub presentation_enabled: bool,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
}

/// Manages all active WebSocket connections.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection with presentation enabled.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String, recipient_id: DbId) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            recipient_id,
            presentation_enabled: true,
            sender: tx,
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Toggle on-device presentation for one connection.
    ///
    /// Returns `false` if the connection is unknown.
    pub async fn set_presentation(&self, conn_id: &str, enabled: bool) -> bool {
        match self.connections.write().await.get_mut(conn_id) {
            Some(conn) => {
                conn.presentation_enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Send a message to every connection of `recipient_id` that has
    /// presentation enabled.
    ///
    /// Returns the number of connections the message was handed to.
    /// Connections whose send channels are closed are skipped (they are
    /// cleaned up on their next receive loop iteration).
    pub async fn present_to_recipient(&self, recipient_id: DbId, message: Message) -> usize {
        let conns = self.connections.read().await;
        conns
            .values()
            .filter(|conn| conn.recipient_id == recipient_id && conn.presentation_enabled)
            .filter(|conn| conn.sender.send(message.clone()).is_ok())
            .count()
    }

    /// Number of connections open for a recipient, regardless of permission.
    pub async fn recipient_connection_count(&self, recipient_id: DbId) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|conn| conn.recipient_id == recipient_id)
            .count()
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
