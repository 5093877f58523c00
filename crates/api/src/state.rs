use std::sync::Arc;

use gerobaks_db::NotificationStore;
use gerobaks_events::{EventBus, NotificationPipeline, ReadStateTracker};

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Notification record store (PostgreSQL or in-memory).
    pub store: Arc<dyn NotificationStore>,
    /// Classify, persist, present.
    pub pipeline: Arc<NotificationPipeline>,
    /// Read/unread transitions and badge summaries.
    pub tracker: Arc<ReadStateTracker>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (client presentation surface).
    pub ws_manager: Arc<WsManager>,
    /// In-process event bus for fire-and-forget producers.
    pub event_bus: Arc<EventBus>,
}
