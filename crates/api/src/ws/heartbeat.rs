use std::sync::Arc;
use std::time::Duration;

use crate::ws::manager::WsManager;

/// Default interval between heartbeat pings.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Spawn a background task that pings every connected client each `every`.
///
/// Ticks with no open connection are skipped. The returned `JoinHandle` is
/// aborted during shutdown.
pub fn start_heartbeat(ws_manager: Arc<WsManager>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let count = ws_manager.connection_count().await;
            if count == 0 {
                continue;
            }
            tracing::trace!(count, "WebSocket heartbeat ping");
            ws_manager.ping_all().await;
        }
    })
}
