use std::net::SocketAddr;
use std::sync::Arc;

use gerobaks_db::{MemoryNotificationStore, NotificationStore, PgNotificationStore};
use gerobaks_events::{
    DeliveryPresenter, EventBus, EventIngestor, FanoutSink, NotificationPipeline,
    PresentationSink, PushRelaySink, ReadStateTracker,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gerobaks_api::config::ServerConfig;
use gerobaks_api::notifications::WsPresentationSink;
use gerobaks_api::router::build_app_router;
use gerobaks_api::state::AppState;
use gerobaks_api::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "gerobaks_api=debug,gerobaks_events=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Store ---
    let store = build_store(&config).await;

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager), ws::HEARTBEAT_INTERVAL);

    // --- Presenter ---
    let sink = build_presentation_sink(&config, Arc::clone(&ws_manager));
    let (presenter, presenter_handle) = DeliveryPresenter::spawn(sink, config.presenter);
    tracing::info!(
        queue_capacity = config.presenter.queue_capacity,
        timeout_ms = config.presenter.timeout.as_millis() as u64,
        "Delivery presenter started"
    );

    // --- Pipeline ---
    let pipeline = Arc::new(NotificationPipeline::new(Arc::clone(&store), presenter));
    let tracker = Arc::new(ReadStateTracker::new(Arc::clone(&store)));

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let ingestor_handle = tokio::spawn(EventIngestor::run(
        Arc::clone(&pipeline),
        event_bus.subscribe(),
    ));
    tracing::info!("Event bus and ingestor started");

    // --- App state ---
    let state = AppState {
        store,
        pipeline,
        tracker,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // The router (and its state) is gone; dropping the last bus handle closes
    // the channel and the ingestor drains what is left.
    drop(event_bus);
    let _ = tokio::time::timeout(config.shutdown_timeout(), ingestor_handle).await;
    tracing::info!("Event ingestor stopped");

    // The ingestor held the last pipeline, and with it the last presenter
    // handle, so the presentation queue is closed now.
    let _ = tokio::time::timeout(config.shutdown_timeout(), presenter_handle).await;
    tracing::info!("Delivery presenter stopped");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    heartbeat_handle.abort();
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// PostgreSQL when `DATABASE_URL` is set, otherwise an in-memory store.
async fn build_store(config: &ServerConfig) -> Arc<dyn NotificationStore> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, notifications are kept in memory");
        return Arc::new(MemoryNotificationStore::new());
    };

    let pool = gerobaks_db::create_pool(database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    gerobaks_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    gerobaks_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    Arc::new(PgNotificationStore::new(pool))
}

/// WebSocket clients, plus the push relay when `PUSH_RELAY_URL` is set.
fn build_presentation_sink(
    config: &ServerConfig,
    ws_manager: Arc<ws::WsManager>,
) -> Arc<dyn PresentationSink> {
    let ws_sink: Arc<dyn PresentationSink> = Arc::new(WsPresentationSink::new(ws_manager));

    match config.push_relay_url.as_deref() {
        Some(url) => {
            let relay: Arc<dyn PresentationSink> = Arc::new(
                PushRelaySink::new(url).expect("Failed to build push relay HTTP client"),
            );
            tracing::info!(url, "Push relay presentation enabled");
            Arc::new(FanoutSink::new(vec![ws_sink, relay]))
        }
        None => ws_sink,
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
