use std::time::Duration;

use gerobaks_events::PresenterConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background services get to drain on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// PostgreSQL connection string. Without it the server keeps
    /// notifications in memory.
    pub database_url: Option<String>,
    /// Presentation queue size and per-request timeout.
    pub presenter: PresenterConfig,
    /// Push relay endpoint used in addition to WebSocket clients.
    pub push_relay_url: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                    |
    /// |-------------------------------|----------------------------|
    /// | `HOST`                        | `0.0.0.0`                  |
    /// | `PORT`                        | `3000`                     |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`                       |
    /// | `DATABASE_URL`                | unset (in-memory store)    |
    /// | `PRESENTATION_QUEUE_CAPACITY` | `256`                      |
    /// | `PRESENTATION_TIMEOUT_MS`     | `2000`                     |
    /// | `PUSH_RELAY_URL`              | unset (WebSocket only)     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let database_url = non_empty_var("DATABASE_URL");

        let queue_capacity: usize = std::env::var("PRESENTATION_QUEUE_CAPACITY")
            .unwrap_or_else(|_| "256".into())
            .parse()
            .expect("PRESENTATION_QUEUE_CAPACITY must be a valid usize");

        let timeout_ms: u64 = std::env::var("PRESENTATION_TIMEOUT_MS")
            .unwrap_or_else(|_| "2000".into())
            .parse()
            .expect("PRESENTATION_TIMEOUT_MS must be a valid u64");

        let push_relay_url = non_empty_var("PUSH_RELAY_URL");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database_url,
            presenter: PresenterConfig {
                queue_capacity,
                timeout: Duration::from_millis(timeout_ms),
            },
            push_relay_url,
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
