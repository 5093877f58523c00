//! Push relay presentation sink.
//!
//! [`PushRelaySink`] POSTs each presentation request to an external push
//! relay (a mobile push gateway) as JSON. Exactly one attempt is made per
//! request: presentation is best-effort and the record stays in the store
//! for the next list fetch either way. The call is bounded by the presenter's
//! timeout, so the HTTP client carries none of its own.

use async_trait::async_trait;
use gerobaks_core::presentation::PresentationRequest;

use crate::presenter::{PresentOutcome, PresentationFailure, PresentationSink};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for push relay failures.
#[derive(Debug, thiserror::Error)]
pub enum PushRelayError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The relay returned a non-2xx status code.
    #[error("Push relay returned HTTP {0}")]
    HttpStatus(u16),
}

impl From<PushRelayError> for PresentationFailure {
    fn from(err: PushRelayError) -> Self {
        PresentationFailure::Sink(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// PushRelaySink
// ---------------------------------------------------------------------------

/// Forwards presentation requests to a push relay endpoint.
pub struct PushRelaySink {
    client: reqwest::Client,
    url: String,
}

impl PushRelaySink {
    /// Create a sink posting to `url`.
    pub fn new(url: impl Into<String>) -> Result<Self, PushRelayError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, url))
    }

    /// Create a sink posting to `url` through an already configured client.
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Execute a single POST request and check the response status.
    async fn send(&self, request: &PresentationRequest) -> Result<(), PushRelayError> {
        let response = self
            .client
            .post(&self.url)
            .json(&request.to_message())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(PushRelayError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl PresentationSink for PushRelaySink {
    async fn present(
        &self,
        request: &PresentationRequest,
    ) -> Result<PresentOutcome, PresentationFailure> {
        self.send(request).await?;
        Ok(PresentOutcome::Delivered)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use gerobaks_core::presentation::Urgency;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    use super::*;

    fn request() -> PresentationRequest {
        PresentationRequest {
            notification_id: 11,
            recipient_id: 4,
            title: "URGENT: Truk Sudah Dekat!".to_string(),
            message: "Truk sampah berjarak 500m, tiba dalam 5 menit".to_string(),
            icon: "local_shipping".to_string(),
            urgency: Urgency::Critical,
        }
    }

    /// Accept one connection, read the whole request, answer with `status`.
    ///
    /// Returns the relay URL and a receiver for the raw request text.
    async fn one_shot_relay(status: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                if request_complete(&raw) {
                    break;
                }
            }
            let response =
                format!("HTTP/1.1 {status}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&raw).into_owned());
        });

        (format!("http://{addr}/push"), rx)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    fn local_sink(url: String) -> PushRelaySink {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        PushRelaySink::with_client(client, url)
    }

    #[tokio::test]
    async fn success_status_is_delivered() {
        let (url, posted) = one_shot_relay("200 OK").await;
        let sink = local_sink(url);

        assert_matches!(sink.present(&request()).await, Ok(PresentOutcome::Delivered));

        let raw = posted.await.unwrap();
        assert!(raw.starts_with("POST /push "));
        assert!(raw.contains("\"notification_id\":11"));
        assert!(raw.contains("\"urgency\":\"critical\""));
    }

    #[tokio::test]
    async fn error_status_is_a_sink_failure() {
        let (url, _posted) = one_shot_relay("503 Service Unavailable").await;
        let sink = local_sink(url);

        assert_eq!(
            sink.present(&request()).await,
            Err(PresentationFailure::Sink(
                "Push relay returned HTTP 503".to_string()
            ))
        );
    }

    #[test]
    fn new_keeps_the_url() {
        let sink = PushRelaySink::new("http://localhost:9000/push").unwrap();
        assert_eq!(sink.url(), "http://localhost:9000/push");
    }

    #[test]
    fn relay_error_display_http_status() {
        let err = PushRelayError::HttpStatus(502);
        assert_eq!(err.to_string(), "Push relay returned HTTP 502");
    }

    #[test]
    fn relay_error_becomes_sink_failure() {
        let failure = PresentationFailure::from(PushRelayError::HttpStatus(503));
        assert_eq!(
            failure,
            PresentationFailure::Sink("Push relay returned HTTP 503".to_string())
        );
    }

    #[test]
    fn relay_error_display_request() {
        let req_err = reqwest::Client::new().get("://bad").build().unwrap_err();
        let err = PushRelayError::Request(req_err);
        assert!(err.to_string().contains("HTTP request failed"));
    }
}
