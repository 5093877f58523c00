//! Present through several surfaces at once.

use std::sync::Arc;

use async_trait::async_trait;
use gerobaks_core::presentation::PresentationRequest;

use crate::presenter::{PresentOutcome, PresentationFailure, PresentationSink};

/// Tries every inner sink in order.
///
/// The outcome is `Delivered` if any sink delivered, `Dormant` if none did
/// but at least one reported `Dormant`, and the last failure otherwise.
pub struct FanoutSink {
    sinks: Vec<Arc<dyn PresentationSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn PresentationSink>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl PresentationSink for FanoutSink {
    async fn present(
        &self,
        request: &PresentationRequest,
    ) -> Result<PresentOutcome, PresentationFailure> {
        let mut delivered = false;
        let mut dormant = false;
        let mut last_err = None;

        for sink in &self.sinks {
            match sink.present(request).await {
                Ok(PresentOutcome::Delivered) => delivered = true,
                Ok(PresentOutcome::Dormant) => dormant = true,
                Err(e) => {
                    tracing::debug!(error = %e, "Presentation surface failed");
                    last_err = Some(e);
                }
            }
        }

        if delivered {
            Ok(PresentOutcome::Delivered)
        } else if dormant {
            Ok(PresentOutcome::Dormant)
        } else {
            last_err.map_or(Ok(PresentOutcome::Dormant), Err)
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use gerobaks_core::presentation::Urgency;

    use super::*;

    struct Fixed(Result<PresentOutcome, PresentationFailure>);

    #[async_trait]
    impl PresentationSink for Fixed {
        async fn present(
            &self,
            _request: &PresentationRequest,
        ) -> Result<PresentOutcome, PresentationFailure> {
            self.0.clone()
        }
    }

    fn request() -> PresentationRequest {
        PresentationRequest {
            notification_id: 1,
            recipient_id: 1,
            title: "Update Aplikasi Tersedia".to_string(),
            message: "Versi baru tersedia.".to_string(),
            icon: "system_update".to_string(),
            urgency: Urgency::Active,
        }
    }

    fn fanout(outcomes: Vec<Result<PresentOutcome, PresentationFailure>>) -> FanoutSink {
        FanoutSink::new(
            outcomes
                .into_iter()
                .map(|o| Arc::new(Fixed(o)) as Arc<dyn PresentationSink>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn any_delivery_wins() {
        let sink = fanout(vec![
            Err(PresentationFailure::Sink("relay down".into())),
            Ok(PresentOutcome::Delivered),
        ]);
        assert_matches!(sink.present(&request()).await, Ok(PresentOutcome::Delivered));
    }

    #[tokio::test]
    async fn dormant_beats_failure() {
        let sink = fanout(vec![
            Ok(PresentOutcome::Dormant),
            Err(PresentationFailure::Sink("relay down".into())),
        ]);
        assert_matches!(sink.present(&request()).await, Ok(PresentOutcome::Dormant));
    }

    #[tokio::test]
    async fn all_failing_reports_last_error() {
        let sink = fanout(vec![
            Err(PresentationFailure::Sink("first".into())),
            Err(PresentationFailure::Sink("second".into())),
        ]);
        assert_matches!(
            sink.present(&request()).await,
            Err(PresentationFailure::Sink(msg)) if msg == "second"
        );
    }

    #[tokio::test]
    async fn empty_fanout_is_dormant() {
        let sink = fanout(Vec::new());
        assert_matches!(sink.present(&request()).await, Ok(PresentOutcome::Dormant));
    }
}
