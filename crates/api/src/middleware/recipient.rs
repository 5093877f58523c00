//! Recipient extractor.
//!
//! Authentication happens at the gateway in front of this service, which
//! forwards the authenticated user id in the `x-recipient-id` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gerobaks_core::error::CoreError;
use gerobaks_core::types::DbId;

use crate::error::AppError;

/// Header carrying the authenticated recipient id.
pub const RECIPIENT_HEADER: &str = "x-recipient-id";

/// The recipient a request acts on behalf of.
///
/// ```ignore
/// async fn my_handler(recipient: Recipient) -> AppResult<Json<()>> {
///     tracing::info!(recipient_id = recipient.recipient_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Recipient {
    pub recipient_id: DbId,
}

impl<S: Send + Sync> FromRequestParts<S> for Recipient {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(RECIPIENT_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(format!(
                    "Missing {RECIPIENT_HEADER} header"
                )))
            })?;

        let recipient_id: DbId = raw
            .trim()
            .parse()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(format!(
                    "Invalid {RECIPIENT_HEADER} header"
                )))
            })?;

        Ok(Recipient { recipient_id })
    }
}
