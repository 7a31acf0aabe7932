//! Error responses for the Observer API.
//!
//! Every [`ObserverError`] renders as `{"error": "...", "status": N}` with
//! the matching HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use eruxian_types::FactionId;

/// Lookup failures in the Observer API.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// No live faction has this id.
    #[error("faction {0} not found")]
    FactionNotFound(FactionId),

    /// The path segment is not a faction id.
    #[error("faction {raw} not found: {reason}")]
    MalformedFactionId {
        /// The segment as received.
        raw: String,
        /// Why it failed to parse.
        reason: String,
    },
}

impl ObserverError {
    /// HTTP status for this error. Malformed ids name no faction, so both
    /// variants are 404.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::FactionNotFound(_) | Self::MalformedFactionId { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_id_is_not_found() {
        let err = ObserverError::MalformedFactionId {
            raw: String::from("abc"),
            reason: String::from("invalid length"),
        };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
