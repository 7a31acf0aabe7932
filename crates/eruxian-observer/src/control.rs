//! Simulation control endpoint.
//!
//! `POST /api/simulation/control` takes `{"action": "..."}` with one of
//! `pause`, `resume`, `reset` or `step` (`tick` is accepted for `step`).
//! Applied and no-op commands answer 200; unknown actions, unreadable
//! bodies and a step while running answer 400. The body is always the
//! [`ControlOutcome`] with its reply `message`.
//!
//! [`ControlOutcome`]: eruxian_core::ControlOutcome

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use eruxian_core::ControlOutcome;
use tracing::{debug, info};

use crate::state::AppState;

/// Request body for `POST /api/simulation/control`.
#[derive(Debug, serde::Deserialize)]
pub struct ControlRequest {
    /// Action name.
    #[serde(default)]
    pub action: Option<String>,
}

/// Apply a control action to the simulation clock.
pub async fn control(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ControlRequest>, JsonRejection>,
) -> impl IntoResponse {
    let action = match body {
        Ok(Json(request)) => request.action.unwrap_or_default(),
        Err(rejection) => {
            debug!(error = %rejection, "Unreadable control request");
            String::new()
        }
    };

    let outcome: ControlOutcome = state.clock.control_str(&action).await;
    info!(
        action = %action,
        status = ?outcome.status,
        message = %outcome.message,
        "Control request handled"
    );

    let status = if outcome.is_rejected() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (status, Json(outcome))
}
