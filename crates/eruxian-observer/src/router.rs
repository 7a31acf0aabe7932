//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::control;
use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/ticks` -- `WebSocket` tick summary stream
/// - `GET /api/simulation/state` -- overview snapshot
/// - `POST /api/simulation/control` -- pause, resume, reset, step
/// - `GET /api/map/tiles` -- full tile list
/// - `GET /api/factions` -- faction summaries
/// - `GET /api/factions/:id` -- single faction
/// - `GET /api/events` -- recent events
///
/// CORS allows any origin so the dashboard can be served from anywhere.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/ticks", get(ws::ws_ticks))
        // REST API
        .route("/api/simulation/state", get(handlers::get_state))
        .route("/api/simulation/control", post(control::control))
        .route("/api/map/tiles", get(handlers::list_tiles))
        .route("/api/factions", get(handlers::list_factions))
        .route("/api/factions/{id}", get(handlers::get_faction))
        .route("/api/events", get(handlers::list_events))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
