//! REST API endpoint handlers for the Observer server.
//!
//! All handlers read through the shared [`SimulationClock`] in
//! [`AppState`]. Every response is a copy taken under the state lock.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/simulation/state` | Overview snapshot |
//! | `GET` | `/api/map/tiles` | Full tile list |
//! | `GET` | `/api/factions` | Faction summaries |
//! | `GET` | `/api/factions/:id` | Single faction, full record |
//! | `GET` | `/api/events` | Most recent events (`?limit=N`) |
//!
//! [`SimulationClock`]: eruxian_core::SimulationClock

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use eruxian_types::FactionId;
use uuid::Uuid;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/events` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct EventsQuery {
    /// Maximum number of events to return. Missing, zero or non-numeric
    /// values fall back to the configured default.
    pub limit: Option<String>,
}

impl EventsQuery {
    /// The requested limit, if it is a positive integer.
    pub fn parsed_limit(&self) -> Option<usize> {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
    }
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing simulation status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.clock.snapshot().await;
    let tick = snapshot.tick;
    let faction_count = snapshot.factions.len();
    let (status_class, status_label) = if snapshot.running {
        ("running", "RUNNING")
    } else {
        ("paused", "PAUSED")
    };
    let width = snapshot.map.width;
    let height = snapshot.map.height;

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Eruxian Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .running {{ color: #3fb950; font-weight: bold; }}
        .paused {{ color: #d29922; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Eruxian Observer</h1>
    <p class="subtitle">Faction territory simulation</p>

    <p>Status: <span class="{status_class}">{status_label}</span></p>

    <div>
        <div class="metric">
            <div class="label">Tick</div>
            <div class="value">{tick}</div>
        </div>
        <div class="metric">
            <div class="label">Factions</div>
            <div class="value">{faction_count}</div>
        </div>
        <div class="metric">
            <div class="label">Map</div>
            <div class="value">{width}x{height}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/simulation/state">/api/simulation/state</a> -- Overview snapshot</li>
        <li>GET <a href="/api/map/tiles">/api/map/tiles</a> -- Full tile list</li>
        <li>GET <a href="/api/factions">/api/factions</a> -- Faction summaries</li>
        <li>GET /api/factions/:id -- Single faction detail</li>
        <li>GET <a href="/api/events">/api/events</a> -- Recent events (?limit=N)</li>
        <li>POST /api/simulation/control -- {{"action": "pause" | "resume" | "reset" | "step"}}</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws/ticks</code> -- Live tick summary stream</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/simulation/state
// ---------------------------------------------------------------------------

/// Return the overview snapshot: tick, ownership map, faction summaries,
/// the most recent events and the running flag.
pub async fn get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.clock.snapshot().await)
}

// ---------------------------------------------------------------------------
// GET /api/map/tiles
// ---------------------------------------------------------------------------

/// Return every tile with resource node and mana pool detail.
pub async fn list_tiles(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.clock.tiles().await)
}

// ---------------------------------------------------------------------------
// GET /api/factions
// ---------------------------------------------------------------------------

/// Return summaries of every live faction.
pub async fn list_factions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.clock.factions().await)
}

/// Return one faction's full record, including relationships.
pub async fn get_faction(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = FactionId::from(parse_uuid(&id_str)?);
    let faction = state
        .clock
        .faction(id)
        .await
        .ok_or(ObserverError::FactionNotFound(id))?;
    Ok(Json(faction))
}

// ---------------------------------------------------------------------------
// GET /api/events
// ---------------------------------------------------------------------------

/// Return the most recent events, oldest first.
///
/// # Query Parameters
///
/// - `limit`: number of events (default from `events.default_query_limit`).
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> impl IntoResponse {
    Json(state.clock.events(params.parsed_limit()).await)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a faction id path segment.
fn parse_uuid(raw: &str) -> Result<Uuid, ObserverError> {
    raw.parse::<Uuid>()
        .map_err(|e| ObserverError::MalformedFactionId {
            raw: raw.to_owned(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<&str>) -> EventsQuery {
        EventsQuery {
            limit: limit.map(String::from),
        }
    }

    #[test]
    fn limit_parsing_falls_back() {
        assert_eq!(query(Some("5")).parsed_limit(), Some(5));
        assert_eq!(query(Some("abc")).parsed_limit(), None);
        assert_eq!(query(Some("0")).parsed_limit(), None);
        assert_eq!(query(Some("-3")).parsed_limit(), None);
        assert_eq!(query(None).parsed_limit(), None);
    }

    #[test]
    fn malformed_uuid_is_invalid_id() {
        assert!(matches!(
            parse_uuid("not-a-uuid"),
            Err(ObserverError::MalformedFactionId { .. })
        ));
    }
}
