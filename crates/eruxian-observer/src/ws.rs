//! `WebSocket` handler for real-time tick summary streaming.
//!
//! Clients connect to `GET /ws/ticks`. The first frame is a
//! [`StreamHello`] with the current tick and running flag; after that the
//! client receives a JSON-encoded [`TickSummary`] each time the clock
//! completes a tick, whether from the ticker or a manual step.
//!
//! If a client falls behind, lagged summaries are skipped and the client
//! resumes from the most recent tick.
//!
//! [`TickSummary`]: eruxian_core::TickSummary

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// First frame sent on every new connection.
#[derive(Debug, Clone, Serialize)]
pub struct StreamHello {
    /// Ticks completed at connect time.
    pub tick: u64,
    /// Whether periodic ticking was active at connect time.
    pub running: bool,
}

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming tick summaries.
///
/// # Route
///
/// `GET /ws/ticks`
pub async fn ws_ticks(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Serialize `value` and send it as a text frame. Returns `false` once the
/// client is gone.
async fn send_json<T: Serialize>(socket: &mut WebSocket, value: &T) -> bool {
    let json = match serde_json::to_string(value) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "Failed to serialize stream frame");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before reading the tick so no summary falls in between.
    let mut rx = state.subscribe();
    let hello = StreamHello {
        tick: state.clock.tick().await,
        running: state.clock.is_running().await,
    };
    debug!(tick = hello.tick, "WebSocket client connected");
    if !send_json(&mut socket, &hello).await {
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(summary) => {
                        if !send_json(&mut socket, &summary).await {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Tick channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "WebSocket error");
                        return;
                    }
                    // Clients have nothing to say.
                    _ => {}
                }
            }
        }
    }
}
