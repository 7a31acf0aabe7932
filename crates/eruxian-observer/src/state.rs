//! Shared application state for the Observer API server.
//!
//! [`AppState`] wraps the [`SimulationClock`] handle. The clock already
//! serializes access to the simulation state and owns the tick summary
//! broadcast channel, so the observer holds no state of its own.

use eruxian_core::{SimulationClock, TickSummary};
use tokio::sync::broadcast;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle to the running simulation.
    pub clock: SimulationClock,
}

impl AppState {
    /// Create application state around a clock.
    pub const fn new(clock: SimulationClock) -> Self {
        Self { clock }
    }

    /// Subscribe to per-tick summaries.
    ///
    /// A receiver that falls more than the channel capacity behind gets
    /// [`broadcast::error::RecvError::Lagged`] and skips to the newest
    /// summary.
    pub fn subscribe(&self) -> broadcast::Receiver<TickSummary> {
        self.clock.subscribe()
    }
}
