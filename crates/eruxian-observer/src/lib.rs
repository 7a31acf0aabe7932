//! Observer API server for the Eruxian simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/ticks`) for real-time tick summary
//!   streaming via [`tokio::sync::broadcast`]
//! - **REST endpoints** for the overview snapshot, full tile list,
//!   factions and recent events
//! - **Control endpoint** (`POST /api/simulation/control`) for pause,
//!   resume, reset and step
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! Every handler goes through the shared [`SimulationClock`], which takes
//! the state lock and copies out what it needs. Reads therefore always see
//! the state between two ticks.
//!
//! [`SimulationClock`]: eruxian_core::SimulationClock

pub mod control;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::{StartupError, spawn_observer};
pub use state::AppState;
