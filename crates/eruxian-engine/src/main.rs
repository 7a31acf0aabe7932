//! Engine binary for the Eruxian simulation.
//!
//! Wires the simulation clock to the Observer API and runs until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `eruxian-config.yaml` (or `ERUXIAN_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Generate the starting world and build the simulation clock
//! 4. Start periodic ticking
//! 5. Bind and spawn the Observer API server
//! 6. Wait for Ctrl-C, then stop the clock and the server

mod error;
mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use eruxian_core::{SimulationClock, SimulationConfig};
use eruxian_observer::{AppState, ServerConfig};
use eruxian_world::StdRandom;
use tracing::info;

use crate::error::EngineError;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "ERUXIAN_CONFIG";

/// Config file looked up in the working directory by default.
const DEFAULT_CONFIG_PATH: &str = "eruxian-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, logging, clock construction or the
/// observer bind fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let path = config_path(std::env::var(CONFIG_ENV).ok());
    let (config, found) = load_config(&path)?;

    // 2. Initialize structured logging.
    logging::init(&config.logging)?;
    info!("eruxian-engine starting");
    if found {
        info!(path = %path.display(), "Configuration loaded");
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
    }
    info!(
        width = config.world.width,
        height = config.world.height,
        tick_interval_ms = config.clock.tick_interval_ms,
        event_capacity = config.events.capacity,
        "Simulation configuration"
    );

    // 3. Build the clock over a freshly generated world.
    let server_config = ServerConfig {
        host: config.observer.host.clone(),
        port: config.observer.port,
    };
    let clock = SimulationClock::new(config, Box::new(StdRandom::from_entropy()))?;
    let snapshot = clock.snapshot().await;
    info!(
        factions = snapshot.factions.len(),
        tiles = snapshot.map.tiles.len(),
        "Starting world generated"
    );

    // 4. Start ticking.
    clock.start().await;

    // 5. Observer API server.
    let app_state = Arc::new(AppState::new(clock.clone()));
    let observer_handle = eruxian_observer::spawn_observer(&server_config, app_state).await?;
    info!(
        host = %server_config.host,
        port = server_config.port,
        "Observer API server started"
    );

    // 6. Run until interrupted.
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    clock.shutdown().await;
    observer_handle.abort();

    info!(tick = clock.tick().await, "eruxian-engine shutdown complete");
    Ok(())
}

/// Resolve the config path from the `ERUXIAN_CONFIG` value, if any.
fn config_path(env_value: Option<String>) -> PathBuf {
    env_value
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist. Environment overrides apply either way.
///
/// Returns the config and whether the file was found.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), EngineError> {
    if path.exists() {
        Ok((SimulationConfig::from_file(path)?, true))
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}
