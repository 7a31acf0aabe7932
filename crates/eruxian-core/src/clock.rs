//! Simulation clock: periodic ticking and operator controls.
//!
//! The [`SimulationClock`] owns the single [`SimulationState`] behind one
//! async mutex. Periodic ticks, control commands and every read take that
//! same lock, so observers always see a state between ticks.
//!
//! Periodic ticking runs on a spawned ticker task. Each ticker carries the
//! generation number it was started under; pause and reset bump the
//! generation and abort the task, and a firing that wakes up under a stale
//! generation exits without touching the state. A tick that has already
//! taken the lock always runs to completion.
//!
//! Every completed tick's [`TickSummary`] is broadcast to subscribers.

use std::sync::Arc;
use std::time::Duration;

use eruxian_types::{
    ControlAction, ControlStatus, EventType, Faction, FactionId, FactionSummary, LogEntry,
    SimulationSnapshot, TileDetail,
};
use eruxian_world::{RandomSource, WorldError};
use serde::Serialize;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, SimulationConfig};
use crate::decision::{ActionSelector, UniformSelector};
use crate::snapshot;
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Capacity of the tick summary broadcast channel.
const SUMMARY_CHANNEL_CAPACITY: usize = 256;

/// Errors that can occur when building a clock.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The configuration was rejected.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The initial world could not be generated.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// Result of a control command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlOutcome {
    /// Applied, no-op, or rejected.
    pub status: ControlStatus,
    /// Operator-facing reply.
    pub message: String,
}

impl ControlOutcome {
    fn applied(message: impl Into<String>) -> Self {
        Self {
            status: ControlStatus::Applied,
            message: message.into(),
        }
    }

    fn no_op(message: impl Into<String>) -> Self {
        Self {
            status: ControlStatus::NoOp,
            message: message.into(),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            status: ControlStatus::Rejected,
            message: message.into(),
        }
    }

    /// Whether the command was refused.
    pub fn is_rejected(&self) -> bool {
        self.status == ControlStatus::Rejected
    }
}

/// Everything guarded by the state lock.
struct Inner {
    state: SimulationState,
    rng: Box<dyn RandomSource>,
    selector: Box<dyn ActionSelector>,
    /// Bumped whenever the current ticker is cancelled.
    generation: u64,
    ticker: Option<JoinHandle<()>>,
}

impl Inner {
    fn run_tick(&mut self, config: &SimulationConfig) -> Result<TickSummary, TickError> {
        tick::run_tick(
            &mut self.state,
            config,
            self.rng.as_mut(),
            self.selector.as_mut(),
        )
    }

    fn cancel_ticker(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    fn log_control(&mut self, message: &str) {
        self.state
            .events
            .push(EventType::SimControl, message, Vec::new());
    }
}

struct Shared {
    config: SimulationConfig,
    inner: Mutex<Inner>,
    summaries: broadcast::Sender<TickSummary>,
}

/// Handle to the running simulation. Cheap to clone.
#[derive(Clone)]
pub struct SimulationClock {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for SimulationClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationClock").finish_non_exhaustive()
    }
}

impl SimulationClock {
    /// Validate the config and generate the initial world. The clock starts
    /// stopped; call [`start`](Self::start) to begin ticking.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError`] if the config is invalid or the world cannot
    /// be generated.
    pub fn new(
        config: SimulationConfig,
        mut rng: Box<dyn RandomSource>,
    ) -> Result<Self, ClockError> {
        config.validate()?;
        let state = SimulationState::initialize(&config, rng.as_mut())?;
        Ok(Self::from_parts(
            config,
            state,
            rng,
            Box::new(UniformSelector),
        ))
    }

    /// Assemble a clock around an existing state and selection policy.
    pub fn from_parts(
        config: SimulationConfig,
        state: SimulationState,
        rng: Box<dyn RandomSource>,
        selector: Box<dyn ActionSelector>,
    ) -> Self {
        let (summaries, _) = broadcast::channel(SUMMARY_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                config,
                inner: Mutex::new(Inner {
                    state,
                    rng,
                    selector,
                    generation: 0,
                    ticker: None,
                }),
                summaries,
            }),
        }
    }

    /// The configuration this clock runs with.
    pub fn config(&self) -> &SimulationConfig {
        &self.shared.config
    }

    /// Receive a [`TickSummary`] after every completed tick.
    pub fn subscribe(&self) -> broadcast::Receiver<TickSummary> {
        self.shared.summaries.subscribe()
    }

    // -----------------------------------------------------------------------
    // Controls
    // -----------------------------------------------------------------------

    /// Begin periodic ticking without logging a control event.
    ///
    /// Returns `false` if the clock was already running.
    pub async fn start(&self) -> bool {
        let mut inner = self.shared.inner.lock().await;
        if inner.state.running {
            return false;
        }
        inner.state.running = true;
        self.spawn_ticker(&mut inner);
        info!(
            tick = inner.state.tick,
            factions = inner.state.factions.len(),
            tick_interval_ms = self.shared.config.clock.tick_interval_ms,
            "Simulation started"
        );
        true
    }

    /// Apply a parsed control action.
    pub async fn control(&self, action: ControlAction) -> ControlOutcome {
        match action {
            ControlAction::Pause => self.pause().await,
            ControlAction::Resume => self.resume().await,
            ControlAction::Reset => self.reset().await,
            ControlAction::Step => self.step().await,
        }
    }

    /// Apply a control action by wire name. Unknown names are rejected.
    pub async fn control_str(&self, action: &str) -> ControlOutcome {
        match ControlAction::parse(action) {
            Some(action) => self.control(action).await,
            None => {
                debug!(action, "Unknown control action");
                ControlOutcome::rejected("Invalid action.")
            }
        }
    }

    /// Stop periodic ticking.
    pub async fn pause(&self) -> ControlOutcome {
        let mut inner = self.shared.inner.lock().await;
        if !inner.state.running {
            return ControlOutcome::no_op("Simulation already paused.");
        }
        inner.cancel_ticker();
        inner.state.running = false;
        let message = "Simulation paused.";
        inner.log_control(message);
        info!(tick = inner.state.tick, "Simulation paused");
        ControlOutcome::applied(message)
    }

    /// Restart periodic ticking.
    pub async fn resume(&self) -> ControlOutcome {
        let mut inner = self.shared.inner.lock().await;
        if inner.state.running {
            return ControlOutcome::no_op("Simulation already running.");
        }
        inner.state.running = true;
        let message = "Simulation resumed.";
        inner.log_control(message);
        self.spawn_ticker(&mut inner);
        info!(tick = inner.state.tick, "Simulation resumed");
        ControlOutcome::applied(message)
    }

    /// Discard the state, generate a fresh world and start ticking.
    ///
    /// If generation fails the old state and its ticker are left untouched
    /// and the command is rejected.
    pub async fn reset(&self) -> ControlOutcome {
        let mut inner = self.shared.inner.lock().await;
        let config = &self.shared.config;
        let fresh = match SimulationState::initialize(config, inner.rng.as_mut()) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Reset failed, keeping current state");
                return ControlOutcome::rejected(format!("Reset failed: {e}"));
            }
        };
        inner.cancel_ticker();
        inner.state = fresh;
        inner.state.running = true;
        self.spawn_ticker(&mut inner);
        info!(factions = inner.state.factions.len(), "Simulation reset and started");
        ControlOutcome::applied("Simulation reset and started.")
    }

    /// Run exactly one tick. Only allowed while paused.
    pub async fn step(&self) -> ControlOutcome {
        let mut inner = self.shared.inner.lock().await;
        if inner.state.running {
            return ControlOutcome::rejected("Cannot advance tick while simulation is running.");
        }
        match inner.run_tick(&self.shared.config) {
            Ok(summary) => {
                let _ = self.shared.summaries.send(summary);
            }
            Err(TickError::TickOverflow) => {
                return ControlOutcome::rejected(TickError::TickOverflow.to_string());
            }
            Err(e) => warn!(error = %e, "Stepped tick left an inconsistent state"),
        }
        let message = format!("Advanced to tick {}.", inner.state.tick);
        inner.log_control(&message);
        info!(tick = inner.state.tick, "Simulation stepped");
        ControlOutcome::applied(message)
    }

    /// Stop ticking for process shutdown. Logs no event.
    pub async fn shutdown(&self) {
        let mut inner = self.shared.inner.lock().await;
        inner.cancel_ticker();
        inner.state.running = false;
        info!(tick = inner.state.tick, "Simulation clock stopped");
    }

    fn spawn_ticker(&self, inner: &mut Inner) {
        inner.cancel_ticker();
        let generation = inner.generation;
        let shared = Arc::clone(&self.shared);
        let period = Duration::from_millis(self.shared.config.clock.tick_interval_ms.max(1));
        inner.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let mut inner = shared.inner.lock().await;
                if inner.generation != generation || !inner.state.running {
                    debug!(generation, "Stale ticker exiting");
                    break;
                }
                match inner.run_tick(&shared.config) {
                    Ok(summary) => {
                        let ended = summary.ended;
                        let _ = shared.summaries.send(summary);
                        if ended {
                            inner.ticker = None;
                            break;
                        }
                    }
                    Err(TickError::TickOverflow) => {
                        warn!("Tick counter exhausted, stopping");
                        inner.state.running = false;
                        inner.ticker = None;
                        break;
                    }
                    Err(e) => warn!(error = %e, "Tick left an inconsistent state"),
                }
            }
        }));
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Overview snapshot with the configured number of recent events.
    pub async fn snapshot(&self) -> SimulationSnapshot {
        let inner = self.shared.inner.lock().await;
        snapshot::overview(&inner.state, self.shared.config.events.snapshot_events)
    }

    /// Every tile with resource and mana detail.
    pub async fn tiles(&self) -> Vec<TileDetail> {
        let inner = self.shared.inner.lock().await;
        snapshot::tile_details(&inner.state)
    }

    /// Summaries of all live factions.
    pub async fn factions(&self) -> Vec<FactionSummary> {
        let inner = self.shared.inner.lock().await;
        snapshot::faction_summaries(&inner.state)
    }

    /// One faction's full record.
    pub async fn faction(&self, id: FactionId) -> Option<Faction> {
        let inner = self.shared.inner.lock().await;
        snapshot::faction_detail(&inner.state, id)
    }

    /// Most recent events, oldest first. `None` uses the configured default.
    pub async fn events(&self, limit: Option<usize>) -> Vec<LogEntry> {
        let limit = limit.unwrap_or(self.shared.config.events.default_query_limit);
        let inner = self.shared.inner.lock().await;
        snapshot::recent_events(&inner.state, limit)
    }

    /// Ticks completed since the last reset.
    pub async fn tick(&self) -> u64 {
        self.shared.inner.lock().await.state.tick
    }

    /// Whether periodic ticking is active.
    pub async fn is_running(&self) -> bool {
        self.shared.inner.lock().await.state.running
    }
}
