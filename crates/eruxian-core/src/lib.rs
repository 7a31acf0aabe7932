//! Tick cycle, faction AI, conflict and simulation clock for the Eruxian
//! simulation.
//!
//! Each tick regenerates the map, then lets every surviving faction gather
//! from its tiles and take one action: expand into a free neighbor, attack
//! a weaker neighbor, or idle.
//!
//! # Modules
//!
//! - [`clock`] -- [`SimulationClock`]: the shared state lock, periodic
//!   ticker and pause/resume/reset/step controls.
//! - [`config`] -- Configuration loading from `eruxian-config.yaml` into
//!   strongly-typed structs.
//! - [`conflict`] -- Stochastic combat and faction elimination.
//! - [`decision`] -- Candidate generation and the [`ActionSelector`] trait.
//! - [`economy`] -- Regeneration and gathering.
//! - [`event_log`] -- Bounded FIFO event log.
//! - [`invariants`] -- Post-tick consistency checks.
//! - [`snapshot`] -- Read-only projections for observers.
//! - [`tick`] -- [`SimulationState`] and the per-tick cycle.
//!
//! [`SimulationClock`]: clock::SimulationClock
//! [`ActionSelector`]: decision::ActionSelector
//! [`SimulationState`]: tick::SimulationState

pub mod clock;
pub mod config;
pub mod conflict;
pub mod decision;
pub mod economy;
pub mod event_log;
pub mod invariants;
pub mod snapshot;
pub mod tick;

pub use clock::{ClockError, ControlOutcome, SimulationClock};
pub use config::{ConfigError, SimulationConfig};
pub use tick::{SimulationState, TickSummary};
