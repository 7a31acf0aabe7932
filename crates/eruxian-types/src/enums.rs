//! Enumeration types for the Eruxian simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A material a resource node yields and a faction stockpiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ResourceKind {
    /// Feeds expansion.
    Food,
    /// Builds expansion.
    Wood,
    /// Pays for attacks.
    Ore,
}

impl ResourceKind {
    /// Every kind, in scatter order.
    pub const ALL: [Self; 3] = [Self::Food, Self::Wood, Self::Ore];
}

// ---------------------------------------------------------------------------
// Diplomacy
// ---------------------------------------------------------------------------

/// Standing of one faction towards another.
///
/// Carried on every faction record but not read by any decision logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Relationship {
    /// No standing either way.
    #[default]
    Neutral,
    /// Allied.
    Alliance,
    /// At war.
    War,
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

/// Type tag of an event log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EventType {
    /// A faction claimed an unowned neighbor tile.
    FactionExpand,
    /// An attacker conquered a tile.
    ConflictWin,
    /// A defender repelled an attack.
    ConflictDefend,
    /// A faction was eliminated.
    FactionDestroyed,
    /// An operator control action took effect.
    SimControl,
    /// A milestone tick was reached.
    TickMilestone,
    /// Only one faction survives.
    SimulationEnd,
}

// ---------------------------------------------------------------------------
// Control
// ---------------------------------------------------------------------------

/// Operator command understood by the simulation clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ControlAction {
    /// Stop periodic ticking.
    Pause,
    /// Start periodic ticking.
    Resume,
    /// Rebuild the world and start ticking again.
    Reset,
    /// Run exactly one tick while paused.
    #[serde(alias = "tick")]
    Step,
}

impl ControlAction {
    /// Parse a wire action name. `tick` is accepted for `step`.
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "pause" => Some(Self::Pause),
            "resume" => Some(Self::Resume),
            "reset" => Some(Self::Reset),
            "step" | "tick" => Some(Self::Step),
            _ => None,
        }
    }
}

/// How a control action was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ControlStatus {
    /// The action changed the clock's state.
    Applied,
    /// The clock was already in the requested state.
    NoOp,
    /// The action is unknown or not allowed right now.
    Rejected,
}
