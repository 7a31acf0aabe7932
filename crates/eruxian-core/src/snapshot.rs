//! Read-only projections of the simulation state.
//!
//! Everything here copies out of the state so callers can hold the result
//! after the lock is released.

use eruxian_types::{
    Faction, FactionId, FactionSummary, LogEntry, MapOverview, SimulationSnapshot, TileDetail,
    TileOverview,
};

use crate::tick::SimulationState;

/// Map dimensions with per-tile ownership only.
pub fn map_overview(state: &SimulationState) -> MapOverview {
    MapOverview {
        width: state.map.width(),
        height: state.map.height(),
        tiles: state.map.tiles().map(TileOverview::from).collect(),
    }
}

/// Every tile with its resource and mana state, row-major.
pub fn tile_details(state: &SimulationState) -> Vec<TileDetail> {
    state.map.tiles().map(TileDetail::from).collect()
}

/// Summaries of all live factions.
pub fn faction_summaries(state: &SimulationState) -> Vec<FactionSummary> {
    state.factions.values().map(Faction::summary).collect()
}

/// One faction's full record, including relationships.
pub fn faction_detail(state: &SimulationState, id: FactionId) -> Option<Faction> {
    state.factions.get(&id).cloned()
}

/// The `limit` most recent events, oldest first.
pub fn recent_events(state: &SimulationState, limit: usize) -> Vec<LogEntry> {
    state.events.recent(limit)
}

/// The overview snapshot with the last `event_limit` events.
pub fn overview(state: &SimulationState, event_limit: usize) -> SimulationSnapshot {
    SimulationSnapshot {
        tick: state.tick,
        map: map_overview(state),
        factions: faction_summaries(state),
        events: recent_events(state, event_limit),
        running: state.running,
    }
}
