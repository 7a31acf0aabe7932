//! Tick cycle: one full simulation step over the shared state.
//!
//! Each tick runs these phases in order:
//!
//! 1. **Advance** -- increment the tick counter and snapshot the faction
//!    roster.
//! 2. **Regenerate** -- every resource node and mana pool on the map grows.
//! 3. **Faction turns** -- for each faction in the roster that is still
//!    alive: gather from owned tiles, then pick and execute one action
//!    (expand, attack, or idle).
//! 4. **Milestone** -- every `milestone_interval` ticks, log the tick.
//! 5. **End check** -- if the roster held several factions and exactly one
//!    remains, log the winner and stop running.
//! 6. **Verify** -- check ownership consistency, non-negativity and the
//!    strength floor.
//!
//! Given the same starting state, random draws and selector, a tick is
//! deterministic.

use std::collections::BTreeMap;

use eruxian_types::{EventType, Faction, FactionId};
use eruxian_world::{RandomSource, StartingWorld, WorldError, WorldMap, create_starting_world};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::conflict::ConflictOutcome;
use crate::decision::{self, ActionOutcome, ActionSelector};
use crate::economy;
use crate::event_log::EventLog;
use crate::invariants::{self, InvariantViolation};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// The state failed its post-tick consistency check.
    #[error("invariant violated after tick: {source}")]
    Invariant {
        /// The violated invariant.
        #[from]
        source: InvariantViolation,
    },
}

/// Summary of a single tick's execution, broadcast to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Factions alive at the end of the tick.
    pub factions_alive: usize,
    /// Tiles claimed by expansion.
    pub expansions: u32,
    /// Attacks that conquered their target.
    pub conflicts_won: u32,
    /// Attacks that were repelled.
    pub conflicts_defended: u32,
    /// Factions eliminated.
    pub factions_destroyed: u32,
    /// Whether this tick ended the game.
    pub ended: bool,
    /// The last surviving faction, when `ended`.
    pub winner: Option<FactionId>,
}

/// The mutable simulation state passed through the tick cycle.
///
/// The clock owns the single instance behind its lock; every other
/// component receives it by reference.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Ticks completed since the last reset.
    pub tick: u64,
    /// The tile grid.
    pub map: WorldMap,
    /// Live factions by id.
    pub factions: BTreeMap<FactionId, Faction>,
    /// Recent notable occurrences.
    pub events: EventLog,
    /// Whether periodic ticking is active.
    pub running: bool,
}

impl SimulationState {
    /// Generate a fresh world at tick 0 with an empty event log.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError`] if the world configuration is unusable.
    pub fn initialize(
        config: &SimulationConfig,
        rng: &mut dyn RandomSource,
    ) -> Result<Self, WorldError> {
        let StartingWorld { map, factions } = create_starting_world(&config.world, rng)?;
        Ok(Self::from_world(map, factions, config.events.capacity))
    }

    /// Assemble a state from an existing map and faction set.
    pub fn from_world(
        map: WorldMap,
        factions: BTreeMap<FactionId, Faction>,
        event_capacity: usize,
    ) -> Self {
        Self {
            tick: 0,
            map,
            factions,
            events: EventLog::new(event_capacity),
            running: false,
        }
    }

    /// Display name of a faction, or its id if it no longer exists.
    pub fn faction_name(&self, id: FactionId) -> String {
        self.factions
            .get(&id)
            .map_or_else(|| id.to_string(), |f| f.name.clone())
    }
}

/// Execute a single tick.
///
/// # Errors
///
/// Returns [`TickError::TickOverflow`] if the counter cannot advance, or
/// [`TickError::Invariant`] if the resulting state is inconsistent. The
/// tick's mutations are kept either way.
pub fn run_tick(
    state: &mut SimulationState,
    config: &SimulationConfig,
    rng: &mut dyn RandomSource,
    selector: &mut dyn ActionSelector,
) -> Result<TickSummary, TickError> {
    state.tick = state.tick.checked_add(1).ok_or(TickError::TickOverflow)?;
    let tick = state.tick;
    let roster: Vec<FactionId> = state.factions.keys().copied().collect();

    let mut summary = TickSummary {
        tick,
        ..TickSummary::default()
    };

    let regenerated = economy::regenerate_world(&mut state.map);
    debug!(tick, regenerated, "Regeneration complete");

    for id in &roster {
        // Eliminated earlier this tick.
        let Some(faction) = state.factions.get_mut(id) else {
            continue;
        };
        let gathered = economy::gather(faction, &mut state.map, config.economy.gather_rate);
        debug!(
            tick,
            faction = %id,
            materials = gathered.materials(),
            mana = gathered.mana,
            "Faction gathered"
        );

        match decision::take_turn(state, *id, config, rng, selector) {
            ActionOutcome::Expanded { .. } => {
                summary.expansions = summary.expansions.saturating_add(1);
            }
            ActionOutcome::Attacked { outcome, .. } => match outcome {
                ConflictOutcome::Conquered { defender_destroyed } => {
                    summary.conflicts_won = summary.conflicts_won.saturating_add(1);
                    if defender_destroyed {
                        summary.factions_destroyed =
                            summary.factions_destroyed.saturating_add(1);
                    }
                }
                ConflictOutcome::Repelled => {
                    summary.conflicts_defended = summary.conflicts_defended.saturating_add(1);
                }
            },
            ActionOutcome::Idle | ActionOutcome::AttackAborted { .. } => {}
        }
    }

    let interval = config.clock.milestone_interval;
    if interval > 0 && tick.checked_rem(interval) == Some(0) {
        info!(tick, factions = state.factions.len(), "Tick milestone");
        state
            .events
            .push(EventType::TickMilestone, format!("Reached tick {tick}."), Vec::new());
    }

    if roster.len() > 1 && state.factions.len() == 1 {
        if let Some(winner) = state.factions.values().next() {
            let winner_id = winner.id;
            let description =
                format!("{} is the last surviving faction! Simulation ended.", winner.name);
            info!(tick, winner = %winner.name, "Simulation ended");
            state
                .events
                .push(EventType::SimulationEnd, description, vec![winner_id.to_string()]);
            state.running = false;
            summary.ended = true;
            summary.winner = Some(winner_id);
        }
    }

    summary.factions_alive = state.factions.len();
    invariants::check(state, config.conflict.destruction_threshold)?;

    debug!(
        tick,
        factions_alive = summary.factions_alive,
        expansions = summary.expansions,
        conflicts_won = summary.conflicts_won,
        conflicts_defended = summary.conflicts_defended,
        "Tick complete"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::collections::BTreeSet;

    use eruxian_types::{ResourceKind, TileCoord};
    use eruxian_world::{SequenceRandom, StdRandom};

    use super::*;
    use crate::decision::UniformSelector;

    /// An unplaced faction with the given strength and stockpile.
    pub(crate) fn make_faction(n: u32, strength: f64, food: f64, wood: f64, ore: f64) -> Faction {
        let mut stockpile = BTreeMap::new();
        stockpile.insert(ResourceKind::Food, food);
        stockpile.insert(ResourceKind::Wood, wood);
        stockpile.insert(ResourceKind::Ore, ore);
        Faction {
            id: FactionId::new(),
            name: format!("Clan_{n}"),
            color: String::from("#FF0000"),
            owned_tiles: BTreeSet::new(),
            strength,
            stockpile,
            mana: 20.0,
            relationships: BTreeMap::new(),
        }
    }

    /// Build a featureless state and hand each faction its tiles.
    pub(crate) fn make_state(
        width: u32,
        height: u32,
        placements: Vec<(Faction, Vec<TileCoord>)>,
    ) -> SimulationState {
        let mut map = WorldMap::new(width, height).unwrap();
        let mut factions = BTreeMap::new();
        for (mut faction, tiles) in placements {
            for coord in tiles {
                map.set_owner(coord, Some(faction.id)).unwrap();
                faction.owned_tiles.insert(coord);
            }
            factions.insert(faction.id, faction);
        }
        SimulationState::from_world(map, factions, 200)
    }

    #[test]
    fn initialize_places_factions_on_their_start_tiles() {
        let config = SimulationConfig::default();
        let mut rng = eruxian_world::StdRandom::seeded(7);
        let state = SimulationState::initialize(&config, &mut rng).unwrap();
        assert_eq!(state.tick, 0);
        assert!(state.events.is_empty());
        assert!(!state.running);
        assert!(state.factions.len() <= 5);
        assert!(!state.factions.is_empty());
        let owned: usize = state.map.tiles().filter(|t| t.owner.is_some()).count();
        assert_eq!(owned, state.factions.len());
        for faction in state.factions.values() {
            assert_eq!(faction.owned_tiles.len(), 1);
        }
    }

    #[test]
    fn idle_factions_only_advance_the_counter() {
        let config = SimulationConfig::default();
        let poor = make_faction(1, 10.0, 10.0, 10.0, 0.0);
        let mut state = make_state(3, 3, vec![(poor, vec![TileCoord::new(1, 1)])]);
        let mut rng = SequenceRandom::constant(0.5);
        let summary = run_tick(&mut state, &config, &mut rng, &mut UniformSelector).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.expansions, 0);
        assert_eq!(summary.factions_alive, 1);
        assert!(!summary.ended);
        assert!(state.events.is_empty());
    }

    #[test]
    fn rich_faction_expands_once_per_tick() {
        let config = SimulationConfig::default();
        let rich = make_faction(1, 13.0, 50.0, 50.0, 10.0);
        let id = rich.id;
        let mut state = make_state(3, 3, vec![(rich, vec![TileCoord::new(1, 1)])]);
        let mut rng = SequenceRandom::constant(0.0);
        let summary = run_tick(&mut state, &config, &mut rng, &mut UniformSelector).unwrap();
        assert_eq!(summary.expansions, 1);
        let faction = state.factions.get(&id).unwrap();
        assert_eq!(faction.owned_tiles.len(), 2);
        assert!((faction.strength - 14.0).abs() < f64::EPSILON);
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn milestone_logged_on_interval() {
        let mut config = SimulationConfig::default();
        config.clock.milestone_interval = 2;
        let poor = make_faction(1, 10.0, 0.0, 0.0, 0.0);
        let mut state = make_state(2, 2, vec![(poor, vec![TileCoord::new(0, 0)])]);
        let mut rng = SequenceRandom::constant(0.5);
        run_tick(&mut state, &config, &mut rng, &mut UniformSelector).unwrap();
        assert!(state.events.is_empty());
        run_tick(&mut state, &config, &mut rng, &mut UniformSelector).unwrap();
        let events = state.events.recent(10);
        assert_eq!(events.len(), 1);
        assert_eq!(events.first().unwrap().event_type, EventType::TickMilestone);
        assert_eq!(events.first().unwrap().description, "Reached tick 2.");
    }

    #[test]
    fn last_survivor_ends_the_game() {
        let config = SimulationConfig::default();
        let attacker = make_faction(1, 20.0, 0.0, 0.0, 10.0);
        let defender = make_faction(2, 15.0, 0.0, 0.0, 0.0);
        let attacker_id = attacker.id;
        let mut state = make_state(
            2,
            1,
            vec![
                (attacker, vec![TileCoord::new(0, 0)]),
                (defender, vec![TileCoord::new(1, 0)]),
            ],
        );
        state.running = true;
        // 0.5 yields a multiplier of exactly 1.0 for both sides.
        let mut rng = SequenceRandom::constant(0.5);
        let summary = run_tick(&mut state, &config, &mut rng, &mut UniformSelector).unwrap();

        assert!(summary.ended);
        assert_eq!(summary.winner, Some(attacker_id));
        assert_eq!(summary.conflicts_won, 1);
        assert_eq!(summary.factions_destroyed, 1);
        assert_eq!(state.factions.len(), 1);
        assert!(!state.running);
        let types: Vec<EventType> = state.events.iter().map(|e| e.event_type).collect();
        assert_eq!(
            types,
            vec![
                EventType::ConflictWin,
                EventType::FactionDestroyed,
                EventType::SimulationEnd,
            ]
        );
    }

    #[test]
    fn lone_faction_at_start_does_not_end_the_game() {
        let config = SimulationConfig::default();
        let solo = make_faction(1, 10.0, 0.0, 0.0, 0.0);
        let mut state = make_state(2, 2, vec![(solo, vec![TileCoord::new(0, 0)])]);
        state.running = true;
        let mut rng = SequenceRandom::constant(0.5);
        let summary = run_tick(&mut state, &config, &mut rng, &mut UniformSelector).unwrap();
        assert!(!summary.ended);
        assert!(state.running);
    }

    #[test]
    fn tick_overflow_is_reported() {
        let config = SimulationConfig::default();
        let mut state = make_state(1, 1, Vec::new());
        state.tick = u64::MAX;
        let mut rng = SequenceRandom::constant(0.5);
        let result = run_tick(&mut state, &config, &mut rng, &mut UniformSelector);
        assert!(matches!(result, Err(TickError::TickOverflow)));
    }

    #[test]
    fn aggressive_games_hold_invariants_over_many_ticks() {
        let mut config = SimulationConfig::default();
        config.world.width = 10;
        config.world.height = 8;
        config.ai.expansion_resource_threshold = 5.0;
        config.ai.expansion_strength_threshold = 5.0;
        config.ai.attack_strength_threshold = 8.0;

        let mut expansions = 0;
        let mut conflicts = 0;
        for seed in 0..12 {
            let mut rng = StdRandom::seeded(seed);
            let mut state = SimulationState::initialize(&config, &mut rng).unwrap();
            for _ in 0..600 {
                // Any invariant violation surfaces as an error here.
                let summary =
                    run_tick(&mut state, &config, &mut rng, &mut UniformSelector).unwrap();
                expansions += summary.expansions;
                conflicts += summary.conflicts_won + summary.conflicts_defended;
                if summary.ended {
                    assert_eq!(state.factions.len(), 1);
                    assert!(!state.running);
                    break;
                }
            }
        }
        assert!(expansions > 0);
        assert!(conflicts > 0);
    }
}
