//! Stochastic combat over a single tile.
//!
//! Each side's strength is scaled by an independent uniform multiplier.
//! The attacker takes the tile only if its effective strength beats the
//! defender's by the configured win ratio. A beaten defender left with no
//! tiles, or with strength at the destruction threshold, is eliminated on
//! the spot.

use eruxian_types::{EventType, FactionId, TileCoord};
use eruxian_world::RandomSource;
use tracing::{debug, info};

use crate::config::ConflictConfig;
use crate::tick::SimulationState;

/// How a resolved attack ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictOutcome {
    /// The attacker took the tile.
    Conquered {
        /// Whether the defender was eliminated as a result.
        defender_destroyed: bool,
    },
    /// The defender held the tile.
    Repelled,
}

/// Draw the attacker's and then the defender's strength multiplier.
pub fn roll_multipliers(config: &ConflictConfig, rng: &mut dyn RandomSource) -> (f64, f64) {
    let attacker = rng.uniform(config.multiplier_min, config.multiplier_max);
    let defender = rng.uniform(config.multiplier_min, config.multiplier_max);
    (attacker, defender)
}

/// Whether the attacker wins given both strengths and multipliers.
pub fn attacker_wins(
    attack_strength: f64,
    defense_strength: f64,
    (attack_mult, defense_mult): (f64, f64),
    win_ratio: f64,
) -> bool {
    attack_strength * attack_mult > defense_strength * defense_mult * win_ratio
}

/// Resolve an attack on `tile`.
///
/// Returns `None` without drawing if either faction no longer exists.
pub fn resolve_conflict(
    state: &mut SimulationState,
    attacker: FactionId,
    defender: FactionId,
    tile: TileCoord,
    config: &ConflictConfig,
    rng: &mut dyn RandomSource,
) -> Option<ConflictOutcome> {
    let attack_strength = state.factions.get(&attacker)?.strength;
    let defense_strength = state.factions.get(&defender)?.strength;
    let attacker_name = state.faction_name(attacker);
    let defender_name = state.faction_name(defender);

    let multipliers = roll_multipliers(config, rng);
    let won = attacker_wins(attack_strength, defense_strength, multipliers, config.win_ratio);
    debug!(
        attacker = %attacker_name,
        defender = %defender_name,
        attack_strength,
        defense_strength,
        attack_mult = multipliers.0,
        defense_mult = multipliers.1,
        won,
        "Conflict resolved"
    );

    if !won {
        if let Some(a) = state.factions.get_mut(&attacker) {
            a.strength = (a.strength - config.repelled_loss).max(config.repelled_floor());
        }
        if let Some(d) = state.factions.get_mut(&defender) {
            d.strength = (d.strength - config.defender_loss).max(config.destruction_threshold);
        }
        state.events.push(
            EventType::ConflictDefend,
            format!(
                "{defender_name} successfully defended tile ({}, {}) against {attacker_name}.",
                tile.x, tile.y
            ),
            vec![defender.to_string(), attacker.to_string(), tile.to_string()],
        );
        return Some(ConflictOutcome::Repelled);
    }

    state.map.set_owner(tile, Some(attacker)).ok()?;
    if let Some(a) = state.factions.get_mut(&attacker) {
        a.owned_tiles.insert(tile);
        a.strength += config.victor_gain;
    }
    let mut destroyed = false;
    if let Some(d) = state.factions.get_mut(&defender) {
        d.owned_tiles.remove(&tile);
        d.strength = (d.strength - config.vanquished_loss).max(config.destruction_threshold);
        destroyed = d.owned_tiles.is_empty() || d.strength <= config.destruction_threshold;
    }
    state.events.push(
        EventType::ConflictWin,
        format!(
            "{attacker_name} defeated {defender_name} and conquered tile ({}, {}).",
            tile.x, tile.y
        ),
        vec![attacker.to_string(), defender.to_string(), tile.to_string()],
    );

    if destroyed {
        eliminate_faction(state, defender, attacker);
    }
    Some(ConflictOutcome::Conquered {
        defender_destroyed: destroyed,
    })
}

/// Remove a faction and release every tile still pointing at it.
///
/// Returns the number of tiles released, or `None` if the faction was
/// already gone.
pub fn eliminate_faction(
    state: &mut SimulationState,
    victim: FactionId,
    victor: FactionId,
) -> Option<usize> {
    let removed = state.factions.remove(&victim)?;
    let released = state.map.release_all(victim);
    let victor_name = state.faction_name(victor);
    info!(
        faction = %removed.name,
        destroyed_by = %victor_name,
        released,
        "Faction destroyed"
    );
    state.events.push(
        EventType::FactionDestroyed,
        format!("{} was destroyed by {victor_name}.", removed.name),
        vec![victim.to_string(), victor.to_string()],
    );
    Some(released)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use eruxian_world::SequenceRandom;

    use super::*;
    use crate::tick::tests::{make_faction, make_state};

    const EPS: f64 = 1e-9;

    /// Multipliers of exactly 1.0 for both sides.
    fn even_odds() -> SequenceRandom {
        SequenceRandom::constant(0.5)
    }

    #[test]
    fn multipliers_span_configured_range() {
        let config = ConflictConfig::default();
        let mut rng = SequenceRandom::new(vec![0.0, 0.5]);
        let (a, d) = roll_multipliers(&config, &mut rng);
        assert!((a - 0.8).abs() < EPS);
        assert!((d - 1.0).abs() < EPS);
    }

    #[test]
    fn win_requires_margin() {
        assert!(attacker_wins(20.0, 15.0, (1.0, 1.0), 1.1));
        assert!(!attacker_wins(16.0, 15.0, (1.0, 1.0), 1.1));
        assert!(!attacker_wins(16.5, 15.0, (1.0, 1.0), 1.1));
    }

    #[test]
    fn conquest_transfers_tile_and_adjusts_strength() {
        let config = ConflictConfig::default();
        let attacker = make_faction(1, 20.0, 0.0, 0.0, 0.0);
        let defender = make_faction(2, 15.0, 0.0, 0.0, 0.0);
        let (a, d) = (attacker.id, defender.id);
        let target = TileCoord::new(1, 0);
        let mut state = make_state(
            3,
            1,
            vec![
                (attacker, vec![TileCoord::new(0, 0)]),
                (defender, vec![target, TileCoord::new(2, 0)]),
            ],
        );

        let outcome = resolve_conflict(&mut state, a, d, target, &config, &mut even_odds());
        assert_eq!(
            outcome,
            Some(ConflictOutcome::Conquered {
                defender_destroyed: false
            })
        );
        assert_eq!(state.map.owner(target), Some(a));
        let attacker = state.factions.get(&a).unwrap();
        let defender = state.factions.get(&d).unwrap();
        assert!(attacker.owned_tiles.contains(&target));
        assert!(!defender.owned_tiles.contains(&target));
        assert!((attacker.strength - 22.0).abs() < EPS);
        assert!((defender.strength - 12.0).abs() < EPS);
        let event = state.events.recent(1).pop().unwrap();
        assert_eq!(event.event_type, EventType::ConflictWin);
        assert_eq!(event.description, "Clan_1 defeated Clan_2 and conquered tile (1, 0).");
        assert_eq!(
            event.entities,
            vec![a.to_string(), d.to_string(), String::from("tile_1_0")]
        );
    }

    #[test]
    fn repelled_attack_keeps_ownership() {
        let config = ConflictConfig::default();
        let attacker = make_faction(1, 16.0, 0.0, 0.0, 0.0);
        let defender = make_faction(2, 15.0, 0.0, 0.0, 0.0);
        let (a, d) = (attacker.id, defender.id);
        let target = TileCoord::new(1, 0);
        let mut state = make_state(
            2,
            1,
            vec![
                (attacker, vec![TileCoord::new(0, 0)]),
                (defender, vec![target]),
            ],
        );

        let outcome = resolve_conflict(&mut state, a, d, target, &config, &mut even_odds());
        assert_eq!(outcome, Some(ConflictOutcome::Repelled));
        assert_eq!(state.map.owner(target), Some(d));
        assert!((state.factions.get(&a).unwrap().strength - 14.0).abs() < EPS);
        assert!((state.factions.get(&d).unwrap().strength - 14.0).abs() < EPS);
        let event = state.events.recent(1).pop().unwrap();
        assert_eq!(event.event_type, EventType::ConflictDefend);
        assert_eq!(
            event.description,
            "Clan_2 successfully defended tile (1, 0) against Clan_1."
        );
    }

    #[test]
    fn repelled_strength_floors() {
        let config = ConflictConfig::default();
        let attacker = make_faction(1, 2.2, 0.0, 0.0, 0.0);
        let defender = make_faction(2, 1.5, 0.0, 0.0, 0.0);
        let (a, d) = (attacker.id, defender.id);
        let target = TileCoord::new(1, 0);
        let mut state = make_state(
            2,
            1,
            vec![
                (attacker, vec![TileCoord::new(0, 0)]),
                (defender, vec![target]),
            ],
        );
        // Attacker rolls 0.8, defender rolls 1.2: 1.76 does not beat 1.98.
        let mut rng = SequenceRandom::new(vec![0.0, 0.999_999]);
        let outcome = resolve_conflict(&mut state, a, d, target, &config, &mut rng);
        assert_eq!(outcome, Some(ConflictOutcome::Repelled));
        assert!((state.factions.get(&a).unwrap().strength - 2.0).abs() < EPS);
        assert!((state.factions.get(&d).unwrap().strength - 1.0).abs() < EPS);
    }

    #[test]
    fn repelled_floor_follows_destruction_threshold() {
        let config = ConflictConfig {
            destruction_threshold: 5.0,
            ..ConflictConfig::default()
        };
        let attacker = make_faction(1, 6.0, 0.0, 0.0, 0.0);
        let defender = make_faction(2, 5.5, 0.0, 0.0, 0.0);
        let (a, d) = (attacker.id, defender.id);
        let target = TileCoord::new(1, 0);
        let mut state = make_state(
            2,
            1,
            vec![
                (attacker, vec![TileCoord::new(0, 0)]),
                (defender, vec![target]),
            ],
        );

        let outcome = resolve_conflict(&mut state, a, d, target, &config, &mut even_odds());
        assert_eq!(outcome, Some(ConflictOutcome::Repelled));
        assert!((state.factions.get(&a).unwrap().strength - 6.0).abs() < EPS);
        assert!((state.factions.get(&d).unwrap().strength - 5.0).abs() < EPS);
        assert!(crate::invariants::check(&state, config.destruction_threshold).is_ok());
    }

    #[test]
    fn losing_last_tile_eliminates_defender() {
        let config = ConflictConfig::default();
        let attacker = make_faction(1, 20.0, 0.0, 0.0, 0.0);
        let defender = make_faction(2, 15.0, 0.0, 0.0, 0.0);
        let (a, d) = (attacker.id, defender.id);
        let target = TileCoord::new(1, 0);
        let mut state = make_state(
            2,
            1,
            vec![
                (attacker, vec![TileCoord::new(0, 0)]),
                (defender, vec![target]),
            ],
        );

        let outcome = resolve_conflict(&mut state, a, d, target, &config, &mut even_odds());
        assert_eq!(
            outcome,
            Some(ConflictOutcome::Conquered {
                defender_destroyed: true
            })
        );
        assert!(!state.factions.contains_key(&d));
        let events = state.events.recent(2);
        assert_eq!(events.first().unwrap().event_type, EventType::ConflictWin);
        let destroyed = events.get(1).unwrap();
        assert_eq!(destroyed.event_type, EventType::FactionDestroyed);
        assert_eq!(destroyed.description, "Clan_2 was destroyed by Clan_1.");
        assert_eq!(destroyed.entities, vec![d.to_string(), a.to_string()]);
    }

    #[test]
    fn weakened_defender_is_eliminated_and_stray_tiles_released() {
        let config = ConflictConfig::default();
        let attacker = make_faction(1, 20.0, 0.0, 0.0, 0.0);
        let defender = make_faction(2, 4.0, 0.0, 0.0, 0.0);
        let (a, d) = (attacker.id, defender.id);
        let target = TileCoord::new(1, 0);
        let stray = TileCoord::new(2, 0);
        let mut state = make_state(
            3,
            1,
            vec![
                (attacker, vec![TileCoord::new(0, 0)]),
                (defender, vec![target, stray]),
            ],
        );

        let outcome = resolve_conflict(&mut state, a, d, target, &config, &mut even_odds());
        assert_eq!(
            outcome,
            Some(ConflictOutcome::Conquered {
                defender_destroyed: true
            })
        );
        assert!(!state.factions.contains_key(&d));
        assert_eq!(state.map.owner(stray), None);
        assert_eq!(state.map.owner(target), Some(a));
    }

    #[test]
    fn missing_faction_draws_nothing() {
        let config = ConflictConfig::default();
        let attacker = make_faction(1, 20.0, 0.0, 0.0, 0.0);
        let a = attacker.id;
        let mut state = make_state(2, 1, vec![(attacker, vec![TileCoord::new(0, 0)])]);
        let mut rng = even_odds();
        let outcome = resolve_conflict(
            &mut state,
            a,
            FactionId::new(),
            TileCoord::new(1, 0),
            &config,
            &mut rng,
        );
        assert!(outcome.is_none());
        assert_eq!(rng.draws(), 0);
        assert!(state.events.is_empty());
    }
}
