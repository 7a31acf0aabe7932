//! Post-tick consistency checks.
//!
//! After every tick the state must satisfy:
//!
//! - Every owned tile points at a live faction whose owned set contains it,
//!   and every owned set entry points back at its faction.
//! - Stockpiles, mana, node quantities and pool levels are non-negative.
//! - Pools never exceed capacity.
//! - Live factions sit at or above the destruction threshold.

use eruxian_types::{FactionId, TileCoord, TileFeature};
use tracing::warn;

use crate::tick::SimulationState;

/// A broken state invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    /// A tile names an owner that is gone or does not list it.
    #[error("tile {coord} is owned by {owner} but missing from its owned set")]
    OrphanedTile {
        /// The tile.
        coord: TileCoord,
        /// The owner recorded on the tile.
        owner: FactionId,
    },

    /// A faction lists a tile that records a different owner.
    #[error("faction {faction} lists tile {coord} which it does not own")]
    PhantomTile {
        /// The faction.
        faction: FactionId,
        /// The listed tile.
        coord: TileCoord,
    },

    /// A stockpile entry or mana total went negative.
    #[error("faction {faction} holds a negative amount of {what}")]
    NegativeHolding {
        /// The faction.
        faction: FactionId,
        /// What went negative.
        what: String,
    },

    /// A node or pool went negative or over capacity.
    #[error("tile {coord} store out of range: {value}")]
    StoreOutOfRange {
        /// The tile.
        coord: TileCoord,
        /// The offending quantity.
        value: f64,
    },

    /// A live faction's strength fell below the floor.
    #[error("faction {faction} strength {strength} is below the floor")]
    StrengthBelowFloor {
        /// The faction.
        faction: FactionId,
        /// Its strength.
        strength: f64,
    },
}

/// Verify every invariant, reporting the first violation found.
///
/// # Errors
///
/// Returns the first [`InvariantViolation`] encountered.
pub fn check(state: &SimulationState, strength_floor: f64) -> Result<(), InvariantViolation> {
    let result = check_inner(state, strength_floor);
    if let Err(violation) = &result {
        warn!(tick = state.tick, %violation, "State invariant violated");
    }
    result
}

fn check_inner(state: &SimulationState, strength_floor: f64) -> Result<(), InvariantViolation> {
    for tile in state.map.tiles() {
        if let Some(owner) = tile.owner {
            let listed = state
                .factions
                .get(&owner)
                .is_some_and(|f| f.owned_tiles.contains(&tile.coord));
            if !listed {
                return Err(InvariantViolation::OrphanedTile {
                    coord: tile.coord,
                    owner,
                });
            }
        }
        let value = match &tile.feature {
            Some(TileFeature::Resource(node)) if node.quantity < 0.0 => Some(node.quantity),
            Some(TileFeature::Mana(pool)) if pool.current < 0.0 || pool.current > pool.capacity => {
                Some(pool.current)
            }
            _ => None,
        };
        if let Some(value) = value {
            return Err(InvariantViolation::StoreOutOfRange {
                coord: tile.coord,
                value,
            });
        }
    }

    for faction in state.factions.values() {
        for &coord in &faction.owned_tiles {
            if state.map.owner(coord) != Some(faction.id) {
                return Err(InvariantViolation::PhantomTile {
                    faction: faction.id,
                    coord,
                });
            }
        }
        if let Some((kind, _)) = faction.stockpile.iter().find(|(_, v)| **v < 0.0) {
            return Err(InvariantViolation::NegativeHolding {
                faction: faction.id,
                what: format!("{kind:?}"),
            });
        }
        if faction.mana < 0.0 {
            return Err(InvariantViolation::NegativeHolding {
                faction: faction.id,
                what: String::from("mana"),
            });
        }
        if faction.strength < strength_floor {
            return Err(InvariantViolation::StrengthBelowFloor {
                faction: faction.id,
                strength: faction.strength,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use eruxian_types::{ManaPool, ResourceKind};

    use super::*;
    use crate::tick::tests::{make_faction, make_state};

    #[test]
    fn consistent_state_passes() {
        let faction = make_faction(1, 10.0, 50.0, 50.0, 10.0);
        let state = make_state(3, 3, vec![(faction, vec![TileCoord::new(1, 1)])]);
        assert!(check(&state, 1.0).is_ok());
    }

    #[test]
    fn tile_owner_without_listing_is_orphaned() {
        let faction = make_faction(1, 10.0, 0.0, 0.0, 0.0);
        let id = faction.id;
        let mut state = make_state(3, 3, vec![(faction, vec![TileCoord::new(1, 1)])]);
        state.map.set_owner(TileCoord::new(0, 0), Some(id)).unwrap();
        assert!(matches!(
            check(&state, 1.0),
            Err(InvariantViolation::OrphanedTile { .. })
        ));
    }

    #[test]
    fn listed_tile_owned_by_nobody_is_phantom() {
        let faction = make_faction(1, 10.0, 0.0, 0.0, 0.0);
        let id = faction.id;
        let mut state = make_state(3, 3, vec![(faction, vec![TileCoord::new(1, 1)])]);
        state
            .factions
            .get_mut(&id)
            .unwrap()
            .owned_tiles
            .insert(TileCoord::new(2, 2));
        assert!(matches!(
            check(&state, 1.0),
            Err(InvariantViolation::PhantomTile { .. })
        ));
    }

    #[test]
    fn negative_stock_and_weak_factions_are_caught() {
        let faction = make_faction(1, 10.0, 0.0, 0.0, 0.0);
        let id = faction.id;
        let mut state = make_state(2, 2, vec![(faction, vec![TileCoord::new(0, 0)])]);
        state
            .factions
            .get_mut(&id)
            .unwrap()
            .stockpile
            .insert(ResourceKind::Ore, -1.0);
        assert!(matches!(
            check(&state, 1.0),
            Err(InvariantViolation::NegativeHolding { .. })
        ));

        let faction = state.factions.get_mut(&id).unwrap();
        faction.stockpile.insert(ResourceKind::Ore, 0.0);
        faction.strength = 0.5;
        assert!(matches!(
            check(&state, 1.0),
            Err(InvariantViolation::StrengthBelowFloor { .. })
        ));
    }

    #[test]
    fn overfull_pool_is_caught() {
        let mut state = make_state(2, 2, Vec::new());
        state.map.tile_mut(TileCoord::new(1, 1)).unwrap().feature =
            Some(TileFeature::Mana(ManaPool {
                current: 150.0,
                capacity: 100.0,
                regen_rate: 1.0,
            }));
        assert!(matches!(
            check(&state, 1.0),
            Err(InvariantViolation::StoreOutOfRange { .. })
        ));
    }
}
