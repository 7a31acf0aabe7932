//! Per-faction action choice: expand, attack, or idle.
//!
//! A faction's turn has three steps. [`candidates`] lists every adjacent
//! tile the faction could claim or attack given its eligibility. An
//! [`ActionSelector`] picks one of them. [`take_turn`] pays the costs and
//! applies the result, handing attacks to the conflict resolver.
//!
//! The selector is a trait so the policy can be swapped without touching
//! candidate generation. [`UniformSelector`] picks uniformly at random.

use std::collections::{BTreeMap, BTreeSet};

use eruxian_types::{EventType, Faction, FactionId, ResourceKind, TileCoord};
use eruxian_world::{RandomSource, WorldMap};
use tracing::debug;

use crate::config::{AiConfig, SimulationConfig};
use crate::conflict::{self, ConflictOutcome};
use crate::tick::SimulationState;

/// Which action kinds a faction may take this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eligibility {
    /// Total stockpile and strength both clear their thresholds.
    pub can_expand: bool,
    /// Strength clears the attack threshold.
    pub can_attack: bool,
}

impl Eligibility {
    /// Evaluate a faction against the AI thresholds.
    pub fn of(faction: &Faction, ai: &AiConfig) -> Self {
        Self {
            can_expand: faction.total_stockpile() > ai.expansion_resource_threshold
                && faction.strength > ai.expansion_strength_threshold,
            can_attack: faction.strength > ai.attack_strength_threshold,
        }
    }

    /// Whether any action is possible.
    pub const fn any(self) -> bool {
        self.can_expand || self.can_attack
    }
}

/// What a candidate would do to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Claim an unowned tile.
    Expand,
    /// Attack a tile owned by another faction.
    Attack {
        /// The tile's owner at candidate time.
        defender: FactionId,
    },
}

/// One possible action against one adjacent tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// The neighbor tile.
    pub target: TileCoord,
    /// Expand or attack.
    pub kind: ActionKind,
}

/// List every action the faction could take this turn.
///
/// Neighbors are visited per owned tile in north, south, east, west order.
/// A target reachable from several owned tiles appears once, with the
/// first occurrence kept.
pub fn candidates(
    faction: &Faction,
    map: &WorldMap,
    factions: &BTreeMap<FactionId, Faction>,
    ai: &AiConfig,
) -> Vec<Candidate> {
    let eligibility = Eligibility::of(faction, ai);
    if !eligibility.any() {
        return Vec::new();
    }

    let mut seen = BTreeSet::new();
    let mut found = Vec::new();
    for &owned in &faction.owned_tiles {
        for target in map.neighbors(owned) {
            if seen.contains(&target) {
                continue;
            }
            let kind = match map.owner(target) {
                None if eligibility.can_expand => Some(ActionKind::Expand),
                Some(owner) if owner != faction.id && eligibility.can_attack => factions
                    .get(&owner)
                    .filter(|d| faction.strength > d.strength)
                    .map(|_| ActionKind::Attack { defender: owner }),
                _ => None,
            };
            if let Some(kind) = kind {
                seen.insert(target);
                found.push(Candidate { target, kind });
            }
        }
    }
    found
}

/// Policy choosing one candidate from the pool.
pub trait ActionSelector: Send {
    /// Index of the chosen candidate, or `None` to idle.
    fn select(&mut self, candidates: &[Candidate], rng: &mut dyn RandomSource) -> Option<usize>;
}

/// Picks uniformly among all candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSelector;

impl ActionSelector for UniformSelector {
    fn select(&mut self, candidates: &[Candidate], rng: &mut dyn RandomSource) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        Some(rng.below(candidates.len()))
    }
}

/// What a faction did with its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// No eligible action, no candidate, or the selector declined.
    Idle,
    /// Claimed a tile.
    Expanded {
        /// The claimed tile.
        target: TileCoord,
    },
    /// Attacked and the conflict was resolved.
    Attacked {
        /// The contested tile.
        target: TileCoord,
        /// The defending faction.
        defender: FactionId,
        /// How the fight ended.
        outcome: ConflictOutcome,
    },
    /// The chosen attack no longer had a live defender.
    AttackAborted {
        /// The tile that would have been attacked.
        target: TileCoord,
    },
}

/// Run one faction's decision and apply it to the state.
///
/// A faction that no longer exists idles.
pub fn take_turn(
    state: &mut SimulationState,
    id: FactionId,
    config: &SimulationConfig,
    rng: &mut dyn RandomSource,
    selector: &mut dyn ActionSelector,
) -> ActionOutcome {
    let Some(faction) = state.factions.get(&id) else {
        return ActionOutcome::Idle;
    };
    let pool = candidates(faction, &state.map, &state.factions, &config.ai);
    let Some(choice) = selector.select(&pool, rng).and_then(|i| pool.get(i).copied()) else {
        return ActionOutcome::Idle;
    };

    match choice.kind {
        ActionKind::Expand => expand(state, id, choice.target, &config.ai),
        ActionKind::Attack { .. } => attack(state, id, choice.target, config, rng),
    }
}

fn expand(
    state: &mut SimulationState,
    id: FactionId,
    target: TileCoord,
    ai: &AiConfig,
) -> ActionOutcome {
    if state.map.owner(target).is_some() || state.map.set_owner(target, Some(id)).is_err() {
        return ActionOutcome::Idle;
    }
    let Some(faction) = state.factions.get_mut(&id) else {
        return ActionOutcome::Idle;
    };
    faction.owned_tiles.insert(target);
    faction.strength += ai.expansion_strength_gain;
    faction.debit(ResourceKind::Food, ai.expansion_food_cost);
    faction.debit(ResourceKind::Wood, ai.expansion_wood_cost);
    let description = format!("{} expanded to tile ({}, {}).", faction.name, target.x, target.y);
    debug!(faction = %faction.name, x = target.x, y = target.y, "Faction expanded");
    state.events.push(
        EventType::FactionExpand,
        description,
        vec![id.to_string(), target.to_string()],
    );
    ActionOutcome::Expanded { target }
}

fn attack(
    state: &mut SimulationState,
    id: FactionId,
    target: TileCoord,
    config: &SimulationConfig,
    rng: &mut dyn RandomSource,
) -> ActionOutcome {
    // The defender is whoever owns the tile now.
    let Some(defender) = state
        .map
        .owner(target)
        .filter(|owner| *owner != id && state.factions.contains_key(owner))
    else {
        return ActionOutcome::AttackAborted { target };
    };
    let Some(faction) = state.factions.get_mut(&id) else {
        return ActionOutcome::Idle;
    };
    faction.debit(ResourceKind::Ore, config.ai.attack_ore_cost);
    faction.spend_mana(config.ai.attack_mana_cost);
    faction.strength -= config.ai.attack_strength_cost;

    match conflict::resolve_conflict(state, id, defender, target, &config.conflict, rng) {
        Some(outcome) => ActionOutcome::Attacked {
            target,
            defender,
            outcome,
        },
        None => ActionOutcome::AttackAborted { target },
    }
}
