//! Random starting world: resource scatter, mana scatter and faction spawn.
//!
//! Placement is best-effort. Each scatter pass makes a fixed number of
//! attempts on uniformly random tiles and silently skips tiles that already
//! hold a feature. Faction spawn keeps sampling until the requested count is
//! placed or the failure budget runs out, in which case the world starts
//! with fewer factions.

use std::collections::{BTreeMap, BTreeSet};

use eruxian_types::{
    Faction, FactionId, ManaPool, ResourceKind, ResourceNode, TileCoord, TileFeature,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::WorldError;
use crate::random::RandomSource;
use crate::world_map::WorldMap;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// World generation parameters. Loaded as the `world` config section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldGenConfig {
    /// Grid columns.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Grid rows.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Resource node scatter.
    #[serde(default)]
    pub resources: ResourceScatterConfig,

    /// Mana pool scatter.
    #[serde(default)]
    pub mana: ManaScatterConfig,

    /// Faction spawn.
    #[serde(default)]
    pub factions: FactionSpawnConfig,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            resources: ResourceScatterConfig::default(),
            mana: ManaScatterConfig::default(),
            factions: FactionSpawnConfig::default(),
        }
    }
}

/// Resource node scatter parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceScatterConfig {
    /// Attempts as a fraction of the tile count.
    #[serde(default = "default_resource_fraction")]
    pub fraction: f64,

    /// Minimum starting quantity.
    #[serde(default = "default_resource_quantity_base")]
    pub quantity_base: u32,

    /// Random extra quantity, drawn from `0..quantity_spread`.
    #[serde(default = "default_resource_quantity_spread")]
    pub quantity_spread: u32,

    /// Lower bound of the regen rate.
    #[serde(default = "default_resource_regen_min")]
    pub regen_min: f64,

    /// Upper bound (exclusive) of the regen rate.
    #[serde(default = "default_resource_regen_max")]
    pub regen_max: f64,
}

impl Default for ResourceScatterConfig {
    fn default() -> Self {
        Self {
            fraction: default_resource_fraction(),
            quantity_base: default_resource_quantity_base(),
            quantity_spread: default_resource_quantity_spread(),
            regen_min: default_resource_regen_min(),
            regen_max: default_resource_regen_max(),
        }
    }
}

/// Mana pool scatter parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManaScatterConfig {
    /// Attempts as a fraction of the tile count.
    #[serde(default = "default_mana_fraction")]
    pub fraction: f64,

    /// Minimum starting mana.
    #[serde(default = "default_mana_current_base")]
    pub current_base: u32,

    /// Random extra starting mana, drawn from `0..current_spread`.
    #[serde(default = "default_mana_current_spread")]
    pub current_spread: u32,

    /// Minimum capacity.
    #[serde(default = "default_mana_capacity_base")]
    pub capacity_base: u32,

    /// Random extra capacity, drawn from `0..capacity_spread`.
    #[serde(default = "default_mana_capacity_spread")]
    pub capacity_spread: u32,

    /// Lower bound of the regen rate.
    #[serde(default = "default_mana_regen_min")]
    pub regen_min: f64,

    /// Upper bound (exclusive) of the regen rate.
    #[serde(default = "default_mana_regen_max")]
    pub regen_max: f64,
}

impl Default for ManaScatterConfig {
    fn default() -> Self {
        Self {
            fraction: default_mana_fraction(),
            current_base: default_mana_current_base(),
            current_spread: default_mana_current_spread(),
            capacity_base: default_mana_capacity_base(),
            capacity_spread: default_mana_capacity_spread(),
            regen_min: default_mana_regen_min(),
            regen_max: default_mana_regen_max(),
        }
    }
}

/// Faction spawn parameters and starting values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FactionSpawnConfig {
    /// Factions to place.
    #[serde(default = "default_faction_count")]
    pub count: usize,

    /// Minimum straight-line distance between starting tiles.
    #[serde(default = "default_min_separation")]
    pub min_separation: f64,

    /// Rejected samples allowed before giving up.
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,

    /// Starting strength.
    #[serde(default = "default_starting_strength")]
    pub strength: f64,

    /// Starting Food.
    #[serde(default = "default_starting_food")]
    pub food: f64,

    /// Starting Wood.
    #[serde(default = "default_starting_wood")]
    pub wood: f64,

    /// Starting Ore.
    #[serde(default = "default_starting_ore")]
    pub ore: f64,

    /// Starting mana.
    #[serde(default = "default_starting_mana")]
    pub mana: f64,

    /// Display colors, assigned in spawn order and reused cyclically.
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
}

impl Default for FactionSpawnConfig {
    fn default() -> Self {
        Self {
            count: default_faction_count(),
            min_separation: default_min_separation(),
            max_failed_attempts: default_max_failed_attempts(),
            strength: default_starting_strength(),
            food: default_starting_food(),
            wood: default_starting_wood(),
            ore: default_starting_ore(),
            mana: default_starting_mana(),
            palette: default_palette(),
        }
    }
}

const fn default_width() -> u32 {
    20
}
const fn default_height() -> u32 {
    15
}
const fn default_resource_fraction() -> f64 {
    0.15
}
const fn default_resource_quantity_base() -> u32 {
    100
}
const fn default_resource_quantity_spread() -> u32 {
    150
}
const fn default_resource_regen_min() -> f64 {
    0.1
}
const fn default_resource_regen_max() -> f64 {
    0.5
}
const fn default_mana_fraction() -> f64 {
    0.1
}
const fn default_mana_current_base() -> u32 {
    50
}
const fn default_mana_current_spread() -> u32 {
    50
}
const fn default_mana_capacity_base() -> u32 {
    100
}
const fn default_mana_capacity_spread() -> u32 {
    100
}
const fn default_mana_regen_min() -> f64 {
    0.5
}
const fn default_mana_regen_max() -> f64 {
    1.5
}
const fn default_faction_count() -> usize {
    5
}
const fn default_min_separation() -> f64 {
    3.0
}
const fn default_max_failed_attempts() -> u32 {
    200
}
const fn default_starting_strength() -> f64 {
    10.0
}
const fn default_starting_food() -> f64 {
    50.0
}
const fn default_starting_wood() -> f64 {
    50.0
}
const fn default_starting_ore() -> f64 {
    10.0
}
const fn default_starting_mana() -> f64 {
    20.0
}
fn default_palette() -> Vec<String> {
    [
        "#FF0000", "#0000FF", "#00FF00", "#FFFF00", "#FF00FF", "#00FFFF", "#FFA500", "#800080",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl WorldGenConfig {
    /// Check ranges and fractions before generating.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyGrid`] for a zero dimension and
    /// [`WorldError::InvalidSetting`] for an unusable range.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.width == 0 || self.height == 0 {
            return Err(WorldError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        check_fraction("resources.fraction", self.resources.fraction)?;
        check_fraction("mana.fraction", self.mana.fraction)?;
        check_rate_range(
            "resources.regen_min",
            self.resources.regen_min,
            self.resources.regen_max,
        )?;
        check_rate_range("mana.regen_min", self.mana.regen_min, self.mana.regen_max)?;
        if self.mana.capacity_base == 0 {
            return Err(WorldError::InvalidSetting {
                name: "mana.capacity_base",
                reason: String::from("capacity must be positive"),
            });
        }
        if self.factions.min_separation.is_nan() || self.factions.min_separation < 0.0 {
            return Err(WorldError::InvalidSetting {
                name: "factions.min_separation",
                reason: String::from("separation must be a non-negative number"),
            });
        }
        if self.factions.palette.is_empty() {
            return Err(WorldError::InvalidSetting {
                name: "factions.palette",
                reason: String::from("at least one color is required"),
            });
        }
        Ok(())
    }
}

fn check_fraction(name: &'static str, value: f64) -> Result<(), WorldError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(WorldError::InvalidSetting {
            name,
            reason: format!("fraction {value} is outside 0..=1"),
        })
    }
}

fn check_rate_range(name: &'static str, min: f64, max: f64) -> Result<(), WorldError> {
    if min > 0.0 && max >= min {
        Ok(())
    } else {
        Err(WorldError::InvalidSetting {
            name,
            reason: format!("regen range {min}..{max} must be positive and ordered"),
        })
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// A freshly generated map and the factions placed on it.
#[derive(Debug, Clone)]
pub struct StartingWorld {
    /// The populated grid.
    pub map: WorldMap,
    /// Spawned factions, each owning its starting tile.
    pub factions: BTreeMap<FactionId, Faction>,
}

/// Generate a starting world.
///
/// # Errors
///
/// Returns [`WorldError`] if the configuration is invalid. Placement
/// shortfalls are not errors.
pub fn create_starting_world(
    config: &WorldGenConfig,
    rng: &mut dyn RandomSource,
) -> Result<StartingWorld, WorldError> {
    config.validate()?;
    let mut map = WorldMap::new(config.width, config.height)?;

    let resource_nodes = scatter_resources(&mut map, &config.resources, rng);
    let mana_pools = scatter_mana(&mut map, &config.mana, rng);
    let factions = spawn_factions(&mut map, &config.factions, rng);

    if factions.len() < config.factions.count {
        warn!(
            requested = config.factions.count,
            placed = factions.len(),
            "Faction placement fell short, starting with fewer factions"
        );
    }
    info!(
        width = map.width(),
        height = map.height(),
        resource_nodes,
        mana_pools,
        factions = factions.len(),
        "Starting world generated"
    );

    Ok(StartingWorld { map, factions })
}

/// Number of scatter attempts for a fraction of the grid, rounded up.
fn scatter_attempts(map: &WorldMap, fraction: f64) -> usize {
    #[allow(clippy::cast_precision_loss)]
    let target = (map.tile_count() as f64 * fraction).ceil();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let attempts = target.max(0.0) as usize;
    attempts
}

/// Uniform integer in `0..spread` as a float.
fn spread_draw(rng: &mut dyn RandomSource, spread: u32) -> f64 {
    let drawn = rng.below(usize::try_from(spread).unwrap_or(0));
    f64::from(u32::try_from(drawn).unwrap_or(0))
}

/// Place resource nodes on random empty tiles. Returns how many were placed.
pub fn scatter_resources(
    map: &mut WorldMap,
    config: &ResourceScatterConfig,
    rng: &mut dyn RandomSource,
) -> usize {
    let mut placed: usize = 0;
    for _ in 0..scatter_attempts(map, config.fraction) {
        let coord = map.random_coord(rng);
        let Some(tile) = map.tile_mut(coord) else {
            continue;
        };
        if tile.feature.is_some() {
            continue;
        }
        let kind = ResourceKind::ALL
            .get(rng.below(ResourceKind::ALL.len()))
            .copied()
            .unwrap_or(ResourceKind::Food);
        let quantity = f64::from(config.quantity_base) + spread_draw(rng, config.quantity_spread);
        let regen_rate = rng.uniform(config.regen_min, config.regen_max);
        tile.feature = Some(TileFeature::Resource(ResourceNode {
            kind,
            quantity,
            regen_rate,
        }));
        placed = placed.saturating_add(1);
    }
    placed
}

/// Place mana pools on random empty tiles. Returns how many were placed.
pub fn scatter_mana(
    map: &mut WorldMap,
    config: &ManaScatterConfig,
    rng: &mut dyn RandomSource,
) -> usize {
    let mut placed: usize = 0;
    for _ in 0..scatter_attempts(map, config.fraction) {
        let coord = map.random_coord(rng);
        let Some(tile) = map.tile_mut(coord) else {
            continue;
        };
        if tile.feature.is_some() {
            continue;
        }
        let current = f64::from(config.current_base) + spread_draw(rng, config.current_spread);
        let capacity =
            f64::from(config.capacity_base) + spread_draw(rng, config.capacity_spread);
        let regen_rate = rng.uniform(config.regen_min, config.regen_max);
        tile.feature = Some(TileFeature::Mana(ManaPool {
            current: current.min(capacity),
            capacity,
            regen_rate,
        }));
        placed = placed.saturating_add(1);
    }
    placed
}

/// Place up to `config.count` factions with a minimum separation.
///
/// Every rejected sample (tile already owned, or too close to an earlier
/// start) counts against `max_failed_attempts`.
pub fn spawn_factions(
    map: &mut WorldMap,
    config: &FactionSpawnConfig,
    rng: &mut dyn RandomSource,
) -> BTreeMap<FactionId, Faction> {
    let mut factions = BTreeMap::new();
    let mut starts: Vec<TileCoord> = Vec::new();
    let mut failures: u32 = 0;

    while starts.len() < config.count && failures < config.max_failed_attempts {
        let coord = map.random_coord(rng);
        let too_close = starts
            .iter()
            .any(|s| s.distance(coord) < config.min_separation);
        let unowned = map.tile(coord).is_some_and(|t| t.owner.is_none());

        if !unowned || too_close {
            failures = failures.saturating_add(1);
            continue;
        }

        let faction = new_faction(starts.len(), coord, config);
        if map.set_owner(coord, Some(faction.id)).is_err() {
            failures = failures.saturating_add(1);
            continue;
        }
        starts.push(coord);
        factions.insert(faction.id, faction);
    }

    factions
}

/// Build the `index`-th faction (zero-based) owning `start`.
fn new_faction(index: usize, start: TileCoord, config: &FactionSpawnConfig) -> Faction {
    let palette_len = config.palette.len().max(1);
    let color = config
        .palette
        .get(index.checked_rem(palette_len).unwrap_or(0))
        .cloned()
        .unwrap_or_else(|| String::from("#FFFFFF"));

    let mut stockpile = BTreeMap::new();
    stockpile.insert(ResourceKind::Food, config.food);
    stockpile.insert(ResourceKind::Wood, config.wood);
    stockpile.insert(ResourceKind::Ore, config.ore);

    Faction {
        id: FactionId::new(),
        name: format!("Clan_{}", index.saturating_add(1)),
        color,
        owned_tiles: BTreeSet::from([start]),
        strength: config.strength,
        stockpile,
        mana: config.mana,
        relationships: BTreeMap::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::random::{SequenceRandom, StdRandom};

    fn small_config() -> WorldGenConfig {
        WorldGenConfig {
            width: 10,
            height: 10,
            ..WorldGenConfig::default()
        }
    }

    #[test]
    fn defaults_match_reference_constants() {
        let config = WorldGenConfig::default();
        assert_eq!((config.width, config.height), (20, 15));
        assert_eq!(config.factions.count, 5);
        assert_eq!(config.factions.max_failed_attempts, 200);
        assert_eq!(config.factions.palette.len(), 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "width: 8\nfactions:\n  count: 2\n";
        let config: WorldGenConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.width, 8);
        assert_eq!(config.height, 15);
        assert_eq!(config.factions.count, 2);
        assert_eq!(config.factions.palette.len(), 8);
    }

    #[test]
    fn validate_rejects_bad_ranges() {
        let mut config = WorldGenConfig::default();
        config.resources.fraction = 1.5;
        assert!(matches!(
            config.validate(),
            Err(WorldError::InvalidSetting { name: "resources.fraction", .. })
        ));

        let mut config = WorldGenConfig::default();
        config.mana.regen_max = 0.1;
        assert!(config.validate().is_err());

        let mut config = WorldGenConfig::default();
        config.factions.palette.clear();
        assert!(config.validate().is_err());

        let config = WorldGenConfig {
            height: 0,
            ..WorldGenConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(WorldError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn default_world_places_five_separated_factions() {
        let mut rng = StdRandom::seeded(11);
        let world = create_starting_world(&WorldGenConfig::default(), &mut rng).unwrap();
        assert_eq!(world.map.tile_count(), 300);
        // A 20x15 grid has ample room; the failure budget is never reached.
        assert_eq!(world.factions.len(), 5);

        let starts: Vec<TileCoord> = world
            .factions
            .values()
            .map(|f| *f.owned_tiles.iter().next().unwrap())
            .collect();
        for (i, a) in starts.iter().enumerate() {
            for b in starts.iter().skip(i + 1) {
                assert!(a.distance(*b) >= 3.0);
            }
        }
    }

    #[test]
    fn factions_own_exactly_their_start_tile() {
        let mut rng = StdRandom::seeded(3);
        let world = create_starting_world(&small_config(), &mut rng).unwrap();
        for faction in world.factions.values() {
            assert_eq!(faction.owned_tiles.len(), 1);
            assert_eq!(world.map.owned_by(faction.id), faction.owned_tiles);
            assert!((faction.strength - 10.0).abs() < f64::EPSILON);
            assert!((faction.stock(ResourceKind::Food) - 50.0).abs() < f64::EPSILON);
            assert!((faction.stock(ResourceKind::Ore) - 10.0).abs() < f64::EPSILON);
            assert!((faction.mana - 20.0).abs() < f64::EPSILON);
        }
        let owned = world.map.tiles().filter(|t| t.owner.is_some()).count();
        assert_eq!(owned, world.factions.len());
    }

    #[test]
    fn names_and_colors_follow_spawn_order() {
        let mut rng = StdRandom::seeded(5);
        let world = create_starting_world(&small_config(), &mut rng).unwrap();
        let mut names: Vec<&str> = world.factions.values().map(|f| f.name.as_str()).collect();
        names.sort_unstable();
        let expected: Vec<String> = (1..=world.factions.len())
            .map(|n| format!("Clan_{n}"))
            .collect();
        assert_eq!(names, expected);
        let red = world.factions.values().find(|f| f.name == "Clan_1").unwrap();
        assert_eq!(red.color, "#FF0000");
    }

    #[test]
    fn spawn_gives_up_after_failure_budget() {
        // A constant draw always lands on the same tile, so after the
        // first faction every sample is rejected.
        let mut map = WorldMap::new(5, 5).unwrap();
        let mut rng = SequenceRandom::constant(0.5);
        let config = FactionSpawnConfig {
            max_failed_attempts: 7,
            ..FactionSpawnConfig::default()
        };
        let factions = spawn_factions(&mut map, &config, &mut rng);
        assert_eq!(factions.len(), 1);
        // One accepted sample plus seven rejected ones, two draws each.
        assert_eq!(rng.draws(), 16);
    }

    #[test]
    fn scatter_never_overlaps_features() {
        let mut rng = StdRandom::seeded(9);
        let world = create_starting_world(&WorldGenConfig::default(), &mut rng).unwrap();
        let nodes = world.map.tiles().filter(|t| t.resource_node().is_some()).count();
        let pools = world.map.tiles().filter(|t| t.mana_pool().is_some()).count();
        assert!(nodes > 0 && nodes <= 45);
        assert!(pools > 0 && pools <= 30);
        for tile in world.map.tiles() {
            if let Some(node) = tile.resource_node() {
                assert!((100.0..250.0).contains(&node.quantity));
                assert!((0.1..0.5).contains(&node.regen_rate));
            }
            if let Some(pool) = tile.mana_pool() {
                assert!(pool.current <= pool.capacity);
                assert!((100.0..200.0).contains(&pool.capacity));
                assert!((0.5..1.5).contains(&pool.regen_rate));
            }
        }
    }

    #[test]
    fn scripted_scatter_places_expected_node() {
        let mut map = WorldMap::new(2, 2).unwrap();
        // One attempt: x=1, y=0, kind index 2 (Ore), spread 0, regen at min.
        let config = ResourceScatterConfig {
            fraction: 0.25,
            ..ResourceScatterConfig::default()
        };
        let mut rng = SequenceRandom::new(vec![0.9, 0.0, 0.9, 0.0, 0.0]);
        assert_eq!(scatter_resources(&mut map, &config, &mut rng), 1);
        let node = map.tile(TileCoord::new(1, 0)).unwrap().resource_node().unwrap();
        assert_eq!(node.kind, ResourceKind::Ore);
        assert!((node.quantity - 100.0).abs() < f64::EPSILON);
        assert!((node.regen_rate - 0.1).abs() < f64::EPSILON);
    }
}
