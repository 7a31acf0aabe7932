//! Regeneration and gathering.
//!
//! Regeneration runs once over the whole map at the start of a tick.
//! Gathering runs per faction, just before that faction's decision, and
//! moves at most `gather_rate` units out of each owned tile's node and pool.

use eruxian_types::{Faction, ResourceKind, TileFeature};
use eruxian_world::{WorldMap, resource};

/// What one faction extracted during a gather pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Gathered {
    /// Food credited.
    pub food: f64,
    /// Wood credited.
    pub wood: f64,
    /// Ore credited.
    pub ore: f64,
    /// Mana credited.
    pub mana: f64,
}

impl Gathered {
    fn add(&mut self, kind: ResourceKind, amount: f64) {
        match kind {
            ResourceKind::Food => self.food += amount,
            ResourceKind::Wood => self.wood += amount,
            ResourceKind::Ore => self.ore += amount,
        }
    }

    /// Total material units (excluding mana).
    pub fn materials(&self) -> f64 {
        self.food + self.wood + self.ore
    }
}

/// Apply one tick of regeneration to every node and pool on the map.
///
/// Returns the number of features that regenerated.
pub fn regenerate_world(map: &mut WorldMap) -> usize {
    let mut count: usize = 0;
    for tile in map.tiles_mut() {
        if let Some(feature) = tile.feature.as_mut() {
            resource::regenerate(feature);
            count = count.saturating_add(1);
        }
    }
    count
}

/// Extract up to `rate` units from each tile the faction owns.
///
/// Tiles that have since changed hands or left the grid are skipped.
pub fn gather(faction: &mut Faction, map: &mut WorldMap, rate: f64) -> Gathered {
    let mut gathered = Gathered::default();
    let owned: Vec<_> = faction.owned_tiles.iter().copied().collect();
    for coord in owned {
        let Some(tile) = map.tile_mut(coord) else {
            continue;
        };
        if tile.owner != Some(faction.id) {
            continue;
        }
        match tile.feature.as_mut() {
            Some(TileFeature::Resource(node)) => {
                let taken = resource::harvest_node(node, rate);
                if taken > 0.0 {
                    faction.credit(node.kind, taken);
                    gathered.add(node.kind, taken);
                }
            }
            Some(TileFeature::Mana(pool)) => {
                let taken = resource::harvest_pool(pool, rate);
                if taken > 0.0 {
                    faction.mana += taken;
                    gathered.mana += taken;
                }
            }
            None => {}
        }
    }
    gathered
}
