//! Regeneration and harvesting for resource nodes and mana pools.
//!
//! Resource nodes grow by their regen rate every tick with no ceiling.
//! Mana pools grow by their regen rate but never exceed capacity.
//! Harvesting takes at most the requested amount and never drives a store
//! below zero.

use eruxian_types::{ManaPool, ResourceNode, TileFeature};

/// Apply one tick of regeneration to a [`ResourceNode`].
///
/// Returns the units added.
pub fn regenerate_node(node: &mut ResourceNode) -> f64 {
    let added = node.regen_rate.max(0.0);
    node.quantity += added;
    added
}

/// Apply one tick of regeneration to a [`ManaPool`], clamped to capacity.
///
/// Returns the mana actually added (zero if the pool is full).
pub fn regenerate_pool(pool: &mut ManaPool) -> f64 {
    let before = pool.current;
    pool.current = (pool.current + pool.regen_rate.max(0.0)).min(pool.capacity);
    (pool.current - before).max(0.0)
}

/// Regenerate whichever store a tile holds. Returns the amount added.
pub fn regenerate(feature: &mut TileFeature) -> f64 {
    match feature {
        TileFeature::Resource(node) => regenerate_node(node),
        TileFeature::Mana(pool) => regenerate_pool(pool),
    }
}

/// Take up to `requested` units from a resource node.
///
/// Returns the units actually removed. An empty node yields zero.
pub fn harvest_node(node: &mut ResourceNode, requested: f64) -> f64 {
    if node.quantity <= 0.0 {
        return 0.0;
    }
    let taken = requested.max(0.0).min(node.quantity);
    node.quantity = (node.quantity - taken).max(0.0);
    taken
}

/// Take up to `requested` mana from a pool.
///
/// Returns the mana actually removed. An empty pool yields zero.
pub fn harvest_pool(pool: &mut ManaPool, requested: f64) -> f64 {
    if pool.current <= 0.0 {
        return 0.0;
    }
    let taken = requested.max(0.0).min(pool.current);
    pool.current = (pool.current - taken).max(0.0);
    taken
}
