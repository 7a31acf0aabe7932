//! Core entity structs and read-only projections.
//!
//! [`Tile`], [`Faction`] and [`LogEntry`] are the live records the engine
//! mutates. The remaining types are copies handed to observers: a compact
//! map overview, faction summaries, and full tile detail in the wire shape
//! the dashboard expects.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{EventType, Relationship, ResourceKind};
use crate::ids::{FactionId, TileCoord};

// ---------------------------------------------------------------------------
// Tile contents
// ---------------------------------------------------------------------------

/// A regenerating store of one material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceNode {
    /// Which material the node yields.
    pub kind: ResourceKind,
    /// Units currently available. Never negative.
    pub quantity: f64,
    /// Units added per tick. Unbounded growth.
    pub regen_rate: f64,
}

/// A regenerating, capped store of mana.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ManaPool {
    /// Mana currently held, `0..=capacity`.
    pub current: f64,
    /// Upper bound on `current`.
    pub capacity: f64,
    /// Mana added per tick before clamping.
    pub regen_rate: f64,
}

/// What a tile holds besides its owner. A tile holds at most one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TileFeature {
    /// A resource node.
    Resource(ResourceNode),
    /// A mana pool.
    Mana(ManaPool),
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Tile {
    /// Grid position.
    pub coord: TileCoord,
    /// Owning faction, if claimed.
    pub owner: Option<FactionId>,
    /// Resource node or mana pool, if any.
    pub feature: Option<TileFeature>,
}

impl Tile {
    /// An unowned tile with no feature.
    pub const fn empty(coord: TileCoord) -> Self {
        Self {
            coord,
            owner: None,
            feature: None,
        }
    }

    /// The tile's resource node, if it has one.
    pub const fn resource_node(&self) -> Option<&ResourceNode> {
        match &self.feature {
            Some(TileFeature::Resource(node)) => Some(node),
            _ => None,
        }
    }

    /// The tile's mana pool, if it has one.
    pub const fn mana_pool(&self) -> Option<&ManaPool> {
        match &self.feature {
            Some(TileFeature::Mana(pool)) => Some(pool),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Faction
// ---------------------------------------------------------------------------

/// A competing territorial entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Faction {
    /// Identity.
    pub id: FactionId,
    /// Display name, `Clan_<n>`.
    pub name: String,
    /// Display color as `#RRGGBB`.
    pub color: String,
    /// Tiles this faction owns. Mirrors the tiles' owner fields.
    pub owned_tiles: BTreeSet<TileCoord>,
    /// Combat and capability score.
    pub strength: f64,
    /// Material stockpile per kind. Never negative.
    pub stockpile: BTreeMap<ResourceKind, f64>,
    /// Mana held. Never negative.
    pub mana: f64,
    /// Standing towards other factions.
    pub relationships: BTreeMap<FactionId, Relationship>,
}

impl Faction {
    /// Sum of every stockpiled material.
    pub fn total_stockpile(&self) -> f64 {
        self.stockpile.values().sum()
    }

    /// Amount of one material in the stockpile.
    pub fn stock(&self, kind: ResourceKind) -> f64 {
        self.stockpile.get(&kind).copied().unwrap_or(0.0)
    }

    /// Add to the stockpile.
    pub fn credit(&mut self, kind: ResourceKind, amount: f64) {
        *self.stockpile.entry(kind).or_insert(0.0) += amount;
    }

    /// Remove from the stockpile, flooring at zero.
    pub fn debit(&mut self, kind: ResourceKind, amount: f64) {
        let entry = self.stockpile.entry(kind).or_insert(0.0);
        *entry = (*entry - amount).max(0.0);
    }

    /// Remove mana, flooring at zero.
    pub fn spend_mana(&mut self, amount: f64) {
        self.mana = (self.mana - amount).max(0.0);
    }

    /// Summary projection for list views.
    pub fn summary(&self) -> FactionSummary {
        FactionSummary {
            id: self.id,
            name: self.name.clone(),
            color: self.color.clone(),
            strength: self.strength,
            tile_count: self.owned_tiles.len(),
            stockpile: self.stockpile.clone(),
            mana: self.mana,
        }
    }
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

/// One notable occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogEntry {
    /// Wall-clock time the entry was appended.
    pub timestamp: DateTime<Utc>,
    /// Type tag.
    pub event_type: EventType,
    /// Human-readable description.
    pub description: String,
    /// Referenced faction and tile ids, as strings.
    pub entities: Vec<String>,
}

// ---------------------------------------------------------------------------
// Observer projections
// ---------------------------------------------------------------------------

/// Compact per-tile view used in the map overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TileOverview {
    /// `tile_<x>_<y>`.
    pub id: String,
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Owning faction, if any.
    pub owner: Option<FactionId>,
}

/// Full per-tile view including resource and mana state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TileDetail {
    /// `tile_<x>_<y>`.
    pub id: String,
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Owning faction, if any.
    pub owner: Option<FactionId>,
    /// Resource node, if any.
    pub resource_node: Option<ResourceNode>,
    /// Mana pool, if any.
    pub mana_pool: Option<ManaPool>,
}

impl From<&Tile> for TileOverview {
    fn from(tile: &Tile) -> Self {
        Self {
            id: tile.coord.to_string(),
            x: tile.coord.x,
            y: tile.coord.y,
            owner: tile.owner,
        }
    }
}

impl From<&Tile> for TileDetail {
    fn from(tile: &Tile) -> Self {
        Self {
            id: tile.coord.to_string(),
            x: tile.coord.x,
            y: tile.coord.y,
            owner: tile.owner,
            resource_node: tile.resource_node().cloned(),
            mana_pool: tile.mana_pool().cloned(),
        }
    }
}

/// Map dimensions plus ownership per tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MapOverview {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Row-major tile views.
    pub tiles: Vec<TileOverview>,
}

/// Faction fields shown in list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FactionSummary {
    /// Identity.
    pub id: FactionId,
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: String,
    /// Combat score.
    pub strength: f64,
    /// Number of owned tiles.
    pub tile_count: usize,
    /// Stockpile per kind.
    pub stockpile: BTreeMap<ResourceKind, f64>,
    /// Mana held.
    pub mana: f64,
}

/// Consistent read-only view of the whole simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimulationSnapshot {
    /// Ticks completed since the last reset.
    pub tick: u64,
    /// Ownership overview.
    pub map: MapOverview,
    /// Live factions.
    pub factions: Vec<FactionSummary>,
    /// Most recent events, oldest first.
    pub events: Vec<LogEntry>,
    /// Whether periodic ticking is active.
    pub running: bool,
}
