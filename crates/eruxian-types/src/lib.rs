//! Shared type definitions for the Eruxian simulation.
//!
//! This crate is the single source of truth for all types used across the
//! Eruxian workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Faction identifiers and tile coordinates
//! - [`enums`] -- Resource kinds, relationships, event tags, control actions
//! - [`structs`] -- Tiles, factions, log entries and observer projections

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ControlAction, ControlStatus, EventType, Relationship, ResourceKind};
pub use ids::{FactionId, TileCoord};
pub use structs::{
    Faction, FactionSummary, LogEntry, ManaPool, MapOverview, ResourceNode, SimulationSnapshot,
    Tile, TileDetail, TileFeature, TileOverview,
};
