//! Tile grid, resources, and world generation for the Eruxian simulation.
//!
//! This crate models the physical world: a fixed rectangular grid of tiles,
//! resource nodes and mana pools that regenerate each tick, and the random
//! placement of features and factions at startup.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid construction and world settings.
//! - [`random`] -- [`RandomSource`] trait with OS-seeded and scripted
//!   implementations.
//! - [`resource`] -- Regeneration and harvesting for nodes and pools.
//! - [`starting_world`] -- Resource/mana scatter and faction spawn.
//! - [`world_map`] -- The dense tile grid with neighbor queries.
//!
//! [`RandomSource`]: random::RandomSource

pub mod error;
pub mod random;
pub mod resource;
pub mod starting_world;
pub mod world_map;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use random::{RandomSource, SequenceRandom, StdRandom};
pub use starting_world::{StartingWorld, WorldGenConfig, create_starting_world};
pub use world_map::WorldMap;
