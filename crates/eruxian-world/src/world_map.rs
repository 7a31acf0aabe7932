//! Dense tile grid with bounds-checked lookup and neighbor queries.
//!
//! The [`WorldMap`] is the spatial backbone of the simulation. Tiles are
//! stored row-major in a single vector and addressed by [`TileCoord`].
//! Tiles are created once and never added or removed afterwards; only
//! their owner and feature fields change.

use std::collections::BTreeSet;

use eruxian_types::{FactionId, Tile, TileCoord};

use crate::error::WorldError;
use crate::random::RandomSource;

/// The fixed-size grid of tiles.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorldMap {
    /// Columns.
    width: u32,
    /// Rows.
    height: u32,
    /// Row-major tiles, `width * height` entries.
    tiles: Vec<Tile>,
}

impl WorldMap {
    /// Build a grid of empty, unowned tiles.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyGrid`] if either dimension is zero, or
    /// [`WorldError::GridTooLarge`] if the tile count overflows.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::EmptyGrid { width, height });
        }
        let count = usize::try_from(width)
            .ok()
            .zip(usize::try_from(height).ok())
            .and_then(|(w, h)| w.checked_mul(h))
            .ok_or(WorldError::GridTooLarge { width, height })?;

        let mut tiles = Vec::with_capacity(count);
        for y in 0..height {
            for x in 0..width {
                tiles.push(Tile::empty(TileCoord::new(x, y)));
            }
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    // -------------------------------------------------------------------
    // Dimensions
    // -------------------------------------------------------------------

    /// Number of columns.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Whether a coordinate lies on the grid.
    pub const fn contains(&self, coord: TileCoord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    // -------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------

    fn index(&self, coord: TileCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let row = usize::try_from(coord.y).ok()?;
        let col = usize::try_from(coord.x).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(col)
    }

    /// Get a tile. Out-of-range coordinates yield `None`.
    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.index(coord).and_then(|i| self.tiles.get(i))
    }

    /// Get a tile mutably. Out-of-range coordinates yield `None`.
    pub fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        self.index(coord).and_then(|i| self.tiles.get_mut(i))
    }

    /// Iterate over all tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Iterate over all tiles mutably in row-major order.
    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    /// In-bounds orthogonal neighbors, in north, south, east, west order.
    pub fn neighbors(&self, coord: TileCoord) -> Vec<TileCoord> {
        let candidates = [
            coord.y.checked_sub(1).map(|y| TileCoord::new(coord.x, y)),
            coord.y.checked_add(1).map(|y| TileCoord::new(coord.x, y)),
            coord.x.checked_add(1).map(|x| TileCoord::new(x, coord.y)),
            coord.x.checked_sub(1).map(|x| TileCoord::new(x, coord.y)),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter(|c| self.contains(*c))
            .collect()
    }

    /// Pick a uniformly random coordinate on the grid.
    pub fn random_coord(&self, rng: &mut dyn RandomSource) -> TileCoord {
        let x = rng.below(usize::try_from(self.width).unwrap_or(0));
        let y = rng.below(usize::try_from(self.height).unwrap_or(0));
        TileCoord::new(
            u32::try_from(x).unwrap_or(0),
            u32::try_from(y).unwrap_or(0),
        )
    }

    // -------------------------------------------------------------------
    // Ownership
    // -------------------------------------------------------------------

    /// Owner of a tile, or `None` if unowned or out of range.
    pub fn owner(&self, coord: TileCoord) -> Option<FactionId> {
        self.tile(coord).and_then(|t| t.owner)
    }

    /// Set or clear a tile's owner.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if the coordinate is off the grid.
    pub fn set_owner(
        &mut self,
        coord: TileCoord,
        owner: Option<FactionId>,
    ) -> Result<(), WorldError> {
        let tile = self.tile_mut(coord).ok_or(WorldError::OutOfBounds(coord))?;
        tile.owner = owner;
        Ok(())
    }

    /// Clear every tile owned by `owner`. Returns how many were released.
    pub fn release_all(&mut self, owner: FactionId) -> usize {
        let mut released: usize = 0;
        for tile in &mut self.tiles {
            if tile.owner == Some(owner) {
                tile.owner = None;
                released = released.saturating_add(1);
            }
        }
        released
    }

    /// Every tile currently owned by `owner`.
    pub fn owned_by(&self, owner: FactionId) -> BTreeSet<TileCoord> {
        self.tiles
            .iter()
            .filter(|t| t.owner == Some(owner))
            .map(|t| t.coord)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::random::SequenceRandom;

    fn make_map() -> WorldMap {
        WorldMap::new(4, 3).unwrap()
    }

    #[test]
    fn new_builds_row_major_grid() {
        let map = make_map();
        assert_eq!(map.tile_count(), 12);
        assert_eq!(map.width(), 4);
        assert_eq!(map.height(), 3);
        let coords: Vec<TileCoord> = map.tiles().map(|t| t.coord).take(5).collect();
        assert_eq!(
            coords,
            vec![
                TileCoord::new(0, 0),
                TileCoord::new(1, 0),
                TileCoord::new(2, 0),
                TileCoord::new(3, 0),
                TileCoord::new(0, 1),
            ]
        );
        assert!(map.tiles().all(|t| t.owner.is_none() && t.feature.is_none()));
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert!(matches!(
            WorldMap::new(0, 5),
            Err(WorldError::EmptyGrid { width: 0, height: 5 })
        ));
    }

    #[test]
    fn out_of_range_lookup_is_absent() {
        let map = make_map();
        assert!(map.tile(TileCoord::new(4, 0)).is_none());
        assert!(map.tile(TileCoord::new(0, 3)).is_none());
        assert_eq!(
            map.tile(TileCoord::new(3, 2)).map(|t| t.coord),
            Some(TileCoord::new(3, 2))
        );
    }

    #[test]
    fn neighbors_are_north_south_east_west() {
        let map = make_map();
        assert_eq!(
            map.neighbors(TileCoord::new(1, 1)),
            vec![
                TileCoord::new(1, 0),
                TileCoord::new(1, 2),
                TileCoord::new(2, 1),
                TileCoord::new(0, 1),
            ]
        );
    }

    #[test]
    fn corner_neighbors_are_filtered() {
        let map = make_map();
        assert_eq!(
            map.neighbors(TileCoord::new(0, 0)),
            vec![TileCoord::new(0, 1), TileCoord::new(1, 0)]
        );
        assert_eq!(
            map.neighbors(TileCoord::new(3, 2)),
            vec![TileCoord::new(3, 1), TileCoord::new(2, 2)]
        );
    }

    #[test]
    fn ownership_set_release_and_query() {
        let mut map = make_map();
        let a = FactionId::new();
        let b = FactionId::new();
        assert!(map.set_owner(TileCoord::new(0, 0), Some(a)).is_ok());
        assert!(map.set_owner(TileCoord::new(1, 0), Some(a)).is_ok());
        assert!(map.set_owner(TileCoord::new(2, 0), Some(b)).is_ok());
        assert!(matches!(
            map.set_owner(TileCoord::new(9, 9), Some(a)),
            Err(WorldError::OutOfBounds(_))
        ));

        assert_eq!(map.owned_by(a).len(), 2);
        assert_eq!(map.owner(TileCoord::new(2, 0)), Some(b));
        assert_eq!(map.release_all(a), 2);
        assert!(map.owned_by(a).is_empty());
        assert_eq!(map.owner(TileCoord::new(2, 0)), Some(b));
    }

    #[test]
    fn random_coord_stays_on_grid() {
        let map = make_map();
        let mut rng = SequenceRandom::new(vec![0.0, 0.999, 0.5, 0.5]);
        assert_eq!(map.random_coord(&mut rng), TileCoord::new(0, 2));
        assert_eq!(map.random_coord(&mut rng), TileCoord::new(2, 1));
    }
}
