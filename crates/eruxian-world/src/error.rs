//! Error types for the `eruxian-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type.

use eruxian_types::TileCoord;

/// Errors that can occur while building or mutating the tile grid.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The grid would have no tiles.
    #[error("world grid must be non-empty, got {width}x{height}")]
    EmptyGrid {
        /// Requested columns.
        width: u32,
        /// Requested rows.
        height: u32,
    },

    /// The grid is too large to index.
    #[error("world grid {width}x{height} is too large")]
    GridTooLarge {
        /// Requested columns.
        width: u32,
        /// Requested rows.
        height: u32,
    },

    /// A coordinate lies outside the grid.
    #[error("tile {0} is outside the grid")]
    OutOfBounds(TileCoord),

    /// A configured range or fraction is unusable.
    #[error("invalid world setting `{name}`: {reason}")]
    InvalidSetting {
        /// Config key.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}
