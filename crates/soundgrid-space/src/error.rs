//! Error types for lattice construction and spatial queries.

use soundgrid_core::GridError;
use std::fmt;

/// Errors arising from lattice construction or cell addressing.
#[derive(Clone, Debug, PartialEq)]
pub enum SpaceError {
    /// Tile size is zero, negative, or non-finite.
    InvalidTileSize {
        /// The offending tile size.
        tile_size: f64,
    },
    /// Fixed extents are inverted or not whole multiples of the tile size.
    InvalidExtents {
        /// What was wrong with the extents.
        reason: String,
    },
    /// A cell index is outside the lattice.
    CellOutOfBounds {
        /// The offending linear cell index.
        index: usize,
        /// Number of cells in the lattice.
        cells: usize,
    },
    /// The lattice has not been initialized by a first add yet.
    Uninitialized,
    /// Binning inputs are malformed (too few edges or unequal coordinate
    /// column lengths).
    InvalidBinning {
        /// What was wrong with the binning inputs.
        reason: String,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileSize { tile_size } => {
                write!(f, "tile size must be finite and positive, got {tile_size}")
            }
            Self::InvalidExtents { reason } => write!(f, "invalid extents: {reason}"),
            Self::CellOutOfBounds { index, cells } => {
                write!(f, "cell index {index} out of bounds for {cells} cells")
            }
            Self::Uninitialized => write!(f, "lattice has no extents yet"),
            Self::InvalidBinning { reason } => write!(f, "invalid binning input: {reason}"),
        }
    }
}

impl std::error::Error for SpaceError {}

impl From<SpaceError> for GridError {
    fn from(err: SpaceError) -> Self {
        match err {
            SpaceError::InvalidBinning { reason } => GridError::InvalidInput { reason },
            SpaceError::Uninitialized => GridError::EmptyGrid {
                reason: "no points have been added".into(),
            },
            other => GridError::Shape {
                reason: other.to_string(),
            },
        }
    }
}
