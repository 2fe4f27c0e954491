//! Grid configuration, validation, and error types.

use std::error::Error;
use std::fmt;

// ── SlotKind ───────────────────────────────────────────────────────

/// What occupies a lattice cell when points first land in it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SlotKind {
    /// Leaf tiles: every cell grids at the one resolution the owning grid
    /// selects (or is given).
    SingleResolution,
    /// Nested fixed-extent grids of `subtile_size` cells: each region
    /// selects its own resolution from its local depth statistics.
    VariableResolution {
        /// Cell size of the nested sub-lattice, in coordinate units. Must
        /// evenly divide the outer tile size.
        subtile_size: f64,
    },
}

// ── GridConfig ─────────────────────────────────────────────────────

/// Configuration for a top-level [`Grid`](crate::Grid).
///
/// Use [`single_resolution`](Self::single_resolution) or
/// [`variable_resolution`](Self::variable_resolution) and adjust fields as
/// needed before passing to [`Grid::new`](crate::Grid::new).
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    /// Edge length of one lattice cell in coordinate units.
    pub tile_size: f64,
    /// What to build when a cell first receives points.
    pub slot_kind: SlotKind,
    /// Number of gridding worker threads for parallel dispatch. `None` =
    /// auto-detect from available parallelism.
    pub worker_count: Option<usize>,
}

impl GridConfig {
    /// A growable single-resolution grid of leaf tiles.
    pub fn single_resolution(tile_size: f64) -> Self {
        Self {
            tile_size,
            slot_kind: SlotKind::SingleResolution,
            worker_count: None,
        }
    }

    /// A growable variable-resolution grid whose cells are nested grids of
    /// `subtile_size` sub-cells.
    pub fn variable_resolution(tile_size: f64, subtile_size: f64) -> Self {
        Self {
            tile_size,
            slot_kind: SlotKind::VariableResolution { subtile_size },
            worker_count: None,
        }
    }

    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a non-finite or non-positive tile
    /// size, or a subtile size that does not evenly divide the tile size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tile_size.is_finite() || self.tile_size <= 0.0 {
            return Err(ConfigError::InvalidTileSize {
                tile_size: self.tile_size,
            });
        }
        if let SlotKind::VariableResolution { subtile_size } = self.slot_kind {
            if !subtile_size.is_finite() || subtile_size <= 0.0 {
                return Err(ConfigError::InvalidTileSize {
                    tile_size: subtile_size,
                });
            }
            let cells = self.tile_size / subtile_size;
            if (cells - cells.round()).abs() > 1e-9 || cells.round() < 1.0 {
                return Err(ConfigError::SubtileDoesNotDivide {
                    tile_size: self.tile_size,
                    subtile_size,
                });
            }
        }
        Ok(())
    }

    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, 64),
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`GridConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Tile or subtile size is zero, negative, or non-finite.
    InvalidTileSize {
        /// The offending size.
        tile_size: f64,
    },
    /// The subtile size does not evenly divide the tile size.
    SubtileDoesNotDivide {
        /// The outer tile size.
        tile_size: f64,
        /// The nested cell size that failed to divide it.
        subtile_size: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileSize { tile_size } => {
                write!(f, "tile size must be finite and positive, got {tile_size}")
            }
            Self::SubtileDoesNotDivide {
                tile_size,
                subtile_size,
            } => write!(
                f,
                "subtile size {subtile_size} does not evenly divide tile size {tile_size}"
            ),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_resolution_defaults_validate() {
        assert_eq!(GridConfig::single_resolution(1024.0).validate(), Ok(()));
    }

    #[test]
    fn non_positive_tile_size_rejected() {
        let err = GridConfig::single_resolution(0.0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTileSize { .. }));
    }

    #[test]
    fn subtile_must_divide_tile() {
        let err = GridConfig::variable_resolution(1024.0, 100.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::SubtileDoesNotDivide { .. }));
        assert_eq!(
            GridConfig::variable_resolution(1024.0, 128.0).validate(),
            Ok(())
        );
    }

    #[test]
    fn explicit_worker_count_is_clamped() {
        let mut config = GridConfig::single_resolution(1024.0);
        config.worker_count = Some(0);
        assert_eq!(config.resolved_worker_count(), 1);
        config.worker_count = Some(1000);
        assert_eq!(config.resolved_worker_count(), 64);
    }
}
