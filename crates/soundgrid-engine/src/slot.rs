//! The polymorphic lattice cell occupant.

use smallvec::{smallvec, SmallVec};
use soundgrid_core::{GridError, Layer, PointSet, Raster};
use soundgrid_tile::SrTile;

use crate::dispatch::JobSpec;
use crate::grid::Grid;

/// What occupies one lattice cell: a leaf tile, or a nested fixed-extent
/// grid for variable-resolution composition.
///
/// Every recursive operation dispatches through this enum and recurses
/// exactly one level for [`Nested`](Self::Nested) before touching leaf
/// state.
pub(crate) enum TileSlot {
    /// A leaf tile owning raw points and cell rasters.
    Tile(SrTile),
    /// A nested grid pinned to this cell's extents.
    Nested(Box<Grid>),
}

impl TileSlot {
    /// Forward a container's points, replacing that container's previous
    /// points in this cell. Metadata rides along so nested grids stay
    /// consistent with their parent.
    pub fn add_points(
        &mut self,
        points: PointSet,
        container: &str,
        crs: Option<u32>,
        vertical_reference: Option<&str>,
    ) -> Result<(), GridError> {
        match self {
            Self::Tile(tile) => {
                tile.add_points(points, container);
                Ok(())
            }
            Self::Nested(grid) => {
                grid.add_points(points, container, None, crs, vertical_reference)
            }
        }
    }

    /// Forward a container removal.
    pub fn remove_points(&mut self, container: &str) {
        match self {
            Self::Tile(tile) => tile.remove_points(container),
            Self::Nested(grid) => grid.remove_points(container),
        }
    }

    /// Whether the occupant holds no points at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Tile(tile) => tile.is_empty(),
            Self::Nested(grid) => grid.is_empty(),
        }
    }

    /// Whether any gridded surface exists below this slot.
    pub fn has_grid(&self) -> bool {
        match self {
            Self::Tile(tile) => tile.has_grid(),
            Self::Nested(grid) => !grid.no_grid(),
        }
    }

    /// Grid the occupant. A leaf grids at the forced resolution or the
    /// owner's selection; a nested grid self-selects unless forced.
    /// Returns every resolution realized beneath this slot.
    pub fn grid(&mut self, spec: &JobSpec) -> Result<SmallVec<[f64; 4]>, GridError> {
        match self {
            Self::Tile(tile) => {
                let resolution = tile.grid(
                    spec.algorithm,
                    spec.forced.unwrap_or(spec.leaf_resolution),
                    spec.clear_existing,
                )?;
                Ok(smallvec![resolution])
            }
            Self::Nested(grid) => {
                grid.grid(spec.algorithm, spec.forced, spec.clear_existing, false)?;
                Ok(grid.resolutions().into_iter().collect())
            }
        }
    }

    /// This slot's sub-raster for `layer` at `resolution`, or `None` when
    /// that resolution was never realized here (the parent leaves the
    /// block as sentinel).
    pub fn layer_raster(&self, layer: Layer, resolution: f64) -> Result<Option<Raster>, GridError> {
        match self {
            Self::Tile(tile) => Ok(tile.get_layer(layer, resolution).cloned()),
            Self::Nested(grid) => {
                if grid.no_grid() || !grid.resolutions().contains(&resolution) {
                    return Ok(None);
                }
                grid.get_layer_by_name(layer, Some(resolution)).map(Some)
            }
        }
    }

    /// Layer names realized beneath this slot.
    pub fn layers(&self) -> Vec<Layer> {
        match self {
            Self::Tile(tile) => tile.layers(),
            Self::Nested(grid) => grid.return_layer_names(),
        }
    }
}
