//! Layer assembly: full-extent reconstruction, trimming, and surface
//! coordinate vectors.

use soundgrid_core::{GridError, Layer, Raster};

use crate::grid::Grid;

/// A trimmed surface with its coordinate vectors and validity mask.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceXyz {
    /// 1D x locations, one per trimmed column (one extra for boundaries).
    pub x: Vec<f64>,
    /// 1D y locations, one per trimmed row (one extra for boundaries).
    pub y: Vec<f64>,
    /// The trimmed layer raster.
    pub surface: Raster,
    /// Row-major validity mask over the trimmed raster, 1 = has data.
    pub valid: Vec<u8>,
    /// Inclusive `[row, col]` start of the trim window in the full raster.
    pub mins: [usize; 2],
    /// Exclusive `[row, col]` end of the trim window in the full raster.
    pub maxs: [usize; 2],
    /// Resolution of the surface, in coordinate units per cell.
    pub resolution: f64,
}

/// External plotting capability the grid delegates to.
///
/// Rendering is out of scope for the core; callers hand in whatever plotting
/// backend they use and receive the trimmed surface with cell-center
/// coordinates.
pub trait SurfacePlotter {
    /// Render one surface.
    fn render(&mut self, layer: Layer, resolution: f64, surface: &SurfaceXyz);
}

impl Grid {
    /// Resolve an optional resolution against the realized set.
    fn resolve_resolution(&self, resolution: Option<f64>) -> Result<f64, GridError> {
        if self.no_grid() {
            return Err(GridError::EmptyGrid {
                reason: "gridding has not been run yet".into(),
            });
        }
        let available = self.resolutions();
        match (resolution, available.len()) {
            (Some(chosen), _) => Ok(chosen),
            (None, 1) => Ok(available[0]),
            (None, 0) => Err(GridError::EmptyGrid {
                reason: "no resolutions have been realized".into(),
            }),
            (None, _) => Err(GridError::AmbiguousResolution { available }),
        }
    }

    /// Reconstruct the full-extent raster for `layer`.
    ///
    /// Allocates a sentinel-filled raster spanning the grid extents at the
    /// chosen resolution and copies every occupied slot's sub-raster into
    /// its row/column block, recursing one level for nested grids. Slots
    /// that never realized the resolution leave their block as sentinel.
    ///
    /// # Errors
    ///
    /// [`GridError::EmptyGrid`] before any gridding,
    /// [`GridError::AmbiguousResolution`] when the resolution is omitted
    /// with several realized, [`GridError::Shape`] when the extents or tile
    /// size are not whole multiples of the resolution.
    pub fn get_layer_by_name(
        &self,
        layer: Layer,
        resolution: Option<f64>,
    ) -> Result<Raster, GridError> {
        let resolution = self.resolve_resolution(resolution)?;
        let (min_x, min_y, max_x, max_y) = self.extents_or_empty()?;
        let rows = exact_cells(max_y - min_y, resolution, "grid height")?;
        let cols = exact_cells(max_x - min_x, resolution, "grid width")?;
        let tile_cells = exact_cells(self.tile_size(), resolution, "tile size")?;

        let mut full = Raster::filled(rows, cols);
        for (index, slot) in self.slots().iter().enumerate() {
            let Some(slot) = slot else { continue };
            let (row, col) = self.lattice().index_to_row_col(index)?;
            if let Some(block) = slot.layer_raster(layer, resolution)? {
                full.copy_block(&block, row * tile_cells, col * tile_cells)?;
            }
        }
        Ok(full)
    }

    /// The full-extent raster cropped to the tight bounding box of data
    /// cells, plus the inclusive start and exclusive end offsets of the
    /// crop window as `[row, col]` pairs.
    ///
    /// # Errors
    ///
    /// As [`get_layer_by_name`](Self::get_layer_by_name), plus
    /// [`GridError::EmptyGrid`] when the layer holds no data at the chosen
    /// resolution.
    pub fn get_layer_trimmed(
        &self,
        layer: Layer,
        resolution: Option<f64>,
    ) -> Result<(Raster, [usize; 2], [usize; 2]), GridError> {
        let full = self.get_layer_by_name(layer, resolution)?;
        full.trim().ok_or_else(|| GridError::EmptyGrid {
            reason: "layer holds no data at this resolution".into(),
        })
    }

    /// The trimmed surface plus 1D coordinate vectors and validity mask.
    ///
    /// With `cell_boundaries` the vectors hold cell edge coordinates and
    /// run one longer than the raster; otherwise they hold cell centers.
    ///
    /// # Errors
    ///
    /// As [`get_layer_trimmed`](Self::get_layer_trimmed).
    pub fn return_surf_xyz(
        &self,
        layer: Layer,
        resolution: Option<f64>,
        cell_boundaries: bool,
    ) -> Result<SurfaceXyz, GridError> {
        let resolution = self.resolve_resolution(resolution)?;
        let (surface, mins, maxs) = self.get_layer_trimmed(layer, Some(resolution))?;
        let (min_x, min_y, _, _) = self.extents_or_empty()?;
        let [row_min, col_min] = mins;
        let [row_max, col_max] = maxs;

        let (x, y) = if cell_boundaries {
            (
                (col_min..=col_max)
                    .map(|c| min_x + c as f64 * resolution)
                    .collect(),
                (row_min..=row_max)
                    .map(|r| min_y + r as f64 * resolution)
                    .collect(),
            )
        } else {
            (
                (col_min..col_max)
                    .map(|c| min_x + (c as f64 + 0.5) * resolution)
                    .collect(),
                (row_min..row_max)
                    .map(|r| min_y + (r as f64 + 0.5) * resolution)
                    .collect(),
            )
        };

        let valid = surface.valid_mask();
        Ok(SurfaceXyz {
            x,
            y,
            surface,
            valid,
            mins,
            maxs,
            resolution,
        })
    }

    /// Layer names realized by the grid, from the first occupied slot with
    /// a surface (empty before gridding).
    pub fn return_layer_names(&self) -> Vec<Layer> {
        self.slots()
            .iter()
            .flatten()
            .find(|slot| slot.has_grid())
            .map(|slot| slot.layers())
            .unwrap_or_default()
    }

    /// Render a layer through an external plotting capability.
    ///
    /// # Errors
    ///
    /// As [`return_surf_xyz`](Self::return_surf_xyz).
    pub fn plot(
        &self,
        plotter: &mut dyn SurfacePlotter,
        layer: Layer,
        resolution: Option<f64>,
    ) -> Result<(), GridError> {
        let resolution = self.resolve_resolution(resolution)?;
        let surface = self.return_surf_xyz(layer, Some(resolution), false)?;
        plotter.render(layer, resolution, &surface);
        Ok(())
    }

    fn extents_or_empty(&self) -> Result<(f64, f64, f64, f64), GridError> {
        self.lattice().extents().ok_or_else(|| GridError::EmptyGrid {
            reason: "no points have been added".into(),
        })
    }
}

fn exact_cells(span: f64, resolution: f64, what: &str) -> Result<usize, GridError> {
    if !resolution.is_finite() || resolution <= 0.0 {
        return Err(GridError::Shape {
            reason: format!("resolution must be finite and positive, got {resolution}"),
        });
    }
    let cells = span / resolution;
    if (cells - cells.round()).abs() > 1e-9 || cells.round() < 1.0 {
        return Err(GridError::Shape {
            reason: format!("{what} {span} is not a whole multiple of resolution {resolution}"),
        });
    }
    Ok(cells.round() as usize)
}
