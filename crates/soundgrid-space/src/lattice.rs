//! The tile-aligned lattice: extents, cell addressing, and growth remapping.

use crate::error::SpaceError;

/// Tile-aligned active extents and the derived lattice shape.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Shape {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    rows: usize,
    cols: usize,
}

/// Outcome of [`TileLattice::ensure_covers`].
#[derive(Clone, Debug, PartialEq)]
pub enum LatticeUpdate {
    /// First add: the lattice was allocated with this many cells.
    Initialized {
        /// Total cell count of the fresh lattice.
        cells: usize,
    },
    /// The existing lattice already covers the data.
    Unchanged,
    /// The lattice grew. `remap[old_index]` is the cell's new linear index;
    /// the owner must move each occupant into its remapped position in a
    /// fresh arena of `cells` slots.
    Grown {
        /// Old-linear-index to new-linear-index table, row-major.
        remap: Vec<usize>,
        /// Total cell count of the enlarged lattice.
        cells: usize,
    },
}

/// Lattice geometry for one grid: tile size, extents, and cell addressing.
///
/// The lattice starts without extents. The first [`ensure_covers`] call
/// establishes them (from the data bounds for a growable lattice, from
/// the preset bounds for a fixed one) and later calls enlarge a growable
/// lattice to the union bounding box, snapped outward to tile boundaries.
/// Extents never shrink, and growth never changes which physical cell an
/// index-remapped occupant addresses.
///
/// [`ensure_covers`]: TileLattice::ensure_covers
#[derive(Clone, Debug, PartialEq)]
pub struct TileLattice {
    tile_size: f64,
    can_grow: bool,
    preset: Option<(f64, f64, f64, f64)>,
    active: Option<Shape>,
}

impl TileLattice {
    /// A growable lattice that self-sizes from the first data it sees.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::InvalidTileSize`] for a non-finite or
    /// non-positive tile size.
    pub fn growable(tile_size: f64) -> Result<Self, SpaceError> {
        check_tile_size(tile_size)?;
        Ok(Self {
            tile_size,
            can_grow: true,
            preset: None,
            active: None,
        })
    }

    /// A fixed-extent lattice pinned to the given bounds (a nested cell).
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::InvalidTileSize`] for a bad tile size, or
    /// [`SpaceError::InvalidExtents`] if the bounds are inverted or not
    /// whole multiples of the tile size.
    pub fn fixed(
        tile_size: f64,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    ) -> Result<Self, SpaceError> {
        check_tile_size(tile_size)?;
        if max_x <= min_x || max_y <= min_y {
            return Err(SpaceError::InvalidExtents {
                reason: format!("({min_x}, {min_y}) .. ({max_x}, {max_y}) is inverted or empty"),
            });
        }
        for span in [max_x - min_x, max_y - min_y] {
            let cells = span / tile_size;
            if (cells - cells.round()).abs() > 1e-9 {
                return Err(SpaceError::InvalidExtents {
                    reason: format!("span {span} is not a whole multiple of tile size {tile_size}"),
                });
            }
        }
        Ok(Self {
            tile_size,
            can_grow: false,
            preset: Some((min_x, min_y, max_x, max_y)),
            active: None,
        })
    }

    /// Edge length of one lattice cell in coordinate units.
    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    /// Whether the lattice self-sizes to enclose new data.
    pub fn can_grow(&self) -> bool {
        self.can_grow
    }

    /// Whether the lattice has no extents yet (nothing ever added).
    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }

    /// Current extents `(min_x, min_y, max_x, max_y)`.
    ///
    /// A fixed lattice reports its preset bounds even before the first add;
    /// an uninitialized growable lattice reports `None`.
    pub fn extents(&self) -> Option<(f64, f64, f64, f64)> {
        self.active
            .map(|s| (s.min_x, s.min_y, s.max_x, s.max_y))
            .or(self.preset)
    }

    /// Number of cell rows (0 while uninitialized).
    pub fn rows(&self) -> usize {
        self.active.map_or(0, |s| s.rows)
    }

    /// Number of cell columns (0 while uninitialized).
    pub fn cols(&self) -> usize {
        self.active.map_or(0, |s| s.cols)
    }

    /// Total cell count (0 while uninitialized).
    pub fn len(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Convert a linear cell index to `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::CellOutOfBounds`] past the end of the lattice,
    /// or [`SpaceError::Uninitialized`] before the first add.
    pub fn index_to_row_col(&self, index: usize) -> Result<(usize, usize), SpaceError> {
        let shape = self.active.ok_or(SpaceError::Uninitialized)?;
        if index >= shape.rows * shape.cols {
            return Err(SpaceError::CellOutOfBounds {
                index,
                cells: shape.rows * shape.cols,
            });
        }
        Ok((index / shape.cols, index % shape.cols))
    }

    /// Origin (minimum-x, minimum-y corner) of a cell by linear index.
    ///
    /// # Errors
    ///
    /// Same conditions as [`index_to_row_col`](Self::index_to_row_col).
    pub fn tile_origin(&self, index: usize) -> Result<(f64, f64), SpaceError> {
        let (row, col) = self.index_to_row_col(index)?;
        let shape = self.active.ok_or(SpaceError::Uninitialized)?;
        Ok((
            shape.min_x + col as f64 * self.tile_size,
            shape.min_y + row as f64 * self.tile_size,
        ))
    }

    /// Cell edge coordinates along x, `cols + 1` entries (empty while
    /// uninitialized).
    pub fn tile_edges_x(&self) -> Vec<f64> {
        self.active.map_or_else(Vec::new, |s| {
            (0..=s.cols)
                .map(|c| s.min_x + c as f64 * self.tile_size)
                .collect()
        })
    }

    /// Cell edge coordinates along y, `rows + 1` entries (empty while
    /// uninitialized).
    pub fn tile_edges_y(&self) -> Vec<f64> {
        self.active.map_or_else(Vec::new, |s| {
            (0..=s.rows)
                .map(|r| s.min_y + r as f64 * self.tile_size)
                .collect()
        })
    }

    /// Grow or initialize the lattice so it covers the given data bounds.
    ///
    /// A growable lattice snaps the union of its extents and the data
    /// bounds outward to tile boundaries; a fixed lattice initializes from
    /// its preset bounds on first use and never changes afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::InvalidExtents`] for non-finite data bounds.
    pub fn ensure_covers(
        &mut self,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    ) -> Result<LatticeUpdate, SpaceError> {
        if ![min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite()) {
            return Err(SpaceError::InvalidExtents {
                reason: "data bounds must be finite".into(),
            });
        }

        match self.active {
            None => {
                let shape = if let Some((px0, py0, px1, py1)) = self.preset {
                    self.shape_from(px0, py0, px1, py1)
                } else {
                    self.aligned_shape(min_x, min_y, max_x, max_y)
                };
                let cells = shape.rows * shape.cols;
                self.active = Some(shape);
                Ok(LatticeUpdate::Initialized { cells })
            }
            Some(old) if self.can_grow => {
                let grown = self.aligned_shape(
                    old.min_x.min(min_x),
                    old.min_y.min(min_y),
                    old.max_x.max(max_x),
                    old.max_y.max(max_y),
                );
                if grown == old {
                    return Ok(LatticeUpdate::Unchanged);
                }
                let row_off = whole_cells(old.min_y - grown.min_y, self.tile_size);
                let col_off = whole_cells(old.min_x - grown.min_x, self.tile_size);
                let mut remap = Vec::with_capacity(old.rows * old.cols);
                for r in 0..old.rows {
                    for c in 0..old.cols {
                        remap.push((r + row_off) * grown.cols + (c + col_off));
                    }
                }
                let cells = grown.rows * grown.cols;
                self.active = Some(grown);
                Ok(LatticeUpdate::Grown { remap, cells })
            }
            // Fixed lattices leave existing cells where they are; points
            // outside the preset bounds clamp into edge cells at binning.
            Some(_) => Ok(LatticeUpdate::Unchanged),
        }
    }

    /// Release the lattice back to the uninitialized state (all points
    /// removed). A fixed lattice keeps its preset bounds for the next add.
    pub fn release(&mut self) {
        self.active = None;
    }

    fn aligned_shape(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Shape {
        let ts = self.tile_size;
        let a_min_x = (min_x / ts).floor() * ts;
        let a_min_y = (min_y / ts).floor() * ts;
        let mut a_max_x = (max_x / ts).ceil() * ts;
        let mut a_max_y = (max_y / ts).ceil() * ts;
        // A point sitting exactly on the aligned minimum still needs a cell.
        if a_max_x <= a_min_x {
            a_max_x = a_min_x + ts;
        }
        if a_max_y <= a_min_y {
            a_max_y = a_min_y + ts;
        }
        self.shape_from(a_min_x, a_min_y, a_max_x, a_max_y)
    }

    fn shape_from(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Shape {
        Shape {
            min_x,
            min_y,
            max_x,
            max_y,
            rows: whole_cells(max_y - min_y, self.tile_size),
            cols: whole_cells(max_x - min_x, self.tile_size),
        }
    }
}

fn check_tile_size(tile_size: f64) -> Result<(), SpaceError> {
    if !tile_size.is_finite() || tile_size <= 0.0 {
        return Err(SpaceError::InvalidTileSize { tile_size });
    }
    Ok(())
}

fn whole_cells(span: f64, tile_size: f64) -> usize {
    (span / tile_size).round() as usize
}
