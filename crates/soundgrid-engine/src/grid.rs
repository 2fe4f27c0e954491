//! The grid manager: slot arena, container lifecycle, and gridding entry.

use indexmap::IndexMap;
use smallvec::SmallVec;
use soundgrid_core::{resolution_for_depth, Algorithm, GridError, PointSet};
use soundgrid_space::{bin2d, LatticeUpdate, TileLattice};
use soundgrid_tile::SrTile;

use crate::config::{ConfigError, GridConfig, SlotKind};
use crate::dispatch::{grid_parallel, grid_serial, BatchProgress, DispatchMetrics, JobSpec, ProgressFn};
use crate::pool::WorkerPool;
use crate::slot::TileSlot;

/// An adaptive lattice of tile slots producing gridded depth surfaces.
///
/// A `Grid` starts without extents. The first [`add_points`](Self::add_points)
/// establishes them (from the data bounds for a growable top grid, from
/// preset bounds for a nested cell) and allocates the row-major slot arena;
/// later adds may enlarge a growable grid, remapping existing occupants to
/// their shifted indices without ever reordering or duplicating them.
/// Containers are named, independently replaceable point batches: re-adding
/// a name replaces its points everywhere, and removing the last container
/// releases the arena entirely.
pub struct Grid {
    config: GridConfig,
    lattice: TileLattice,
    slots: Vec<Option<TileSlot>>,
    containers: IndexMap<String, Vec<String>>,
    crs: Option<u32>,
    vertical_reference: Option<String>,
    mean_depth: Option<f64>,
    resolutions: SmallVec<[f64; 4]>,
    pool: Option<WorkerPool>,
    progress: Option<ProgressFn>,
    last_dispatch: Option<DispatchMetrics>,
}

impl Grid {
    /// Create an empty growable grid from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration fails
    /// [`GridConfig::validate`].
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let lattice =
            TileLattice::growable(config.tile_size).map_err(|_| ConfigError::InvalidTileSize {
                tile_size: config.tile_size,
            })?;
        Ok(Self::from_parts(config, lattice))
    }

    /// A nested fixed-extent grid pinned to one parent cell.
    pub(crate) fn nested(
        subtile_size: f64,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    ) -> Result<Self, GridError> {
        let lattice = TileLattice::fixed(subtile_size, min_x, min_y, max_x, max_y)?;
        Ok(Self::from_parts(
            GridConfig::single_resolution(subtile_size),
            lattice,
        ))
    }

    fn from_parts(config: GridConfig, lattice: TileLattice) -> Self {
        Self {
            config,
            lattice,
            slots: Vec::new(),
            containers: IndexMap::new(),
            crs: None,
            vertical_reference: None,
            mean_depth: None,
            resolutions: SmallVec::new(),
            pool: None,
            progress: None,
            last_dispatch: None,
        }
    }

    // ── Point maintenance ──────────────────────────────────────────

    /// Stage a container's points into the lattice.
    ///
    /// Grows the lattice to enclose the data (growable grids), bins every
    /// point to its cell, lazily creates tiles or nested grids for touched
    /// cells, and forwards each cell's share of the batch. Re-adding a
    /// registered container first drops its previous points everywhere;
    /// one point set per name at a time. The staged batch also refreshes
    /// the grid's mean depth, then is released.
    ///
    /// Registry and metadata updates are not atomic with later validation:
    /// a fault from binning leaves the container registered (known caveat).
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidInput`] for an empty batch,
    /// [`GridError::MetadataConflict`] when `crs` or `vertical_reference`
    /// disagree with previously established values.
    pub fn add_points(
        &mut self,
        data: PointSet,
        container_name: &str,
        file_list: Option<Vec<String>>,
        crs: Option<u32>,
        vertical_reference: Option<&str>,
    ) -> Result<(), GridError> {
        if data.is_empty() {
            return Err(GridError::InvalidInput {
                reason: format!("container '{container_name}' supplied no points"),
            });
        }

        let replacing = self.containers.contains_key(container_name);
        self.containers.insert(
            container_name.to_string(),
            file_list.unwrap_or_else(|| vec!["unknown".to_string()]),
        );
        self.update_metadata(crs, vertical_reference)?;

        if replacing {
            self.scrub_container(container_name);
        }

        // bounds() is Some: the batch was checked non-empty above.
        let Some((min_x, min_y, max_x, max_y)) = data.bounds() else {
            return Err(GridError::InvalidInput {
                reason: "point batch has no bounds".into(),
            });
        };
        let update = self.lattice.ensure_covers(min_x, min_y, max_x, max_y)?;
        self.apply_lattice_update(update);

        let bins = bin2d(
            data.x(),
            data.y(),
            &self.lattice.tile_edges_x(),
            &self.lattice.tile_edges_y(),
        )?;
        let mut by_cell: IndexMap<usize, Vec<usize>> = IndexMap::new();
        for (row, &cell) in bins.iter().enumerate() {
            by_cell.entry(cell).or_default().push(row);
        }
        by_cell.sort_unstable_keys();

        let crs_established = self.crs;
        let vertical_reference_established = self.vertical_reference.clone();
        for (cell, rows) in &by_cell {
            let subset = data.take(rows);
            let mut occupant = match self.slots[*cell].take() {
                Some(occupant) => occupant,
                None => self.build_slot(*cell)?,
            };
            let forwarded = occupant.add_points(
                subset,
                container_name,
                crs_established,
                vertical_reference_established.as_deref(),
            );
            // Put the occupant back before propagating any fault: a slot is
            // null iff it holds no points, even on the error path.
            self.slots[*cell] = (!occupant.is_empty()).then_some(occupant);
            forwarded?;
        }

        self.mean_depth = data.mean_depth();
        Ok(())
    }

    /// Remove a container's points everywhere. Unknown names are a no-op.
    ///
    /// Slots left empty become null; a grid left with no occupants releases
    /// its lattice entirely and is indistinguishable from a fresh grid.
    pub fn remove_points(&mut self, container_name: &str) {
        if self.containers.shift_remove(container_name).is_none() {
            return;
        }
        self.scrub_container(container_name);
        if self.slots.iter().all(Option::is_none) {
            self.slots.clear();
            self.lattice.release();
            self.resolutions.clear();
            self.mean_depth = None;
        }
    }

    fn scrub_container(&mut self, container_name: &str) {
        for slot in &mut self.slots {
            if let Some(occupant) = slot {
                occupant.remove_points(container_name);
                if occupant.is_empty() {
                    *slot = None;
                }
            }
        }
    }

    fn update_metadata(
        &mut self,
        crs: Option<u32>,
        vertical_reference: Option<&str>,
    ) -> Result<(), GridError> {
        if let Some(incoming) = crs {
            match self.crs {
                Some(existing) if existing != incoming => {
                    return Err(GridError::MetadataConflict {
                        field: "crs",
                        existing: existing.to_string(),
                        incoming: incoming.to_string(),
                    })
                }
                _ => self.crs = Some(incoming),
            }
        }
        if let Some(incoming) = vertical_reference {
            match self.vertical_reference.as_deref() {
                Some(existing) if existing != incoming => {
                    return Err(GridError::MetadataConflict {
                        field: "vertical_reference",
                        existing: existing.to_string(),
                        incoming: incoming.to_string(),
                    })
                }
                _ => self.vertical_reference = Some(incoming.to_string()),
            }
        }
        Ok(())
    }

    fn apply_lattice_update(&mut self, update: LatticeUpdate) {
        match update {
            LatticeUpdate::Initialized { cells } => {
                self.slots = (0..cells).map(|_| None).collect();
            }
            LatticeUpdate::Grown { remap, cells } => {
                let old: Vec<Option<TileSlot>> = std::mem::take(&mut self.slots);
                let mut grown: Vec<Option<TileSlot>> = (0..cells).map(|_| None).collect();
                for (old_index, occupant) in old.into_iter().enumerate() {
                    grown[remap[old_index]] = occupant;
                }
                self.slots = grown;
            }
            LatticeUpdate::Unchanged => {}
        }
    }

    fn build_slot(&self, cell: usize) -> Result<TileSlot, GridError> {
        let (origin_x, origin_y) = self.lattice.tile_origin(cell)?;
        let tile_size = self.lattice.tile_size();
        Ok(match self.config.slot_kind {
            SlotKind::SingleResolution => {
                TileSlot::Tile(SrTile::new(origin_x, origin_y, tile_size))
            }
            SlotKind::VariableResolution { subtile_size } => TileSlot::Nested(Box::new(
                Grid::nested(
                    subtile_size,
                    origin_x,
                    origin_y,
                    origin_x + tile_size,
                    origin_y + tile_size,
                )?,
            )),
        })
    }

    // ── Gridding ───────────────────────────────────────────────────

    /// Grid every occupied slot and return the resolution this grid used.
    ///
    /// With `resolution` given, that value is forced uniformly (nested
    /// grids included). Omitted, this grid's depth-banded selection applies
    /// to leaf tiles while nested grids self-select from their own local
    /// mean depth, which is what lets a variable-resolution grid vary.
    ///
    /// Serial and parallel dispatch are numerically equivalent; see
    /// [`DispatchMetrics`] for what a call did. A parallel fault aborts the
    /// call after its in-flight batch drains; earlier batches stay merged
    /// and the realized-resolution bookkeeping is left untouched (known
    /// caveat, no rollback).
    ///
    /// # Errors
    ///
    /// [`GridError::EmptyGrid`] with no occupants,
    /// [`GridError::UndefinedDepth`] when selection is needed without any
    /// depth statistic, [`GridError::Shape`] when a resolution does not
    /// evenly divide the tile size, and pool faults from parallel dispatch.
    pub fn grid(
        &mut self,
        algorithm: Algorithm,
        resolution: Option<f64>,
        clear_existing: bool,
        parallel: bool,
    ) -> Result<f64, GridError> {
        if self.is_empty() {
            return Err(GridError::EmptyGrid {
                reason: "no points have been added".into(),
            });
        }
        let own_resolution = match resolution {
            Some(forced) => forced,
            None => self
                .mean_depth
                .map(resolution_for_depth)
                .ok_or(GridError::UndefinedDepth)?,
        };
        let spec = JobSpec {
            algorithm,
            forced: resolution,
            leaf_resolution: own_resolution,
            clear_existing,
        };

        let (realized, metrics) = if parallel {
            let workers = self.config.resolved_worker_count();
            let pool = self.pool.get_or_insert_with(|| WorkerPool::spawn(workers));
            grid_parallel(&mut self.slots, &spec, pool, self.progress.as_ref())?
        } else {
            grid_serial(&mut self.slots, &spec)?
        };

        self.resolutions = realized;
        self.last_dispatch = Some(metrics);
        Ok(own_resolution)
    }

    /// Install a progress hook invoked once per parallel super-step.
    pub fn set_progress_hook<F>(&mut self, hook: F)
    where
        F: Fn(BatchProgress) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(hook));
    }

    // ── Read-only state ────────────────────────────────────────────

    /// Whether no slot holds any points.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Whether no gridded surface exists anywhere beneath this grid.
    pub fn no_grid(&self) -> bool {
        !self.slots.iter().flatten().any(TileSlot::has_grid)
    }

    /// Resolutions realized by the most recent gridding call, ascending.
    pub fn resolutions(&self) -> Vec<f64> {
        self.resolutions.to_vec()
    }

    /// Mean depth of the most recently staged batch.
    pub fn mean_depth(&self) -> Option<f64> {
        self.mean_depth
    }

    /// EPSG code established by the first add that carried one.
    pub fn crs(&self) -> Option<u32> {
        self.crs
    }

    /// Vertical reference established by the first add that carried one.
    pub fn vertical_reference(&self) -> Option<&str> {
        self.vertical_reference.as_deref()
    }

    /// Registered container names, insertion order.
    pub fn container_names(&self) -> Vec<&str> {
        self.containers.keys().map(String::as_str).collect()
    }

    /// Source files registered for a container.
    pub fn container_files(&self, container_name: &str) -> Option<&[String]> {
        self.containers.get(container_name).map(Vec::as_slice)
    }

    /// Edge length of one lattice cell.
    pub fn tile_size(&self) -> f64 {
        self.lattice.tile_size()
    }

    /// Whether this grid self-sizes to enclose new data.
    pub fn can_grow(&self) -> bool {
        self.lattice.can_grow()
    }

    /// Current extents as `((min_x, min_y), (max_x, max_y))`.
    pub fn return_extents(&self) -> Option<((f64, f64), (f64, f64))> {
        self.lattice
            .extents()
            .map(|(x0, y0, x1, y1)| ((x0, y0), (x1, y1)))
    }

    /// Number of occupied slots.
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// What the most recent gridding call did.
    pub fn last_dispatch(&self) -> Option<&DispatchMetrics> {
        self.last_dispatch.as_ref()
    }

    pub(crate) fn lattice(&self) -> &TileLattice {
        &self.lattice
    }

    pub(crate) fn slots(&self) -> &[Option<TileSlot>] {
        &self.slots
    }
}
