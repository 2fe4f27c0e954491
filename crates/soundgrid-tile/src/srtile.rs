//! The single-resolution leaf tile.

use indexmap::IndexMap;
use soundgrid_core::{Algorithm, GridError, Layer, PointSet, Raster};
use soundgrid_space::bin2d;

/// Cell rasters realized at one resolution.
#[derive(Clone, Debug, PartialEq)]
struct CellGrid {
    resolution: f64,
    layers: IndexMap<Layer, Raster>,
}

/// A square leaf tile owning raw points per container and gridded cells.
///
/// Points are stored per container name; re-adding a container replaces its
/// previous points in this tile rather than appending. Gridding bins every
/// stored point into `size / resolution` cells per side and reduces each
/// cell with the requested [`Algorithm`], producing one [`Raster`] per
/// available layer. Rasters for several resolutions coexist until a
/// `clear_existing` gridding pass drops them.
#[derive(Clone, Debug, PartialEq)]
pub struct SrTile {
    origin_x: f64,
    origin_y: f64,
    size: f64,
    points: IndexMap<String, PointSet>,
    cells: Vec<CellGrid>,
}

impl SrTile {
    /// An empty tile with its minimum corner at `(origin_x, origin_y)`.
    pub fn new(origin_x: f64, origin_y: f64, size: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            size,
            points: IndexMap::new(),
            cells: Vec::new(),
        }
    }

    /// Minimum-corner origin of the tile.
    pub fn origin(&self) -> (f64, f64) {
        (self.origin_x, self.origin_y)
    }

    /// Edge length of the tile in coordinate units.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Store `points` for `container`, replacing anything previously stored
    /// under that name in this tile. An empty point set clears the entry.
    pub fn add_points(&mut self, points: PointSet, container: &str) {
        if points.is_empty() {
            self.points.shift_remove(container);
        } else {
            self.points.insert(container.to_string(), points);
        }
    }

    /// Drop the points stored for `container`, if any. A tile left with no
    /// points also drops its gridded cells.
    pub fn remove_points(&mut self, container: &str) {
        self.points.shift_remove(container);
        if self.points.is_empty() {
            self.cells.clear();
        }
    }

    /// Whether the tile holds no points for any container.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total number of stored points across containers.
    pub fn point_count(&self) -> usize {
        self.points.values().map(PointSet::len).sum()
    }

    /// Names of the containers with points in this tile.
    pub fn container_names(&self) -> Vec<&str> {
        self.points.keys().map(String::as_str).collect()
    }

    /// Whether any gridded cells exist.
    pub fn has_grid(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Resolutions with realized cell rasters, ascending.
    pub fn resolutions(&self) -> Vec<f64> {
        let mut out: Vec<f64> = self.cells.iter().map(|c| c.resolution).collect();
        out.sort_by(f64::total_cmp);
        out
    }

    /// Layers realized by the most recent gridding, canonical order.
    pub fn layers(&self) -> Vec<Layer> {
        self.cells
            .first()
            .map(|c| c.layers.keys().copied().collect())
            .unwrap_or_default()
    }

    /// The cell raster for `layer` at `resolution`, if realized.
    pub fn get_layer(&self, layer: Layer, resolution: f64) -> Option<&Raster> {
        self.cells
            .iter()
            .find(|c| c.resolution == resolution)
            .and_then(|c| c.layers.get(&layer))
    }

    /// Grid the stored points into cells at `resolution`.
    ///
    /// Layers are gridded when every container carries the backing column;
    /// a partially-present column cannot contribute a consistent surface.
    /// Returns the resolution actually used (always the one requested).
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Shape`] when `resolution` does not evenly
    /// divide the tile size, and [`GridError::InvalidInput`] for shoalest
    /// gridding without a depth column.
    pub fn grid(
        &mut self,
        algorithm: Algorithm,
        resolution: f64,
        clear_existing: bool,
    ) -> Result<f64, GridError> {
        let per_side = cells_per_side(self.size, resolution)?;
        if clear_existing {
            self.cells.clear();
        }

        let layers = self.common_layers();
        if algorithm == Algorithm::Shoalest && !layers.contains(&Layer::Depth) {
            return Err(GridError::InvalidInput {
                reason: "shoalest gridding requires a depth column in every container".into(),
            });
        }

        let edges_x: Vec<f64> = (0..=per_side)
            .map(|i| self.origin_x + i as f64 * resolution)
            .collect();
        let edges_y: Vec<f64> = (0..=per_side)
            .map(|i| self.origin_y + i as f64 * resolution)
            .collect();

        let mut rasters = match algorithm {
            Algorithm::Mean => self.grid_mean(&layers, per_side, &edges_x, &edges_y)?,
            Algorithm::Shoalest => self.grid_shoalest(&layers, per_side, &edges_x, &edges_y)?,
        };

        let layers: IndexMap<Layer, Raster> = layers
            .iter()
            .map(|&l| (l, rasters.shift_remove(&l).unwrap_or_else(|| Raster::filled(per_side, per_side))))
            .collect();
        match self.cells.iter_mut().find(|c| c.resolution == resolution) {
            Some(existing) => existing.layers = layers,
            None => self.cells.push(CellGrid { resolution, layers }),
        }
        Ok(resolution)
    }

    /// Layers present in every stored container.
    fn common_layers(&self) -> Vec<Layer> {
        Layer::ALL
            .into_iter()
            .filter(|&l| {
                !self.points.is_empty()
                    && self.points.values().all(|p| p.layer_column(l).is_some())
            })
            .collect()
    }

    fn grid_mean(
        &self,
        layers: &[Layer],
        per_side: usize,
        edges_x: &[f64],
        edges_y: &[f64],
    ) -> Result<IndexMap<Layer, Raster>, GridError> {
        let cells = per_side * per_side;
        let mut sums: IndexMap<Layer, Vec<f64>> =
            layers.iter().map(|&l| (l, vec![0.0; cells])).collect();
        let mut counts = vec![0usize; cells];

        for points in self.points.values() {
            let bins = bin2d(points.x(), points.y(), edges_x, edges_y)?;
            for (row_idx, &cell) in bins.iter().enumerate() {
                counts[cell] += 1;
                for (&layer, acc) in sums.iter_mut() {
                    // common_layers guarantees the column exists.
                    if let Some(col) = points.layer_column(layer) {
                        acc[cell] += col[row_idx] as f64;
                    }
                }
            }
        }

        Ok(sums
            .into_iter()
            .map(|(layer, acc)| {
                let mut raster = Raster::filled(per_side, per_side);
                for (cell, &count) in counts.iter().enumerate() {
                    if count > 0 {
                        let (row, col) = (cell / per_side, cell % per_side);
                        raster.set(row, col, (acc[cell] / count as f64) as f32);
                    }
                }
                (layer, raster)
            })
            .collect())
    }

    fn grid_shoalest(
        &self,
        layers: &[Layer],
        per_side: usize,
        edges_x: &[f64],
        edges_y: &[f64],
    ) -> Result<IndexMap<Layer, Raster>, GridError> {
        let cells = per_side * per_side;
        // Per cell: the shoalest depth seen plus that point's layer values.
        let mut best: Vec<Option<(f32, Vec<f32>)>> = vec![None; cells];

        for points in self.points.values() {
            let bins = bin2d(points.x(), points.y(), edges_x, edges_y)?;
            let depths = points
                .layer_column(Layer::Depth)
                .ok_or_else(|| GridError::InvalidInput {
                    reason: "shoalest gridding requires a depth column in every container".into(),
                })?;
            for (row_idx, &cell) in bins.iter().enumerate() {
                let depth = depths[row_idx];
                let shoaler = best[cell]
                    .as_ref()
                    .map_or(true, |(current, _)| depth < *current);
                if shoaler {
                    let values = layers
                        .iter()
                        .map(|&l| points.layer_column(l).map_or(f32::NAN, |col| col[row_idx]))
                        .collect();
                    best[cell] = Some((depth, values));
                }
            }
        }

        Ok(layers
            .iter()
            .enumerate()
            .map(|(li, &layer)| {
                let mut raster = Raster::filled(per_side, per_side);
                for (cell, entry) in best.iter().enumerate() {
                    if let Some((_, values)) = entry {
                        let (row, col) = (cell / per_side, cell % per_side);
                        raster.set(row, col, values[li]);
                    }
                }
                (layer, raster)
            })
            .collect())
    }
}

fn cells_per_side(size: f64, resolution: f64) -> Result<usize, GridError> {
    if !resolution.is_finite() || resolution <= 0.0 {
        return Err(GridError::Shape {
            reason: format!("resolution must be finite and positive, got {resolution}"),
        });
    }
    let cells = size / resolution;
    if (cells - cells.round()).abs() > 1e-9 || cells.round() < 1.0 {
        return Err(GridError::Shape {
            reason: format!("resolution {resolution} does not evenly divide tile size {size}"),
        });
    }
    Ok(cells.round() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_with_square(container: &str) -> SrTile {
        // 3x3 points spaced 10 apart inside a 100-unit tile at the origin.
        let coords: Vec<f64> = (0..9).map(|i| (i % 3) as f64 * 10.0 + 5.0).collect();
        let ys: Vec<f64> = (0..9).map(|i| (i / 3) as f64 * 10.0 + 5.0).collect();
        let z: Vec<f32> = (0..9).map(|i| 20.0 + i as f32).collect();
        let points = PointSet::new(coords, ys)
            .unwrap()
            .with_depth(z)
            .unwrap();
        let mut tile = SrTile::new(0.0, 0.0, 100.0);
        tile.add_points(points, container);
        tile
    }

    #[test]
    fn readding_a_container_replaces_points() {
        let mut tile = tile_with_square("a");
        assert_eq!(tile.point_count(), 9);
        let replacement = PointSet::new(vec![50.0], vec![50.0])
            .unwrap()
            .with_depth(vec![30.0])
            .unwrap();
        tile.add_points(replacement, "a");
        assert_eq!(tile.point_count(), 1);
        assert_eq!(tile.container_names(), vec!["a"]);
    }

    #[test]
    fn removal_of_last_container_clears_cells() {
        let mut tile = tile_with_square("a");
        tile.grid(Algorithm::Mean, 10.0, false).unwrap();
        assert!(tile.has_grid());
        tile.remove_points("a");
        assert!(tile.is_empty());
        assert!(!tile.has_grid());
    }

    #[test]
    fn mean_gridding_averages_cell_points() {
        let points = PointSet::new(vec![5.0, 6.0, 95.0], vec![5.0, 6.0, 95.0])
            .unwrap()
            .with_depth(vec![10.0, 20.0, 40.0])
            .unwrap();
        let mut tile = SrTile::new(0.0, 0.0, 100.0);
        tile.add_points(points, "a");
        tile.grid(Algorithm::Mean, 10.0, false).unwrap();
        let raster = tile.get_layer(Layer::Depth, 10.0).unwrap();
        assert_eq!(raster.get(0, 0), 15.0);
        assert_eq!(raster.get(9, 9), 40.0);
        assert!(raster.get(5, 5).is_nan());
        assert_eq!(raster.valid_count(), 2);
    }

    #[test]
    fn shoalest_takes_minimum_depth_point() {
        let points = PointSet::new(vec![5.0, 6.0], vec![5.0, 6.0])
            .unwrap()
            .with_depth(vec![12.0, 8.0])
            .unwrap()
            .with_vertical_uncertainty(vec![1.0, 2.0])
            .unwrap();
        let mut tile = SrTile::new(0.0, 0.0, 100.0);
        tile.add_points(points, "a");
        tile.grid(Algorithm::Shoalest, 10.0, false).unwrap();
        assert_eq!(tile.get_layer(Layer::Depth, 10.0).unwrap().get(0, 0), 8.0);
        // The uncertainty layer carries the shoalest point's value.
        assert_eq!(
            tile.get_layer(Layer::VerticalUncertainty, 10.0)
                .unwrap()
                .get(0, 0),
            2.0
        );
    }

    #[test]
    fn shoalest_without_depth_is_invalid_input() {
        let points = PointSet::new(vec![5.0], vec![5.0]).unwrap();
        let mut tile = SrTile::new(0.0, 0.0, 100.0);
        tile.add_points(points, "a");
        let err = tile.grid(Algorithm::Shoalest, 10.0, false).unwrap_err();
        assert!(matches!(err, GridError::InvalidInput { .. }));
    }

    #[test]
    fn uneven_resolution_is_shape_fault() {
        let mut tile = tile_with_square("a");
        let err = tile.grid(Algorithm::Mean, 30.0, false).unwrap_err();
        assert!(matches!(err, GridError::Shape { .. }));
    }

    #[test]
    fn layer_gridded_only_when_all_containers_carry_it() {
        let with_tvu = PointSet::new(vec![5.0], vec![5.0])
            .unwrap()
            .with_depth(vec![10.0])
            .unwrap()
            .with_vertical_uncertainty(vec![1.0])
            .unwrap();
        let without_tvu = PointSet::new(vec![95.0], vec![95.0])
            .unwrap()
            .with_depth(vec![20.0])
            .unwrap();
        let mut tile = SrTile::new(0.0, 0.0, 100.0);
        tile.add_points(with_tvu, "a");
        tile.add_points(without_tvu, "b");
        tile.grid(Algorithm::Mean, 10.0, false).unwrap();
        assert_eq!(tile.layers(), vec![Layer::Depth]);
        assert!(tile.get_layer(Layer::VerticalUncertainty, 10.0).is_none());
    }

    #[test]
    fn regrid_at_second_resolution_keeps_both() {
        let mut tile = tile_with_square("a");
        tile.grid(Algorithm::Mean, 10.0, false).unwrap();
        tile.grid(Algorithm::Mean, 20.0, false).unwrap();
        assert_eq!(tile.resolutions(), vec![10.0, 20.0]);
        tile.grid(Algorithm::Mean, 10.0, true).unwrap();
        assert_eq!(tile.resolutions(), vec![10.0]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Mean aggregation never produces a cell value outside the
            /// depth range of the input, and fills at most one cell per
            /// point.
            #[test]
            fn mean_cells_stay_within_input_range(
                points in prop::collection::vec(
                    (0.0f64..100.0, 0.0f64..100.0, 10.0f32..50.0),
                    1..60,
                )
            ) {
                let pts = PointSet::new(
                    points.iter().map(|p| p.0).collect(),
                    points.iter().map(|p| p.1).collect(),
                )
                .unwrap()
                .with_depth(points.iter().map(|p| p.2).collect())
                .unwrap();
                let (lo, hi) = points.iter().fold(
                    (f32::INFINITY, f32::NEG_INFINITY),
                    |(lo, hi), p| (lo.min(p.2), hi.max(p.2)),
                );

                let mut tile = SrTile::new(0.0, 0.0, 100.0);
                tile.add_points(pts, "a");
                tile.grid(Algorithm::Mean, 10.0, false).unwrap();

                let raster = tile.get_layer(Layer::Depth, 10.0).unwrap();
                let valid = raster.valid_count();
                prop_assert!(valid >= 1 && valid <= points.len());
                for &v in raster.as_slice() {
                    if !v.is_nan() {
                        prop_assert!(v >= lo - 1e-3 && v <= hi + 1e-3);
                    }
                }
            }
        }
    }
}
