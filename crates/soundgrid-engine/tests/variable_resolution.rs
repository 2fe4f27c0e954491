//! Variable-resolution composition: nested grids selecting per-region
//! resolutions.

use soundgrid_core::{Algorithm, GridError, Layer};
use soundgrid_engine::{Grid, GridConfig};
use soundgrid_test_utils::meshgrid_survey;

/// Shallow points in the first parent tile, deep points in another.
fn two_region_grid() -> Grid {
    let mut grid = Grid::new(GridConfig::variable_resolution(1024.0, 128.0)).unwrap();
    let shallow = meshgrid_survey(0.0, 1000.0, 0.0, 1000.0, 100.0, (20.0, 30.0));
    let deep = meshgrid_survey(2048.0, 3000.0, 2048.0, 3000.0, 100.0, (95.0, 105.0));
    grid.add_points(shallow, "survey_shallow", None, None, None)
        .unwrap();
    grid.add_points(deep, "survey_deep", None, None, None).unwrap();
    grid
}

#[test]
fn each_region_selects_its_own_resolution() {
    let mut grid = two_region_grid();
    grid.grid(Algorithm::Mean, None, false, false).unwrap();

    // Mean depth 25 selects 1.0; mean depth 100 selects 8.0. Both are
    // realized because nested grids self-select when nothing is forced.
    assert_eq!(grid.resolutions(), vec![1.0, 8.0]);
}

#[test]
fn layer_access_needs_a_resolution_when_several_exist() {
    let mut grid = two_region_grid();
    grid.grid(Algorithm::Mean, None, false, false).unwrap();

    let err = grid.get_layer_by_name(Layer::Depth, None).unwrap_err();
    assert!(matches!(err, GridError::AmbiguousResolution { .. }));
}

#[test]
fn mixed_resolution_layers_fill_only_matching_regions() {
    let mut grid = two_region_grid();
    grid.grid(Algorithm::Mean, None, false, false).unwrap();

    // At 1.0 only the shallow region has data; the deep region's block
    // stays sentinel.
    let fine = grid.get_layer_by_name(Layer::Depth, Some(1.0)).unwrap();
    assert_eq!(fine.valid_count(), 100);
    let (_, mins, maxs) = grid.get_layer_trimmed(Layer::Depth, Some(1.0)).unwrap();
    assert_eq!(mins, [0, 0]);
    assert_eq!(maxs, [901, 901]);

    // At 8.0 only the deep region has data.
    let coarse = grid.get_layer_by_name(Layer::Depth, Some(8.0)).unwrap();
    assert_eq!(coarse.valid_count(), 100);
}

#[test]
fn forced_resolution_applies_uniformly() {
    let mut grid = two_region_grid();
    let used = grid.grid(Algorithm::Mean, Some(4.0), false, false).unwrap();
    assert_eq!(used, 4.0);
    assert_eq!(grid.resolutions(), vec![4.0]);

    let layer = grid.get_layer_by_name(Layer::Depth, None).unwrap();
    // Both regions contribute at the forced resolution.
    assert_eq!(layer.valid_count(), 200);
}

#[test]
fn nested_grids_stay_pinned_to_their_parent_cell() {
    let mut grid = two_region_grid();
    // Top-level extents cover both regions, snapped to 1024 boundaries.
    assert_eq!(grid.return_extents(), Some(((0.0, 0.0), (3072.0, 3072.0))));
    // Two parent cells are occupied, each by a nested grid.
    assert_eq!(grid.occupied_count(), 2);

    grid.grid(Algorithm::Mean, None, false, false).unwrap();
    // The shallow nested grid realizes 8 x 8 = 64 of its 128-unit subcells;
    // data cells in the fine assembled layer stay inside the first parent
    // tile's block.
    let fine = grid.get_layer_by_name(Layer::Depth, Some(1.0)).unwrap();
    assert_eq!((fine.rows(), fine.cols()), (3072, 3072));
    for (i, value) in fine.as_slice().iter().enumerate() {
        if !value.is_nan() {
            let (row, col) = (i / 3072, i % 3072);
            assert!(row < 1024 && col < 1024, "data leaked to ({row}, {col})");
        }
    }
}

#[test]
fn serial_and_parallel_agree_on_variable_resolution() {
    let mut serial = two_region_grid();
    let mut parallel = two_region_grid();
    serial.grid(Algorithm::Mean, None, false, false).unwrap();
    parallel.grid(Algorithm::Mean, None, false, true).unwrap();

    assert_eq!(serial.resolutions(), parallel.resolutions());
    for resolution in serial.resolutions() {
        let a = serial
            .get_layer_by_name(Layer::Depth, Some(resolution))
            .unwrap();
        let b = parallel
            .get_layer_by_name(Layer::Depth, Some(resolution))
            .unwrap();
        assert_eq!(a.valid_count(), b.valid_count());
        for (va, vb) in a.as_slice().iter().zip(b.as_slice()) {
            assert_eq!(va.is_nan(), vb.is_nan());
            if !va.is_nan() {
                assert!((va - vb).abs() < 1e-6);
            }
        }
    }
}
