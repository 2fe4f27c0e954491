//! Depth-banded automatic resolution selection.
//!
//! The survey community grids shallow water finely and deep water coarsely.
//! The table below pairs a maximum-depth threshold with the cell resolution
//! that applies up to that depth, ascending.

/// The depth-band table: `(max_depth_threshold, resolution)` pairs, ascending.
///
/// Units are the coordinate units of the grid, matching the depth units.
pub const DEPTH_RESOLUTION_BANDS: [(f64, f64); 12] = [
    (20.0, 0.5),
    (40.0, 1.0),
    (60.0, 2.0),
    (80.0, 4.0),
    (160.0, 8.0),
    (320.0, 16.0),
    (640.0, 32.0),
    (1280.0, 64.0),
    (2560.0, 128.0),
    (5120.0, 256.0),
    (10240.0, 512.0),
    (20480.0, 1024.0),
];

/// The coarsest resolution in the band table.
pub fn coarsest_resolution() -> f64 {
    DEPTH_RESOLUTION_BANDS[DEPTH_RESOLUTION_BANDS.len() - 1].1
}

/// Select the gridding resolution for a mean depth.
///
/// Picks the resolution paired with the smallest threshold strictly greater
/// than `mean_depth`. Depths at or beyond the deepest threshold clamp to the
/// coarsest resolution rather than wrapping around to the finest band.
pub fn resolution_for_depth(mean_depth: f64) -> f64 {
    for (threshold, resolution) in DEPTH_RESOLUTION_BANDS {
        if threshold > mean_depth {
            return resolution;
        }
    }
    coarsest_resolution()
}
