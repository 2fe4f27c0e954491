//! Synthetic survey generators for soundgrid development.
//!
//! Provides regular meshgrid point sets with linear depth and uncertainty
//! ramps, the shape of data a multibeam survey pass produces once cleaned.
//! Shared by the tile, engine, and facade test suites.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use soundgrid_core::PointSet;

/// A regular grid of soundings covering `[x_start, x_stop)` ×
/// `[y_start, y_stop)` at `spacing`, row-major from the minimum corner.
///
/// Depth ramps linearly across the `depths` range point by point; `tvu`
/// ramps 1.0–2.0 and `thu` 0.5–1.0 the same way.
///
/// # Panics
///
/// Panics if the ranges or spacing describe an empty grid; test input
/// construction is expected to be infallible.
pub fn meshgrid_survey(
    x_start: f64,
    x_stop: f64,
    y_start: f64,
    y_stop: f64,
    spacing: f64,
    depths: (f32, f32),
) -> PointSet {
    assert!(spacing > 0.0 && x_stop > x_start && y_stop > y_start);
    let xs: Vec<f64> = arange(x_start, x_stop, spacing);
    let ys: Vec<f64> = arange(y_start, y_stop, spacing);
    let count = xs.len() * ys.len();
    assert!(count > 0);

    let mut x = Vec::with_capacity(count);
    let mut y = Vec::with_capacity(count);
    for &py in &ys {
        for &px in &xs {
            x.push(px);
            y.push(py);
        }
    }
    let z = linspace(depths.0, depths.1, count);
    let tvu = linspace(1.0, 2.0, count);
    let thu = linspace(0.5, 1.0, count);

    PointSet::new(x, y)
        .expect("meshgrid columns are equal length")
        .with_depth(z)
        .expect("depth column matches")
        .with_vertical_uncertainty(tvu)
        .expect("tvu column matches")
        .with_horizontal_uncertainty(thu)
        .expect("thu column matches")
}

/// The canonical small survey: 10×10 points spaced 100 units over
/// `[0, 900]²` with depths ramping 20–30.
pub fn small_survey() -> PointSet {
    meshgrid_survey(0.0, 1000.0, 0.0, 1000.0, 100.0, (20.0, 30.0))
}

/// A second survey well away from the first: 50×50 points spaced 100 units
/// over `[0, 4900] × [50000, 54900]`.
pub fn offset_survey() -> PointSet {
    meshgrid_survey(0.0, 5000.0, 50000.0, 55000.0, 100.0, (20.0, 30.0))
}

/// A small survey at a constant depth, for exercising resolution bands.
pub fn flat_survey(depth: f32) -> PointSet {
    meshgrid_survey(0.0, 1000.0, 0.0, 1000.0, 100.0, (depth, depth))
}

fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    let mut out = Vec::new();
    let mut v = start;
    while v < stop {
        out.push(v);
        v += step;
    }
    out
}

fn linspace(start: f32, stop: f32, count: usize) -> Vec<f32> {
    if count == 1 {
        return vec![start];
    }
    let step = (stop - start) / (count - 1) as f32;
    (0..count).map(|i| start + i as f32 * step).collect()
}
