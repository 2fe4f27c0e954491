//! Soundgrid: adaptive tile lattice gridding for bathymetric point clouds.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all soundgrid sub-crates. For most users, adding `soundgrid` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use soundgrid::prelude::*;
//!
//! // A 10x10 survey pass: 100-unit spacing over [0, 900]^2, depths 20-30.
//! let n = 100usize;
//! let x: Vec<f64> = (0..n).map(|i| (i % 10) as f64 * 100.0).collect();
//! let y: Vec<f64> = (0..n).map(|i| (i / 10) as f64 * 100.0).collect();
//! let z: Vec<f32> = (0..n).map(|i| 20.0 + 10.0 * i as f32 / 99.0).collect();
//! let points = PointSet::new(x, y).unwrap().with_depth(z).unwrap();
//!
//! let mut grid = Grid::new(GridConfig::single_resolution(1024.0)).unwrap();
//! grid.add_points(points, "survey_a", None, Some(26917), Some("mllw"))
//!     .unwrap();
//!
//! // Mean depth ~25 sits in the (20, 40] band: 1.0-unit cells.
//! let resolution = grid.grid(Algorithm::Mean, None, false, false).unwrap();
//! assert_eq!(resolution, 1.0);
//!
//! let depth = grid.get_layer_by_name(Layer::Depth, None).unwrap();
//! assert_eq!((depth.rows(), depth.cols()), (1024, 1024));
//! assert_eq!(depth.valid_count(), 100);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `soundgrid-core` | Point sets, layers, rasters, faults, resolution bands |
//! | [`space`] | `soundgrid-space` | Tile lattice geometry and spatial binning |
//! | [`tile`] | `soundgrid-tile` | The leaf tile and its cell aggregation |
//! | [`engine`] | `soundgrid-engine` | The grid manager, dispatch, and layer assembly |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, faults, and the resolution table (`soundgrid-core`).
pub use soundgrid_core as types;

/// Lattice geometry and spatial binning (`soundgrid-space`).
pub use soundgrid_space as space;

/// Leaf tile storage and aggregation (`soundgrid-tile`).
pub use soundgrid_tile as tile;

/// Grid manager, gridding dispatch, and layer assembly (`soundgrid-engine`).
pub use soundgrid_engine as engine;

pub use soundgrid_core::{
    resolution_for_depth, Algorithm, Column, GridError, Layer, PointSet, Raster,
    DEPTH_RESOLUTION_BANDS,
};
pub use soundgrid_engine::{
    BatchProgress, ConfigError, DispatchMetrics, DispatchMode, Grid, GridConfig, SlotKind,
    SurfacePlotter, SurfaceXyz,
};

/// The most commonly used soundgrid types in one import.
pub mod prelude {
    pub use soundgrid_core::{Algorithm, Column, GridError, Layer, PointSet, Raster};
    pub use soundgrid_engine::{Grid, GridConfig, SurfacePlotter, SurfaceXyz};
}
