//! Adaptive tile lattice manager, gridding dispatch, and layer assembly.
//!
//! The [`Grid`] owns a row-major arena of tile slots covering its extents at
//! `tile_size` granularity. Points arrive in named containers and are binned
//! into slots, lazily creating leaf tiles (or nested fixed-extent grids for
//! variable-resolution composition) and lazily destroying them as they
//! empty. Gridding visits every occupied slot either serially (deterministic
//! row-major order) or in parallel super-steps of at most eight slots moved
//! by value onto a worker pool. Assembled layers are reconstructed from the
//! per-slot sub-rasters on demand.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod config;
mod dispatch;
mod grid;
mod layers;
mod pool;
mod slot;

pub use config::{ConfigError, GridConfig, SlotKind};
pub use dispatch::{BatchProgress, DispatchMetrics, DispatchMode, BATCH_SIZE};
pub use grid::Grid;
pub use layers::{SurfacePlotter, SurfaceXyz};
