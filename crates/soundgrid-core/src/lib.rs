//! Core types and faults for the soundgrid bathymetric gridding workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! fundamental vocabulary shared by the lattice, tile, and engine crates:
//! the columnar point set, surface layer taxonomy, raster container, cell
//! aggregation algorithms, the depth-banded resolution table, and the fault
//! taxonomy raised throughout the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod algorithm;
mod error;
mod layer;
mod points;
mod raster;
mod resolution;

pub use algorithm::Algorithm;
pub use error::GridError;
pub use layer::Layer;
pub use points::{Column, PointSet};
pub use raster::Raster;
pub use resolution::{coarsest_resolution, resolution_for_depth, DEPTH_RESOLUTION_BANDS};
