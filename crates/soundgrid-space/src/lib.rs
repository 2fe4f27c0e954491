//! Tile lattice geometry and spatial binning for soundgrid.
//!
//! A [`TileLattice`] tracks the tile-aligned extents of a grid and the
//! row-major arithmetic that addresses its cells. Growth never moves an
//! existing cell relative to the coordinate frame: enlarging the extents
//! produces an explicit index remap table the owner applies to its slot
//! arena. [`bin2d`] is the spatial-binning primitive that assigns each
//! point to its containing lattice cell.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod binning;
mod error;
mod lattice;

pub use binning::bin2d;
pub use error::SpaceError;
pub use lattice::{LatticeUpdate, TileLattice};
