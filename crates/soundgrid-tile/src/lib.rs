//! Leaf tile point storage and cell aggregation for soundgrid.
//!
//! An [`SrTile`] is the single-resolution workhorse at the bottom of the
//! lattice: it owns the raw points each named container contributed to its
//! square footprint and, after gridding, one cell raster per layer per
//! realized resolution.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod srtile;

pub use srtile::SrTile;
