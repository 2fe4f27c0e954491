//! Cell aggregation algorithms for per-tile gridding.

use std::fmt;

/// How the points binned into one raster cell reduce to a single value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// Arithmetic mean of each layer's points in the cell.
    Mean,
    /// Shoal-biased: the cell takes the minimum depth, and the companion
    /// uncertainty layers take the values of that shoalest point.
    Shoalest,
}

impl Algorithm {
    /// Stable identifier, usable in caller-facing configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Shoalest => "shoalest",
        }
    }

    /// Look up an algorithm by its stable identifier.
    pub fn from_name(name: &str) -> Option<Algorithm> {
        match name {
            "mean" => Some(Self::Mean),
            "shoalest" => Some(Self::Shoalest),
            _ => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
