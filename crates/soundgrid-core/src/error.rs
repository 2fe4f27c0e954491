//! The fault taxonomy for grid construction, maintenance, and layer access.
//!
//! Every fault is synchronous and raised at the violating call. There are no
//! internal retries anywhere in the workspace: a fault from a parallel batch
//! aborts the whole gridding call after the in-flight batch has drained.

use std::error::Error;
use std::fmt;

/// Faults raised by grid maintenance, gridding dispatch, and layer access.
#[derive(Clone, Debug, PartialEq)]
pub enum GridError {
    /// Gridding or layer access attempted before any data or grids exist.
    EmptyGrid {
        /// What was missing (points not yet added, or gridding not yet run).
        reason: String,
    },
    /// Layer access without naming a resolution while several are realized.
    AmbiguousResolution {
        /// The realized resolutions the caller must choose between.
        available: Vec<f64>,
    },
    /// Resolution selection attempted with no usable depth statistic.
    UndefinedDepth,
    /// Coordinate system or vertical reference disagrees with a previously
    /// established value.
    MetadataConflict {
        /// Which metadata field conflicted (`"crs"` or `"vertical_reference"`).
        field: &'static str,
        /// The value established by an earlier add.
        existing: String,
        /// The conflicting value in the current add.
        incoming: String,
    },
    /// Input point data is structurally invalid: missing required coordinate
    /// columns, unequal column lengths, or unrecognized column names.
    InvalidInput {
        /// What was wrong with the input.
        reason: String,
    },
    /// A requested resolution does not evenly divide tile or grid extents.
    Shape {
        /// The offending dimension/resolution combination.
        reason: String,
    },
    /// The gridding worker pool is gone (a worker thread terminated
    /// abnormally). Infrastructure failure, never retried.
    PoolDisconnected,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { reason } => write!(f, "grid is empty: {reason}"),
            Self::AmbiguousResolution { available } => write!(
                f,
                "multiple resolutions exist {available:?}, a resolution must be named"
            ),
            Self::UndefinedDepth => {
                write!(f, "no depth statistic available to select a resolution")
            }
            Self::MetadataConflict {
                field,
                existing,
                incoming,
            } => write!(
                f,
                "{field} mismatch: established '{existing}', incoming '{incoming}'"
            ),
            Self::InvalidInput { reason } => write!(f, "invalid input data: {reason}"),
            Self::Shape { reason } => write!(f, "shape mismatch: {reason}"),
            Self::PoolDisconnected => write!(f, "gridding worker pool disconnected"),
        }
    }
}

impl Error for GridError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_conflicting_values() {
        let err = GridError::MetadataConflict {
            field: "crs",
            existing: "26917".into(),
            incoming: "4326".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("26917") && msg.contains("4326"));
    }

    #[test]
    fn display_lists_available_resolutions() {
        let err = GridError::AmbiguousResolution {
            available: vec![0.5, 1.0],
        };
        assert!(format!("{err}").contains("0.5"));
    }
}
