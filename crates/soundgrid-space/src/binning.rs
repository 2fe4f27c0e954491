//! The 2D spatial-binning primitive.

use crate::error::SpaceError;

/// Assign each `(x, y)` point to its containing lattice cell.
///
/// `edges_x`/`edges_y` are ascending cell edge coordinates (`cols + 1` and
/// `rows + 1` entries). The result holds one row-major linear cell index per
/// point. A coordinate exactly on the maximum edge clamps into the last
/// cell, as does any coordinate outside the edge range: the lattice owner
/// guarantees coverage for growable grids, and fixed grids deliberately
/// capture boundary points in their edge cells.
///
/// # Errors
///
/// Returns [`SpaceError::InvalidBinning`] if the coordinate columns differ
/// in length or either edge vector has fewer than two entries.
pub fn bin2d(
    x: &[f64],
    y: &[f64],
    edges_x: &[f64],
    edges_y: &[f64],
) -> Result<Vec<usize>, SpaceError> {
    if x.len() != y.len() {
        return Err(SpaceError::InvalidBinning {
            reason: format!("{} x values but {} y values", x.len(), y.len()),
        });
    }
    if edges_x.len() < 2 || edges_y.len() < 2 {
        return Err(SpaceError::InvalidBinning {
            reason: "edge vectors need at least two entries".into(),
        });
    }
    let cols = edges_x.len() - 1;
    Ok(x.iter()
        .zip(y)
        .map(|(&px, &py)| bin_axis(py, edges_y) * cols + bin_axis(px, edges_x))
        .collect())
}

/// Index of the cell containing `value` along one axis, clamped into range.
fn bin_axis(value: f64, edges: &[f64]) -> usize {
    let cells = edges.len() - 1;
    // partition_point gives the count of edges <= value; the containing
    // cell is one less, clamped so max-edge and outside values stay in.
    let upper = edges.partition_point(|&e| e <= value);
    upper.saturating_sub(1).min(cells - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EDGES: [f64; 4] = [0.0, 10.0, 20.0, 30.0];

    #[test]
    fn interior_points_bin_row_major() {
        let idx = bin2d(&[5.0, 15.0, 25.0], &[5.0, 15.0, 25.0], &EDGES, &EDGES).unwrap();
        assert_eq!(idx, vec![0, 4, 8]);
    }

    #[test]
    fn lower_edges_belong_to_their_cell() {
        let idx = bin2d(&[0.0, 10.0], &[0.0, 20.0], &EDGES, &EDGES).unwrap();
        assert_eq!(idx, vec![0, 7]);
    }

    #[test]
    fn max_edge_clamps_into_last_cell() {
        let idx = bin2d(&[30.0], &[30.0], &EDGES, &EDGES).unwrap();
        assert_eq!(idx, vec![8]);
    }

    #[test]
    fn outside_points_clamp_into_edge_cells() {
        let idx = bin2d(&[-5.0, 99.0], &[-5.0, 99.0], &EDGES, &EDGES).unwrap();
        assert_eq!(idx, vec![0, 8]);
    }

    #[test]
    fn mismatched_columns_rejected() {
        let err = bin2d(&[1.0, 2.0], &[1.0], &EDGES, &EDGES).unwrap_err();
        assert!(matches!(err, SpaceError::InvalidBinning { .. }));
    }

    proptest! {
        #[test]
        fn indices_always_in_range(
            px in -100.0f64..100.0,
            py in -100.0f64..100.0,
        ) {
            let idx = bin2d(&[px], &[py], &EDGES, &EDGES).unwrap();
            prop_assert!(idx[0] < 9);
        }

        #[test]
        fn in_range_points_land_in_their_cell(
            px in 0.0f64..29.999,
            py in 0.0f64..29.999,
        ) {
            let idx = bin2d(&[px], &[py], &EDGES, &EDGES).unwrap();
            let (row, col) = (idx[0] / 3, idx[0] % 3);
            prop_assert!(EDGES[col] <= px && px < EDGES[col + 1]);
            prop_assert!(EDGES[row] <= py && py < EDGES[row + 1]);
        }
    }
}
