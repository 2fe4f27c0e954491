//! Property tests for lattice growth through the public API.

use proptest::prelude::*;
use soundgrid_core::PointSet;
use soundgrid_engine::{Grid, GridConfig};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// After any sequence of adds, the extents enclose every point ever
    /// added and only ever grow.
    #[test]
    fn extents_enclose_every_point_ever_added(
        batches in prop::collection::vec(
            prop::collection::vec((-4000.0f64..4000.0, -4000.0f64..4000.0), 1..20),
            1..5,
        )
    ) {
        let mut grid = Grid::new(GridConfig::single_resolution(512.0)).unwrap();
        let mut seen: Vec<(f64, f64)> = Vec::new();
        let mut previous_extents: Option<((f64, f64), (f64, f64))> = None;

        for (pass, batch) in batches.iter().enumerate() {
            let points = PointSet::new(
                batch.iter().map(|p| p.0).collect(),
                batch.iter().map(|p| p.1).collect(),
            )
            .unwrap()
            .with_depth(vec![25.0; batch.len()])
            .unwrap();
            grid.add_points(points, &format!("pass_{pass}"), None, None, None)
                .unwrap();
            seen.extend(batch.iter().copied());

            let ((min_x, min_y), (max_x, max_y)) = grid.return_extents().unwrap();
            for &(px, py) in &seen {
                prop_assert!(px >= min_x && px <= max_x);
                prop_assert!(py >= min_y && py <= max_y);
            }
            if let Some(((p_min_x, p_min_y), (p_max_x, p_max_y))) = previous_extents {
                prop_assert!(min_x <= p_min_x && min_y <= p_min_y);
                prop_assert!(max_x >= p_max_x && max_y >= p_max_y);
            }
            previous_extents = Some(((min_x, min_y), (max_x, max_y)));
        }
        prop_assert!(grid.occupied_count() > 0);
    }
}
