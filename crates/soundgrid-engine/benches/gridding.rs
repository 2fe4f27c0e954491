//! Serial vs parallel gridding on a multi-tile survey.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use soundgrid_core::Algorithm;
use soundgrid_engine::{Grid, GridConfig};
use soundgrid_test_utils::offset_survey;

fn survey_grid() -> Grid {
    let mut grid = Grid::new(GridConfig::single_resolution(1024.0)).unwrap();
    grid.add_points(offset_survey(), "survey_a", None, None, None)
        .unwrap();
    grid
}

fn gridding(c: &mut Criterion) {
    let mut group = c.benchmark_group("gridding");

    group.bench_function("serial_30_tiles", |b| {
        b.iter_batched(
            survey_grid,
            |mut grid| grid.grid(Algorithm::Mean, Some(8.0), true, false).unwrap(),
            BatchSize::SmallInput,
        )
    });

    group.bench_function("parallel_30_tiles", |b| {
        b.iter_batched(
            survey_grid,
            |mut grid| grid.grid(Algorithm::Mean, Some(8.0), true, true).unwrap(),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, gridding);
criterion_main!(benches);
