//! Serial and batched-parallel dispatch of per-slot gridding work.
//!
//! Serial dispatch visits occupied slots in row-major lattice order, making
//! results reproducible run-to-run. Parallel dispatch partitions the same
//! occupied slots into fixed super-steps of [`BATCH_SIZE`] jobs, keeps at
//! most one super-step in flight, and merges results back at their original
//! lattice indices. Both modes are numerically equivalent; only wall clock
//! and progress reporting differ.

use smallvec::SmallVec;
use soundgrid_core::{Algorithm, GridError};

use crate::pool::{GridJob, WorkerPool};
use crate::slot::TileSlot;

/// Number of slots dispatched per parallel super-step, independent of the
/// worker count.
pub const BATCH_SIZE: usize = 8;

// ── Job parameters ─────────────────────────────────────────────────

/// Parameters shared by every slot job of one gridding call.
#[derive(Clone, Debug)]
pub(crate) struct JobSpec {
    /// Cell aggregation strategy.
    pub algorithm: Algorithm,
    /// Resolution the caller forced, if any. Forced resolutions apply
    /// uniformly, nested grids included.
    pub forced: Option<f64>,
    /// The owning grid's selected resolution, applied to leaf tiles when
    /// nothing was forced (nested grids self-select instead).
    pub leaf_resolution: f64,
    /// Drop previously realized rasters before gridding.
    pub clear_existing: bool,
}

// ── Progress and metrics ───────────────────────────────────────────

/// One progress report per parallel super-step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchProgress {
    /// 1-based index of the super-step just dispatched.
    pub batch: usize,
    /// Total number of super-steps in this gridding call.
    pub total_batches: usize,
    /// Worker threads servicing the pool.
    pub workers: usize,
}

/// Progress callback installed on a grid.
pub(crate) type ProgressFn = Box<dyn Fn(BatchProgress) + Send + Sync>;

/// Which dispatch path a gridding call took.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchMode {
    /// Single-threaded row-major iteration.
    Serial,
    /// Batched super-steps on the worker pool.
    Parallel,
}

/// What one gridding call did, retrievable from the grid afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchMetrics {
    /// Dispatch path taken.
    pub mode: DispatchMode,
    /// Occupied slots gridded.
    pub slots_gridded: usize,
    /// Super-steps dispatched (1 for serial).
    pub batches: usize,
    /// Worker threads used (1 for serial).
    pub workers: usize,
}

// ── Drivers ────────────────────────────────────────────────────────

/// Grid every occupied slot in place, row-major.
pub(crate) fn grid_serial(
    slots: &mut [Option<TileSlot>],
    spec: &JobSpec,
) -> Result<(SmallVec<[f64; 4]>, DispatchMetrics), GridError> {
    let mut realized = SmallVec::new();
    let mut gridded = 0usize;
    for slot in slots.iter_mut().flatten() {
        let resolutions = slot.grid(spec)?;
        merge_resolutions(&mut realized, &resolutions);
        gridded += 1;
    }
    realized.sort_by(f64::total_cmp);
    Ok((
        realized,
        DispatchMetrics {
            mode: DispatchMode::Serial,
            slots_gridded: gridded,
            batches: 1,
            workers: 1,
        },
    ))
}

/// Grid every occupied slot via the worker pool in super-steps of
/// [`BATCH_SIZE`], merging each batch back before dispatching the next.
///
/// On a job failure the whole in-flight batch is drained and merged (every
/// slot comes home, gridded or not), then the first fault propagates.
/// Earlier super-steps stay merged; there is no rollback.
pub(crate) fn grid_parallel(
    slots: &mut [Option<TileSlot>],
    spec: &JobSpec,
    pool: &WorkerPool,
    progress: Option<&ProgressFn>,
) -> Result<(SmallVec<[f64; 4]>, DispatchMetrics), GridError> {
    let occupied: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.is_some().then_some(i))
        .collect();
    let total_batches = occupied.len().div_ceil(BATCH_SIZE);

    let mut realized = SmallVec::new();
    for (batch_no, chunk) in occupied.chunks(BATCH_SIZE).enumerate() {
        let mut jobs = Vec::with_capacity(chunk.len());
        for &index in chunk {
            if let Some(slot) = slots[index].take() {
                jobs.push(GridJob {
                    index,
                    slot,
                    spec: spec.clone(),
                });
            }
        }

        let results = pool.run_batch(jobs)?;
        if let Some(hook) = progress {
            hook(BatchProgress {
                batch: batch_no + 1,
                total_batches,
                workers: pool.worker_count(),
            });
        }

        let mut fault = None;
        for result in results {
            match result.outcome {
                Ok(resolutions) => merge_resolutions(&mut realized, &resolutions),
                Err(err) if fault.is_none() => fault = Some(err),
                Err(_) => {}
            }
            slots[result.index] = Some(result.slot);
        }
        if let Some(err) = fault {
            return Err(err);
        }
    }

    realized.sort_by(f64::total_cmp);
    Ok((
        realized,
        DispatchMetrics {
            mode: DispatchMode::Parallel,
            slots_gridded: occupied.len(),
            batches: total_batches,
            workers: pool.worker_count(),
        },
    ))
}

fn merge_resolutions(set: &mut SmallVec<[f64; 4]>, new: &[f64]) {
    for &res in new {
        if !set.contains(&res) {
            set.push(res);
        }
    }
}
