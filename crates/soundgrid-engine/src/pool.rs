//! The gridding worker pool backing parallel dispatch.
//!
//! Worker threads own no lattice state: each job moves one tile slot by
//! value to a worker, which grids it and ships it back with the realized
//! resolutions. A failed job returns its slot unmutated inside the failure
//! result, so slot ownership is never lost across the pool boundary. The
//! pool is created lazily on first parallel use and lives until the owning
//! grid drops; closing the job channel is what terminates the workers.

use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, Sender};
use smallvec::SmallVec;
use soundgrid_core::GridError;

use crate::dispatch::{JobSpec, BATCH_SIZE};
use crate::slot::TileSlot;

/// One unit of parallel work: an occupied slot plus its job parameters.
pub(crate) struct GridJob {
    /// Linear lattice index the slot came from (and merges back into).
    pub index: usize,
    /// The slot, moved by value onto the pool.
    pub slot: TileSlot,
    /// Gridding parameters.
    pub spec: JobSpec,
}

/// The outcome of one job. The slot always comes back, gridded or not.
pub(crate) struct GridJobResult {
    pub index: usize,
    pub slot: TileSlot,
    pub outcome: Result<SmallVec<[f64; 4]>, GridError>,
}

/// Fixed-width pool of gridding worker threads.
pub(crate) struct WorkerPool {
    job_tx: Option<Sender<GridJob>>,
    result_rx: Receiver<GridJobResult>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` threads servicing a shared job channel.
    ///
    /// Channel capacities match the batch size: the dispatcher can enqueue a
    /// full super-step without blocking, and nothing beyond one super-step
    /// is ever in flight.
    pub fn spawn(workers: usize) -> Self {
        let (job_tx, job_rx) = bounded::<GridJob>(BATCH_SIZE);
        let (result_tx, result_rx) = bounded::<GridJobResult>(BATCH_SIZE);
        let handles = (0..workers.max(1))
            .map(|_| {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                std::thread::spawn(move || {
                    for mut job in job_rx.iter() {
                        let outcome = job.slot.grid(&job.spec);
                        // The dispatcher drains exactly one batch before the
                        // next; a closed result channel means it is gone.
                        let _ = result_tx.send(GridJobResult {
                            index: job.index,
                            slot: job.slot,
                            outcome,
                        });
                    }
                })
            })
            .collect();
        Self {
            job_tx: Some(job_tx),
            result_rx,
            handles,
        }
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Run one super-step: submit every job, then block until the whole
    /// batch has come back.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::PoolDisconnected`] if a worker thread died
    /// (results arrive short or the channel closed).
    pub fn run_batch(&self, jobs: Vec<GridJob>) -> Result<Vec<GridJobResult>, GridError> {
        debug_assert!(jobs.len() <= BATCH_SIZE);
        let job_tx = self.job_tx.as_ref().ok_or(GridError::PoolDisconnected)?;
        let count = jobs.len();
        for job in jobs {
            job_tx.send(job).map_err(|_| GridError::PoolDisconnected)?;
        }
        (0..count)
            .map(|_| {
                self.result_rx
                    .recv()
                    .map_err(|_| GridError::PoolDisconnected)
            })
            .collect()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the job channel ends each worker's receive loop.
        self.job_tx.take();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}
