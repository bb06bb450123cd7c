//! Worker threads that grow the tree
//!
//! Each worker loops over the same shared state: sleep briefly, look at the
//! flags, and expand one frontier node if growth is neither paused nor
//! stopped. Workers are interchangeable and own no part of the tree; the
//! growth lock decides which of them expands which node.
//!
//! Shutdown is cooperative. [`WorkerPool::shutdown`] sets the stop flag and
//! joins every thread, so it returns within roughly one delay interval.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::GrowthConfig;
use crate::error::GrowthError;
use crate::state::{SharedGrowth, Tick};

/// Where a worker is in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    /// Attempting one expansion per step delay
    Running,

    /// Polling the flags once per pause delay
    Paused,

    /// Saw the stop flag and left the loop
    Terminated,
}

/// Steps performed by each worker of a pool that shut down cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolReport {
    /// Expansion steps, indexed by worker number
    pub steps: Vec<u64>,
}

impl PoolReport {
    /// Total expansion steps across all workers.
    pub fn total(&self) -> u64 {
        self.steps.iter().sum()
    }
}

#[derive(Debug, Clone, Copy)]
struct Delays {
    step: Duration,
    pause: Duration,
}

/// A fixed set of worker threads growing one [`SharedGrowth`].
///
/// Dropping a pool without calling [`WorkerPool::shutdown`] still stops and
/// joins its threads, discarding their results.
///
/// # Example
///
/// ```
/// use cwtree::{GrowthConfig, SharedGrowth, WorkerPool};
///
/// let config = GrowthConfig { workers: 2, step_delay_ms: 1, ..Default::default() };
/// let growth = SharedGrowth::from_config(&config).unwrap();
/// let pool = WorkerPool::spawn(&growth, &config).unwrap();
/// std::thread::sleep(std::time::Duration::from_millis(20));
/// let report = pool.shutdown().unwrap();
///
/// assert_eq!(growth.len().unwrap() as u64, 1 + 2 * report.total());
/// ```
#[derive(Debug)]
pub struct WorkerPool {
    shared: SharedGrowth,
    handles: Vec<JoinHandle<Result<u64, GrowthError>>>,
}

impl WorkerPool {
    /// Start `config.workers` threads against `shared`.
    ///
    /// # Errors
    ///
    /// `Spawn` if the OS refuses a thread; any workers already started are
    /// stopped and joined first.
    pub fn spawn(shared: &SharedGrowth, config: &GrowthConfig) -> Result<Self, GrowthError> {
        let delays = Delays {
            step: config.step_delay(),
            pause: config.pause_delay(),
        };
        let mut pool = Self {
            shared: shared.clone(),
            handles: Vec::with_capacity(config.workers),
        };
        for worker in 0..config.workers {
            let growth = shared.clone();
            let spawned = thread::Builder::new()
                .name(format!("cwtree-worker-{worker}"))
                .spawn(move || run_worker(worker, growth, delays));
            match spawned {
                Ok(handle) => pool.handles.push(handle),
                Err(err) => {
                    let _ = pool.stop_and_join();
                    return Err(GrowthError::Spawn {
                        worker,
                        reason: err.to_string(),
                    });
                }
            }
        }
        tracing::info!(
            workers = config.workers,
            step_delay_ms = config.step_delay_ms,
            pause_delay_ms = config.pause_delay_ms,
            "worker pool started"
        );
        Ok(pool)
    }

    /// Number of threads in the pool.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Check if the pool has no threads.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Stop growth, wait for every worker and report what they did.
    ///
    /// # Errors
    ///
    /// The first error any worker returned, in worker order. A worker that
    /// panicked is reported as `WorkerPanicked`.
    pub fn shutdown(mut self) -> Result<PoolReport, GrowthError> {
        let results = self.stop_and_join();
        let steps = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        tracing::info!(total = steps.iter().sum::<u64>(), ?steps, "worker pool stopped");
        Ok(PoolReport { steps })
    }

    fn stop_and_join(&mut self) -> Vec<Result<u64, GrowthError>> {
        // Workers also stop on a poisoned lock, so a failure here is not fatal.
        if let Err(err) = self.shared.stop() {
            tracing::warn!(error = %err, "could not set stop flag");
        }
        self.handles
            .drain(..)
            .enumerate()
            .map(|(worker, handle)| {
                handle
                    .join()
                    .unwrap_or(Err(GrowthError::WorkerPanicked { worker }))
            })
            .collect()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            self.stop_and_join();
        }
    }
}

fn run_worker(worker: usize, shared: SharedGrowth, delays: Delays) -> Result<u64, GrowthError> {
    let mut steps = 0;
    let mut phase = WorkerPhase::Running;
    while phase != WorkerPhase::Terminated {
        thread::sleep(match phase {
            WorkerPhase::Paused => delays.pause,
            _ => delays.step,
        });
        let next = match shared.tick() {
            Ok(Tick::Stopped) => WorkerPhase::Terminated,
            Ok(Tick::Paused) => WorkerPhase::Paused,
            Ok(Tick::Idle) => WorkerPhase::Running,
            Ok(Tick::Expanded(_)) => {
                steps += 1;
                WorkerPhase::Running
            }
            Err(err) => {
                tracing::error!(worker, error = %err, "expansion failed, worker aborting");
                return Err(err);
            }
        };
        if next != phase {
            tracing::debug!(worker, from = ?phase, to = ?next, "worker phase changed");
            phase = next;
        }
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rational;

    fn fast_config(workers: usize) -> GrowthConfig {
        GrowthConfig {
            workers,
            step_delay_ms: 1,
            pause_delay_ms: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_report_total() {
        let report = PoolReport {
            steps: vec![3, 0, 4],
        };
        assert_eq!(report.total(), 7);
    }

    #[test]
    fn test_pool_spawns_requested_workers() {
        let config = fast_config(3);
        let growth = SharedGrowth::from_config(&config).unwrap();
        let pool = WorkerPool::spawn(&growth, &config).unwrap();
        assert_eq!(pool.len(), 3);
        let report = pool.shutdown().unwrap();
        assert_eq!(report.steps.len(), 3);
        assert!(growth.is_stopped().unwrap());
    }

    #[test]
    fn test_worker_error_surfaces_from_shutdown() {
        let config = GrowthConfig {
            start: Rational::new(u64::MAX, 1).unwrap(),
            ..fast_config(2)
        };
        let growth = SharedGrowth::from_config(&config).unwrap();
        let pool = WorkerPool::spawn(&growth, &config).unwrap();
        while !growth.is_stopped().unwrap() {
            thread::sleep(Duration::from_millis(1));
        }
        let err = pool.shutdown().unwrap_err();
        assert!(matches!(err, GrowthError::ArithmeticOverflow { .. }));
        assert_eq!(growth.len().unwrap(), 1);
    }

    #[test]
    fn test_drop_stops_workers() {
        let config = fast_config(2);
        let growth = SharedGrowth::from_config(&config).unwrap();
        drop(WorkerPool::spawn(&growth, &config).unwrap());
        assert!(growth.is_stopped().unwrap());
    }
}
