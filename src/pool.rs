//! Fixed-size worker pool for the map phase
//!
//! Tasks are handed to workers on a rolling, first-available basis: a
//! semaphore holds one permit per worker, each dispatch acquires a permit
//! before its task is spawned, and the permit is released when the task
//! finishes. Results are gathered in submission order no matter which
//! worker finishes first. `close` stops new submissions, waits for
//! in-flight work by draining every permit, then retires the permits so
//! the pool can never dispatch again.

use crate::error::{MapReduceError, MapReduceResult};
use crate::input::DispatchRecord;
use crate::worker;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// A fixed-size pool of isolated worker tasks.
pub struct WorkerPool {
    workers: usize,
    semaphore: Arc<Semaphore>,
    closed: AtomicBool,
}

impl WorkerPool {
    /// Create a pool with a fixed worker count. Zero workers is a
    /// configuration error.
    pub fn new(workers: usize) -> MapReduceResult<Self> {
        if workers == 0 {
            return Err(MapReduceError::config(
                "workers",
                "worker count must be a positive integer",
            ));
        }
        Ok(Self {
            workers,
            semaphore: Arc::new(Semaphore::new(workers)),
            closed: AtomicBool::new(false),
        })
    }

    /// Create a pool sized to the host's available parallelism.
    pub fn with_default_workers() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            workers,
            semaphore: Arc::new(Semaphore::new(workers)),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of concurrent workers.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Whether the pool has been closed to new submissions.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Submit a stream of dispatch records and wait for every task to
    /// finish, returning results in submission order. The first failure in
    /// submission order is surfaced and no partial result list escapes.
    pub async fn execute<I>(&self, records: I) -> MapReduceResult<Vec<Value>>
    where
        I: IntoIterator<Item = MapReduceResult<DispatchRecord>>,
    {
        if self.is_closed() {
            return Err(MapReduceError::PoolClosed);
        }

        let mut handles = Vec::new();
        for (index, record) in records.into_iter().enumerate() {
            let record = record?;
            // Acquisition fails only once `close` has retired the permits,
            // which covers a close racing an in-flight submission stream.
            let permit = Arc::clone(&self.semaphore)
                .acquire_owned()
                .await
                .map_err(|_| MapReduceError::PoolClosed)?;
            debug!(index, "dispatching map task");
            handles.push(tokio::spawn(async move {
                let result = worker::run_mapper(&record);
                drop(permit);
                result
            }));
        }

        info!(
            tasks = handles.len(),
            workers = self.workers,
            "map tasks dispatched, waiting for completion"
        );

        // Barrier: every task has finished before any result is inspected.
        let outcomes = futures::future::join_all(handles).await;

        let mut results = Vec::with_capacity(outcomes.len());
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(Ok(value)) => results.push(value),
                Ok(Err(err @ MapReduceError::Transport { .. })) => return Err(err),
                Ok(Err(err)) => {
                    return Err(MapReduceError::MapFailed {
                        index,
                        reason: err.to_string(),
                        source: Some(Box::new(err)),
                    })
                }
                Err(join_err) if join_err.is_panic() => {
                    return Err(MapReduceError::WorkerPanic { index })
                }
                Err(join_err) => {
                    return Err(MapReduceError::General {
                        message: format!("worker task {index} was aborted"),
                        source: Some(Box::new(join_err)),
                    })
                }
            }
        }
        Ok(results)
    }

    /// Close the pool to new submissions and wait for in-flight workers to
    /// exit. Idempotent; only the first call performs the join. Once it
    /// returns, no further task can ever be dispatched: the permits are
    /// retired for good, so even a submission stream that started before
    /// the close fails on its next dispatch.
    pub async fn close(&self) -> MapReduceResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let drained = self
            .semaphore
            .acquire_many(self.workers as u32)
            .await
            .map_err(|e| MapReduceError::General {
                message: "failed to join worker pool".to_string(),
                source: Some(Box::new(e)),
            })?;
        self.semaphore.close();
        drained.forget();
        info!(workers = self.workers, "worker pool closed and joined");
        Ok(())
    }
}
