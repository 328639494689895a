//! Map/reduce job controller
//!
//! A [`MapReduceJob`] owns or borrows a worker pool, drives the map phase
//! over a task sequence, then runs the reduce function once on the driving
//! task. Pool lifetime follows ownership, not job execution: `run` never
//! closes the pool, and `shutdown` closes it only when the job created it.

use crate::codec::{Codec, JsonCodec};
use crate::error::{MapReduceError, MapReduceResult};
use crate::function::{MapFn, ReduceFn};
use crate::input::JobInput;
use crate::pool::WorkerPool;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Builder for [`MapReduceJob`]. Validation happens in [`build`].
///
/// [`build`]: MapReduceJobBuilder::build
#[derive(Default)]
pub struct MapReduceJobBuilder {
    workers: Option<usize>,
    map_fn: Option<Arc<dyn MapFn>>,
    reduce_fn: Option<Arc<dyn ReduceFn>>,
    pool: Option<Arc<WorkerPool>>,
    codec: Option<Arc<dyn Codec>>,
}

impl MapReduceJobBuilder {
    /// Size of the map-phase worker pool. Mutually exclusive with
    /// [`pool`](Self::pool).
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// The map-phase function, required.
    pub fn map_fn(mut self, map_fn: Arc<dyn MapFn>) -> Self {
        self.map_fn = Some(map_fn);
        self
    }

    /// The reduce function, required. Receives the full ordered result list
    /// once the map phase completes.
    pub fn reduce_fn<F>(mut self, reduce_fn: F) -> Self
    where
        F: ReduceFn + 'static,
    {
        self.reduce_fn = Some(Arc::new(reduce_fn));
        self
    }

    /// Borrow an externally owned pool. The job will never close it.
    pub fn pool(mut self, pool: Arc<WorkerPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Override the transport codec. Defaults to [`JsonCodec`].
    pub fn codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Validate the configuration and construct the job. Fails on the first
    /// violation: non-positive worker count, missing map function, missing
    /// reduce function, then pool and worker count both given.
    pub fn build(self) -> MapReduceResult<MapReduceJob> {
        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err(MapReduceError::config(
                    "workers",
                    "number of workers must be a positive integer",
                ));
            }
        }
        let map_fn = self.map_fn.ok_or_else(|| {
            MapReduceError::config("map_fn", "a map function is required")
        })?;
        let reduce_fn = self.reduce_fn.ok_or_else(|| {
            MapReduceError::config("reduce_fn", "a reduce function is required")
        })?;
        if self.pool.is_some() && self.workers.is_some() {
            return Err(MapReduceError::config(
                "pool",
                "an external pool and a worker count cannot be given at the same time",
            ));
        }

        // Ownership is fixed here and never changes afterwards.
        let (pool, owns_pool) = match self.pool {
            Some(pool) => (pool, false),
            None => {
                let pool = match self.workers {
                    Some(workers) => WorkerPool::new(workers)?,
                    None => WorkerPool::with_default_workers(),
                };
                (Arc::new(pool), true)
            }
        };

        Ok(MapReduceJob {
            pool,
            owns_pool,
            map_fn,
            reduce_fn,
            codec: self
                .codec
                .unwrap_or_else(|| Arc::new(JsonCodec) as Arc<dyn Codec>),
        })
    }
}

/// A configured map/reduce job. `run` may be called any number of times;
/// each call is an independent job over a fresh task sequence.
pub struct MapReduceJob {
    pool: Arc<WorkerPool>,
    owns_pool: bool,
    map_fn: Arc<dyn MapFn>,
    reduce_fn: Arc<dyn ReduceFn>,
    codec: Arc<dyn Codec>,
}

impl MapReduceJob {
    pub fn builder() -> MapReduceJobBuilder {
        MapReduceJobBuilder::default()
    }

    /// The pool this job dispatches to.
    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Whether this job created its pool (and therefore shuts it down).
    pub fn owns_pool(&self) -> bool {
        self.owns_pool
    }

    /// Run one job: map every item in parallel, wait for all of them, then
    /// reduce the ordered results on the calling task. The returned future
    /// completes only after the reduce phase; nothing is observable before
    /// the job is done. The pool is left open regardless of outcome.
    pub async fn run(&self, input: impl Into<JobInput>) -> MapReduceResult<Value> {
        let mut input = input.into();
        input.attach_map_fn(Arc::clone(&self.map_fn));

        info!(
            items = input.len(),
            workers = self.pool.workers(),
            "starting map/reduce job"
        );

        let records = input.dispatch_iter(Arc::clone(&self.codec))?;
        let map_results = self.pool.execute(records).await?;

        debug!(results = map_results.len(), "map phase complete, reducing");
        self.reduce_fn
            .reduce(map_results)
            .map_err(|err| MapReduceError::ReduceFailed {
                reason: err.to_string(),
                source: Some(Box::new(err)),
            })
    }

    /// Dispose of the job. An owned pool is closed to new submissions and
    /// joined; a borrowed pool is left untouched. Join failures surface
    /// here, not during `run`.
    pub async fn shutdown(self) -> MapReduceResult<()> {
        if self.owns_pool {
            debug!("shutting down owned worker pool");
            self.pool.close().await
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for MapReduceJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapReduceJob")
            .field("workers", &self.pool.workers())
            .field("owns_pool", &self.owns_pool)
            .finish_non_exhaustive()
    }
}
