//! # mrjob
//!
//! A minimal parallel map/reduce execution engine: supply a collection of
//! input items, a per-item map function, and a final reduce function; a
//! fixed-size worker pool runs the map phase in parallel, results are
//! gathered in input order, and the reducer runs once on the driving task
//! with the full result list.
//!
//! Targets embarrassingly-parallel batch workloads only: no task
//! dependencies, no streaming or incremental reduce, no retries, no
//! cross-node distribution.
//!
//! ## Modules
//!
//! - `codec` - Transport codec for values crossing the worker boundary
//! - `error` - Structured error types for job execution
//! - `function` - Map and reduce callable abstractions with declared arity
//! - `input` - Task sequence and lazy dispatch-record iteration
//! - `job` - Job controller: configuration, pool ownership, run/shutdown
//! - `pool` - Fixed-size worker pool with rolling task dispatch
//!
//! ## Usage
//!
//! ```
//! use mrjob::{function, MapReduceJob};
//! use serde_json::{json, Value};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> mrjob::MapReduceResult<()> {
//! let job = MapReduceJob::builder()
//!     .workers(2)
//!     .map_fn(function::unary(|v: Value| Ok(json!(v.as_i64().unwrap_or(0) * 2))))
//!     .reduce_fn(|results: Vec<Value>| {
//!         Ok(json!(results.iter().filter_map(Value::as_i64).sum::<i64>()))
//!     })
//!     .build()?;
//!
//! let total = job.run(vec![json!(1), json!(2), json!(3)]).await?;
//! assert_eq!(total, json!(12));
//! job.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod error;
pub mod function;
pub mod input;
pub mod job;
pub mod pool;

mod worker;

pub use codec::{Codec, JsonCodec};
pub use error::{MapReduceError, MapReduceResult};
pub use function::{MapFn, ReduceFn};
pub use input::{DispatchRecord, JobInput};
pub use job::{MapReduceJob, MapReduceJobBuilder};
pub use pool::WorkerPool;
