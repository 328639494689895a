//! Worker invocation protocol
//!
//! Each pool worker receives one dispatch record and reconstructs the call
//! locally: decode the argument, pick the invocation shape, execute. A
//! composite (JSON array) argument is unpacked into separate positional
//! parameters only when its length equals the function's declared arity and
//! is greater than one. The `> 1` guard keeps a single-parameter function
//! receiving a length-1 array unambiguous: it gets the array itself, never
//! its lone element. That rule is load-bearing for callers and must not
//! change.

use crate::error::MapReduceResult;
use crate::input::DispatchRecord;
use serde_json::Value;
use tracing::debug;

/// Execute one dispatch record in the current worker context.
pub(crate) fn run_mapper(record: &DispatchRecord) -> MapReduceResult<Value> {
    let arg = record.codec.decode(&record.arg)?;
    let map_fn = &record.map_fn;

    match arg {
        Value::Array(elements) if elements.len() == map_fn.arity() && elements.len() > 1 => {
            debug!(arity = map_fn.arity(), "invoking map function unpacked");
            map_fn.invoke(elements)
        }
        other => map_fn.invoke(vec![other]),
    }
}
