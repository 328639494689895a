//! Task sequence and dispatch-record iteration
//!
//! [`JobInput`] is the ordered collection of work items for one job run.
//! Iterating it produces one [`DispatchRecord`] per item, lazily: the map
//! function handle is attached once up front, while each item's argument is
//! transport-encoded at the moment its record is produced. Iteration is
//! finite and not restartable; a second pass needs a fresh iterator.

use crate::codec::Codec;
use crate::error::{MapReduceError, MapReduceResult};
use crate::function::MapFn;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// The transportable unit sent from the controller to one worker: the map
/// function handle, one encoded argument, and the codec that decodes it.
/// Self-contained: a worker reconstructs the call from this alone.
pub struct DispatchRecord {
    pub(crate) map_fn: Arc<dyn MapFn>,
    pub(crate) arg: Vec<u8>,
    pub(crate) codec: Arc<dyn Codec>,
}

/// Ordered, indexable input for one map/reduce job.
#[derive(Default)]
pub struct JobInput {
    items: Vec<Value>,
    map_fn: Option<Arc<dyn MapFn>>,
}

impl JobInput {
    /// Create an empty input sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input sequence from an existing ordered collection.
    pub fn from_items(items: Vec<Value>) -> Self {
        Self {
            items,
            map_fn: None,
        }
    }

    /// Append one work item. `Null` is rejected: an empty task makes no
    /// sense. Returns `&mut Self` so adds can be chained.
    pub fn add(&mut self, item: Value) -> MapReduceResult<&mut Self> {
        if item.is_null() {
            return Err(MapReduceError::config(
                "item",
                "input to a map/reduce job cannot be null",
            ));
        }
        self.items.push(item);
        Ok(self)
    }

    /// Number of work items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Bind the map function for this sequence. The handle is the
    /// transportable representation and is forwarded as-is by every record
    /// the iterator produces; it is not re-derived per item.
    pub fn attach_map_fn(&mut self, map_fn: Arc<dyn MapFn>) {
        self.map_fn = Some(map_fn);
    }

    /// Iterate dispatch records from index 0.
    pub fn dispatch_iter(&self, codec: Arc<dyn Codec>) -> MapReduceResult<DispatchIter<'_>> {
        self.dispatch_iter_from(0, codec)
    }

    /// Iterate dispatch records from an explicit start offset. An offset at
    /// or beyond the item count is out of range, which makes iterating an
    /// empty sequence an error as well.
    pub fn dispatch_iter_from(
        &self,
        start: usize,
        codec: Arc<dyn Codec>,
    ) -> MapReduceResult<DispatchIter<'_>> {
        if start >= self.items.len() {
            return Err(MapReduceError::StartIndexOutOfRange {
                start,
                total: self.items.len(),
            });
        }
        let map_fn = self.map_fn.clone().ok_or_else(|| {
            MapReduceError::config("map_fn", "a map function must be attached before iteration")
        })?;
        Ok(DispatchIter {
            items: &self.items,
            current: start,
            map_fn,
            codec,
        })
    }
}

impl fmt::Debug for JobInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobInput")
            .field("len", &self.items.len())
            .field("map_fn_attached", &self.map_fn.is_some())
            .finish_non_exhaustive()
    }
}

impl FromIterator<Value> for JobInput {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Self::from_items(iter.into_iter().collect())
    }
}

impl From<Vec<Value>> for JobInput {
    fn from(items: Vec<Value>) -> Self {
        Self::from_items(items)
    }
}

/// Lazy, finite, non-restartable iterator of dispatch records.
pub struct DispatchIter<'a> {
    items: &'a [Value],
    current: usize,
    map_fn: Arc<dyn MapFn>,
    codec: Arc<dyn Codec>,
}

impl fmt::Debug for DispatchIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchIter")
            .field("current", &self.current)
            .field("total", &self.items.len())
            .finish_non_exhaustive()
    }
}

impl Iterator for DispatchIter<'_> {
    type Item = MapReduceResult<DispatchRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.get(self.current)?;
        self.current += 1;
        let record = self.codec.encode(item).map(|arg| DispatchRecord {
            map_fn: Arc::clone(&self.map_fn),
            arg,
            codec: Arc::clone(&self.codec),
        });
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.items.len() - self.current;
        (remaining, Some(remaining))
    }
}
