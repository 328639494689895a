//! Transport codec for values crossing the worker boundary
//!
//! Workers run in their own tasks with no access to submitting-side state,
//! so every argument travels as bytes and is reconstructed on the worker
//! side. The codec is the single seam where that encoding lives; jobs use
//! [`JsonCodec`] unless handed something else.

use crate::error::{MapReduceError, MapReduceResult};
use serde_json::Value;

/// Encodes and decodes values for transport into worker contexts.
pub trait Codec: Send + Sync {
    /// Encode a value into transportable bytes.
    fn encode(&self, value: &Value) -> MapReduceResult<Vec<u8>>;

    /// Decode transportable bytes back into a value.
    fn decode(&self, bytes: &[u8]) -> MapReduceResult<Value>;
}

/// Default codec backed by serde_json.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> MapReduceResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|source| MapReduceError::Transport {
            context: "encoding a work item argument".to_string(),
            source,
        })
    }

    fn decode(&self, bytes: &[u8]) -> MapReduceResult<Value> {
        serde_json::from_slice(bytes).map_err(|source| MapReduceError::Transport {
            context: "decoding a dispatch record argument".to_string(),
            source,
        })
    }
}
