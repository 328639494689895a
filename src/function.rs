//! Callable abstractions for the map and reduce phases
//!
//! A map function is a shared handle (`Arc<dyn MapFn>`) so one instance can
//! be captured by every worker task, closures and their captured state
//! included. The declared arity drives the worker's argument-unpacking
//! decision; the [`unary`], [`binary`] and [`ternary`] adapters wrap plain
//! closures and fix the arity for them.

use crate::error::{MapReduceError, MapReduceResult};
use serde_json::Value;
use std::sync::Arc;

/// A map-phase function with a declared positional-parameter count.
pub trait MapFn: Send + Sync {
    /// Number of positional parameters the function declares.
    fn arity(&self) -> usize;

    /// Invoke with positional arguments. The pool's workers pass either a
    /// single value or, when the unpacking rule applies, the elements of a
    /// composite argument; `args.len()` always equals `arity()` here.
    fn invoke(&self, args: Vec<Value>) -> MapReduceResult<Value>;
}

/// A reduce-phase function, run once over the full ordered result list.
pub trait ReduceFn: Send + Sync {
    fn reduce(&self, results: Vec<Value>) -> MapReduceResult<Value>;
}

impl<F> ReduceFn for F
where
    F: Fn(Vec<Value>) -> MapReduceResult<Value> + Send + Sync,
{
    fn reduce(&self, results: Vec<Value>) -> MapReduceResult<Value> {
        self(results)
    }
}

struct Unary<F>(F);

impl<F> MapFn for Unary<F>
where
    F: Fn(Value) -> MapReduceResult<Value> + Send + Sync,
{
    fn arity(&self) -> usize {
        1
    }

    fn invoke(&self, mut args: Vec<Value>) -> MapReduceResult<Value> {
        let [arg] = take_args::<1>(&mut args)?;
        (self.0)(arg)
    }
}

struct Binary<F>(F);

impl<F> MapFn for Binary<F>
where
    F: Fn(Value, Value) -> MapReduceResult<Value> + Send + Sync,
{
    fn arity(&self) -> usize {
        2
    }

    fn invoke(&self, mut args: Vec<Value>) -> MapReduceResult<Value> {
        let [a, b] = take_args::<2>(&mut args)?;
        (self.0)(a, b)
    }
}

struct Ternary<F>(F);

impl<F> MapFn for Ternary<F>
where
    F: Fn(Value, Value, Value) -> MapReduceResult<Value> + Send + Sync,
{
    fn arity(&self) -> usize {
        3
    }

    fn invoke(&self, mut args: Vec<Value>) -> MapReduceResult<Value> {
        let [a, b, c] = take_args::<3>(&mut args)?;
        (self.0)(a, b, c)
    }
}

fn take_args<const N: usize>(args: &mut Vec<Value>) -> MapReduceResult<[Value; N]> {
    if args.len() != N {
        return Err(MapReduceError::General {
            message: format!(
                "map function of arity {} invoked with {} arguments",
                N,
                args.len()
            ),
            source: None,
        });
    }
    let mut drained = args.drain(..);
    Ok(std::array::from_fn(|_| drained.next().unwrap_or(Value::Null)))
}

/// Wrap a single-parameter closure as a map function.
pub fn unary<F>(f: F) -> Arc<dyn MapFn>
where
    F: Fn(Value) -> MapReduceResult<Value> + Send + Sync + 'static,
{
    Arc::new(Unary(f))
}

/// Wrap a two-parameter closure as a map function. Composite arguments of
/// length 2 arrive unpacked.
pub fn binary<F>(f: F) -> Arc<dyn MapFn>
where
    F: Fn(Value, Value) -> MapReduceResult<Value> + Send + Sync + 'static,
{
    Arc::new(Binary(f))
}

/// Wrap a three-parameter closure as a map function.
pub fn ternary<F>(f: F) -> Arc<dyn MapFn>
where
    F: Fn(Value, Value, Value) -> MapReduceResult<Value> + Send + Sync + 'static,
{
    Arc::new(Ternary(f))
}
