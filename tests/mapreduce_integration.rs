//! End-to-end tests for map/reduce job execution: ordering, arity
//! unpacking, pool ownership, and configuration validation.

use mrjob::{function, JobInput, MapReduceError, MapReduceJob, MapReduceResult, WorkerPool};
use serde_json::{json, Value};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn sum_reducer(results: Vec<Value>) -> MapReduceResult<Value> {
    Ok(json!(results.iter().filter_map(Value::as_i64).sum::<i64>()))
}

fn collect_reducer(results: Vec<Value>) -> MapReduceResult<Value> {
    Ok(Value::Array(results))
}

#[tokio::test]
async fn test_identity_map_preserves_order() {
    init_tracing();
    let items: Vec<Value> = (0..50).map(|i| json!(i)).collect();

    for workers in [1, 2, 64] {
        let job = MapReduceJob::builder()
            .workers(workers)
            .map_fn(function::unary(Ok))
            .reduce_fn(collect_reducer)
            .build()
            .unwrap();
        let result = job.run(items.clone()).await.unwrap();
        assert_eq!(result, Value::Array(items.clone()), "workers = {workers}");
    }
}

#[tokio::test]
async fn test_map_then_sum() {
    let job = MapReduceJob::builder()
        .workers(2)
        .map_fn(function::unary(|v| {
            Ok(json!(v.as_i64().unwrap_or(0) * 10))
        }))
        .reduce_fn(sum_reducer)
        .build()
        .unwrap();

    let total = job
        .run(vec![json!(1), json!(2), json!(3), json!(4)])
        .await
        .unwrap();
    assert_eq!(total, json!(100));
}

#[tokio::test]
async fn test_pair_arguments_arrive_unpacked() {
    let job = MapReduceJob::builder()
        .workers(2)
        .map_fn(function::binary(|a, b| {
            Ok(json!(a.as_i64().unwrap_or(0) + b.as_i64().unwrap_or(0)))
        }))
        .reduce_fn(collect_reducer)
        .build()
        .unwrap();

    let result = job
        .run(vec![json!([1, 2]), json!([2, 3]), json!([3, 4])])
        .await
        .unwrap();
    assert_eq!(result, json!([3, 5, 7]));

    let summing = MapReduceJob::builder()
        .workers(2)
        .map_fn(function::binary(|a, b| {
            Ok(json!(a.as_i64().unwrap_or(0) + b.as_i64().unwrap_or(0)))
        }))
        .reduce_fn(sum_reducer)
        .build()
        .unwrap();
    let total = summing
        .run(vec![json!([1, 2]), json!([2, 3]), json!([3, 4])])
        .await
        .unwrap();
    assert_eq!(total, json!(15));
}

#[tokio::test]
async fn test_length_one_composite_is_not_unpacked() {
    let job = MapReduceJob::builder()
        .workers(1)
        .map_fn(function::unary(Ok))
        .reduce_fn(collect_reducer)
        .build()
        .unwrap();

    // A unary function given a one-element list receives the list itself.
    let result = job.run(vec![json!([7])]).await.unwrap();
    assert_eq!(result, json!([[7]]));
}

#[tokio::test]
async fn test_borrowed_pool_survives_job_shutdown() {
    let pool = Arc::new(WorkerPool::new(2).unwrap());

    let job = MapReduceJob::builder()
        .pool(Arc::clone(&pool))
        .map_fn(function::unary(Ok))
        .reduce_fn(sum_reducer)
        .build()
        .unwrap();
    assert!(!job.owns_pool());
    job.shutdown().await.unwrap();

    // The borrowed pool is still open and usable by a new job.
    assert!(!pool.is_closed());
    let second = MapReduceJob::builder()
        .pool(Arc::clone(&pool))
        .map_fn(function::unary(Ok))
        .reduce_fn(sum_reducer)
        .build()
        .unwrap();
    assert_eq!(second.run(vec![json!(1), json!(2)]).await.unwrap(), json!(3));
}

#[tokio::test]
async fn test_owned_pool_closed_on_shutdown() {
    let job = MapReduceJob::builder()
        .workers(2)
        .map_fn(function::unary(Ok))
        .reduce_fn(sum_reducer)
        .build()
        .unwrap();
    assert!(job.owns_pool());

    let pool = Arc::clone(job.pool());
    job.shutdown().await.unwrap();
    assert!(pool.is_closed());
}

#[tokio::test]
async fn test_repeated_runs_are_independent() {
    let job = MapReduceJob::builder()
        .workers(2)
        .map_fn(function::unary(Ok))
        .reduce_fn(sum_reducer)
        .build()
        .unwrap();

    assert_eq!(job.run(vec![json!(1), json!(2)]).await.unwrap(), json!(3));
    assert_eq!(
        job.run(vec![json!(10), json!(20), json!(30)]).await.unwrap(),
        json!(60)
    );
}

#[tokio::test]
async fn test_prebuilt_input_and_plain_vec_are_equivalent() {
    let job = MapReduceJob::builder()
        .workers(2)
        .map_fn(function::unary(Ok))
        .reduce_fn(sum_reducer)
        .build()
        .unwrap();

    let mut input = JobInput::new();
    input
        .add(json!(1))
        .unwrap()
        .add(json!(2))
        .unwrap()
        .add(json!(3))
        .unwrap();
    assert_eq!(job.run(input).await.unwrap(), json!(6));
    assert_eq!(
        job.run(vec![json!(1), json!(2), json!(3)]).await.unwrap(),
        json!(6)
    );
}

#[tokio::test]
async fn test_map_failure_fails_the_job() {
    let job = MapReduceJob::builder()
        .workers(2)
        .map_fn(function::unary(|v| {
            if v == json!(3) {
                Err(MapReduceError::General {
                    message: "unmappable item".to_string(),
                    source: None,
                })
            } else {
                Ok(v)
            }
        }))
        .reduce_fn(collect_reducer)
        .build()
        .unwrap();

    let err = job
        .run(vec![json!(1), json!(2), json!(3), json!(4)])
        .await
        .unwrap_err();
    assert!(matches!(err, MapReduceError::MapFailed { index: 2, .. }));
}

#[tokio::test]
async fn test_panicking_map_fn_fails_the_job() {
    let job = MapReduceJob::builder()
        .workers(2)
        .map_fn(function::unary(|v| {
            if v == json!(1) {
                panic!("map function gave up");
            }
            Ok(v)
        }))
        .reduce_fn(collect_reducer)
        .build()
        .unwrap();

    let err = job
        .run(vec![json!(0), json!(1), json!(2)])
        .await
        .unwrap_err();
    assert!(matches!(err, MapReduceError::WorkerPanic { index: 1 }));
}

#[tokio::test]
async fn test_empty_input_is_out_of_range() {
    let job = MapReduceJob::builder()
        .workers(2)
        .map_fn(function::unary(Ok))
        .reduce_fn(sum_reducer)
        .build()
        .unwrap();

    let err = job.run(Vec::<Value>::new()).await.unwrap_err();
    assert!(matches!(
        err,
        MapReduceError::StartIndexOutOfRange { start: 0, total: 0 }
    ));
}
