//! The `Transform` (1→1) primitive: a mapping function, optionally run with
//! a declared degree of parallelism while preserving input order on output
//! (`EnsureOrdered`-equivalent: results are always emitted in the order
//! their inputs arrived, even if a later item's work finishes first).

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::channel::{link, Source};
use crate::error::DataflowFault;

/// Wires a `Transform` block onto `input`, running `f` with up to
/// `parallelism` concurrent invocations, and returns the block's output
/// source. `capacity` bounds the output queue (the backpressure point for
/// whatever is downstream of this block).
pub fn transform<In, Out, F, Fut>(
    mut input: Source<In>,
    capacity: usize,
    parallelism: usize,
    f: F,
) -> Source<Out>
where
    In: Send + 'static,
    Out: Send + 'static,
    F: Fn(In) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Out, Arc<DataflowFault>>> + Send + 'static,
{
    let (target, source) = link(capacity);
    let f = Arc::new(f);
    let parallelism = parallelism.max(1);

    tokio::spawn(async move {
        let mut inflight: VecDeque<JoinHandle<Result<Out, Arc<DataflowFault>>>> = VecDeque::new();
        let mut upstream_done = false;

        loop {
            if !upstream_done && inflight.len() < parallelism {
                match input.recv().await {
                    Some(Ok(item)) => {
                        let f = f.clone();
                        inflight.push_back(tokio::spawn(async move { f(item).await }));
                        continue;
                    }
                    Some(Err(fault)) => {
                        target.fault(fault);
                        return;
                    }
                    None => upstream_done = true,
                }
            }

            let Some(handle) = inflight.pop_front() else {
                break;
            };

            match handle.await {
                Ok(Ok(out)) => {
                    if target.send(out).await.is_err() {
                        return;
                    }
                }
                Ok(Err(fault)) => {
                    target.fault(fault);
                    return;
                }
                Err(join_err) => {
                    target.fault(DataflowFault::from_display(join_err));
                    return;
                }
            }
        }

        target.complete();
    });

    source
}

/// A `Transform` whose mapping function cannot fail, for the common case
/// where the work is pure computation rather than something that can raise
/// `InferenceFailed` or similar.
pub fn transform_infallible<In, Out, F, Fut>(
    input: Source<In>,
    capacity: usize,
    parallelism: usize,
    f: F,
) -> Source<Out>
where
    In: Send + 'static,
    Out: Send + 'static,
    F: Fn(In) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Out> + Send + 'static,
{
    transform(input, capacity, parallelism, move |item| {
        let fut = f(item);
        async move { Ok(fut.await) }
    })
}
