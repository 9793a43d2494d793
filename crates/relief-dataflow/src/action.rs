//! The `Action` (1→void) primitive: a terminal sink, typically used to
//! collect results into a side channel.

use std::future::Future;
use std::sync::Arc;

use crate::channel::Source;
use crate::error::DataflowFault;

/// Runs `f` once per item from `input` until completion or fault. Returns a
/// handle resolving to `Ok(())` on clean completion or `Err(fault)` if the
/// upstream or `f` itself faulted.
pub fn action<In, F, Fut>(mut input: Source<In>, f: F) -> tokio::task::JoinHandle<Result<(), Arc<DataflowFault>>>
where
    In: Send + 'static,
    F: Fn(In) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Arc<DataflowFault>>> + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            match input.recv().await {
                Some(Ok(item)) => f(item).await?,
                Some(Err(fault)) => return Err(fault),
                None => return Ok(()),
            }
        }
    })
}
