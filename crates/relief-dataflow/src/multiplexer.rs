//! Lets many concurrent callers share one long-lived pipeline as if each had
//! exclusive access, correlating submissions to results by a monotonic
//! sequence number.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{oneshot, Mutex, Notify, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::channel::{Source, Target};
use crate::error::DataflowFault;

/// The error every pending caller sees when the shared pipeline dies, or
/// when a caller's own submission is cancelled.
#[derive(Debug, Clone, Error)]
pub enum MultiplexerFault {
    #[error("operation cancelled")]
    Cancelled,
    #[error("pipeline faulted: {0}")]
    Pipeline(Arc<DataflowFault>),
    #[error("pipeline disposed")]
    Disposed,
}

enum PipelineState {
    Alive,
    Faulted(Arc<DataflowFault>),
    Disposed,
}

type PendingMap<Out> = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Out, MultiplexerFault>>>>>;

/// Wraps a pipeline's tagged target/source pair (`(seq, In)` in, `(seq,
/// Out)` out — the pipeline itself is responsible for carrying the tag
/// through unchanged) with request/response correlation.
pub struct Multiplexer<In, Out> {
    target: Target<(u64, In)>,
    next_seq: AtomicU64,
    pending: PendingMap<Out>,
    state: Arc<RwLock<PipelineState>>,
    drained: Arc<Notify>,
    reader: JoinHandle<()>,
}

impl<In, Out> Multiplexer<In, Out>
where
    In: Send + 'static,
    Out: Send + 'static,
{
    /// `pipeline_target`/`pipeline_source` are the tagged ends of an
    /// already-wired pipeline (built from `relief-dataflow` blocks, whose
    /// ordering guarantee is what makes the sequence-number correlation
    /// below correct).
    pub fn new(pipeline_target: Target<(u64, In)>, pipeline_source: Source<(u64, Out)>) -> Self {
        let pending: PendingMap<Out> = Arc::new(Mutex::new(HashMap::new()));
        let state = Arc::new(RwLock::new(PipelineState::Alive));
        let drained = Arc::new(Notify::new());
        let reader = spawn_reader(pipeline_source, pending.clone(), state.clone(), drained.clone());
        Self {
            target: pipeline_target,
            next_seq: AtomicU64::new(0),
            pending,
            state,
            drained,
            reader,
        }
    }

    /// Hands out a cloned raw target for composing this multiplexer's
    /// pipeline with further upstream blocks, bypassing the oneshot
    /// correlation layer. Callers using this path are responsible for their
    /// own tagging discipline.
    pub fn raw_target(&self) -> Target<(u64, In)> {
        self.target.clone()
    }

    async fn current_fault(&self) -> Option<MultiplexerFault> {
        match &*self.state.read().await {
            PipelineState::Alive => None,
            PipelineState::Faulted(f) => Some(MultiplexerFault::Pipeline(f.clone())),
            PipelineState::Disposed => Some(MultiplexerFault::Disposed),
        }
    }

    /// Outer future resolves once `input` has been accepted by the
    /// pipeline; the inner future it returns resolves with the result.
    /// `caller_cancel` fired before acceptance cancels the submission;
    /// fired after, it is ignored (the pipeline finishes the work).
    /// `pipeline_cancel` is a shared shutdown signal: firing it faults this
    /// and every other pending submission.
    pub async fn process_one(
        &self,
        input: In,
        caller_cancel: CancellationToken,
        pipeline_cancel: CancellationToken,
    ) -> Result<impl Future<Output = Result<Out, MultiplexerFault>>, MultiplexerFault> {
        if let Some(fault) = self.current_fault().await {
            return Err(fault);
        }
        if caller_cancel.is_cancelled() {
            return Err(MultiplexerFault::Cancelled);
        }

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(seq, tx);

        tokio::select! {
            biased;
            _ = caller_cancel.cancelled() => {
                self.pending.lock().await.remove(&seq);
                self.notify_if_drained().await;
                return Err(MultiplexerFault::Cancelled);
            }
            _ = pipeline_cancel.cancelled() => {
                self.fault_all(MultiplexerFault::Cancelled).await;
                return Err(MultiplexerFault::Cancelled);
            }
            result = self.target.send((seq, input)) => {
                if result.is_err() {
                    self.pending.lock().await.remove(&seq);
                    let fault = self.current_fault().await.unwrap_or(MultiplexerFault::Disposed);
                    return Err(fault);
                }
            }
        }

        Ok(async move {
            match rx.await {
                Ok(result) => result,
                Err(_) => Err(MultiplexerFault::Disposed),
            }
        })
    }

    /// Preserves caller-local ordering: the returned vector's `i`-th entry
    /// corresponds to `inputs[i]`, regardless of per-item latency variance.
    pub async fn process_many(
        &self,
        inputs: Vec<In>,
        caller_cancel: CancellationToken,
        pipeline_cancel: CancellationToken,
    ) -> Result<impl Future<Output = Result<Vec<Out>, MultiplexerFault>>, MultiplexerFault> {
        let mut inners = Vec::with_capacity(inputs.len());
        for input in inputs {
            let inner = self
                .process_one(input, caller_cancel.clone(), pipeline_cancel.clone())
                .await?;
            inners.push(inner);
        }
        Ok(async move {
            let mut results = Vec::with_capacity(inners.len());
            for inner in inners {
                results.push(inner.await?);
            }
            Ok(results)
        })
    }

    async fn fault_all(&self, fault: MultiplexerFault) {
        *self.state.write().await = match &fault {
            MultiplexerFault::Pipeline(f) => PipelineState::Faulted(f.clone()),
            _ => PipelineState::Faulted(DataflowFault::from_display("pipeline cancelled")),
        };
        let mut pending = self.pending.lock().await;
        for (_, tx) in pending.drain() {
            let _ = tx.send(Err(fault.clone()));
        }
    }

    async fn notify_if_drained(&self) {
        if self.pending.lock().await.is_empty() {
            self.drained.notify_waiters();
        }
    }

    /// Awaits all accepted items, then marks the pipeline complete.
    pub async fn dispose(self) {
        loop {
            // Register interest before checking, not after: `Notify`
            // associates a `notified()` future with whatever
            // `notify_waiters()` calls happen from here onward, so a
            // drain that completes between the check and the await below
            // is still observed instead of losing the wakeup.
            let notified = self.drained.notified();
            if self.pending.lock().await.is_empty() {
                break;
            }
            notified.await;
        }
        self.target.complete();
        let _ = self.reader.await;
    }
}

fn spawn_reader<Out>(
    mut pipeline_source: Source<(u64, Out)>,
    pending: PendingMap<Out>,
    state: Arc<RwLock<PipelineState>>,
    drained: Arc<Notify>,
) -> JoinHandle<()>
where
    Out: Send + 'static,
{
    tokio::spawn(async move {
        loop {
            match pipeline_source.recv().await {
                Some(Ok((seq, out))) => {
                    let mut pending = pending.lock().await;
                    if let Some(tx) = pending.remove(&seq) {
                        let _ = tx.send(Ok(out));
                    }
                    if pending.is_empty() {
                        drained.notify_waiters();
                    }
                }
                Some(Err(fault)) => {
                    warn!(%fault, pending = pending.lock().await.len(), "pipeline faulted, failing pending callers");
                    *state.write().await = PipelineState::Faulted(fault.clone());
                    let mut pending = pending.lock().await;
                    for (_, tx) in pending.drain() {
                        let _ = tx.send(Err(MultiplexerFault::Pipeline(fault.clone())));
                    }
                    drained.notify_waiters();
                    return;
                }
                None => {
                    *state.write().await = PipelineState::Disposed;
                    let mut pending = pending.lock().await;
                    for (_, tx) in pending.drain() {
                        let _ = tx.send(Err(MultiplexerFault::Disposed));
                    }
                    drained.notify_waiters();
                    return;
                }
            }
        }
    })
}
