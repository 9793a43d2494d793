//! The bounded target/source pair every block is built from. Closing a
//! `Target` (dropping it, or calling `complete`) is the completion signal:
//! the paired `Source` drains whatever is already queued, then returns
//! `None`. Calling `fault` poisons the pair so the `Source` reports the
//! fault instead of a clean end-of-stream once draining finishes.

use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;

use crate::error::{BlockError, DataflowFault};

#[derive(Clone)]
struct FaultCell(Arc<RwLock<Option<Arc<DataflowFault>>>>);

impl FaultCell {
    fn new() -> Self {
        Self(Arc::new(RwLock::new(None)))
    }

    fn set(&self, fault: Arc<DataflowFault>) {
        let mut guard = self.0.write().expect("fault cell lock poisoned");
        if guard.is_none() {
            *guard = Some(fault);
        }
    }

    fn get(&self) -> Option<Arc<DataflowFault>> {
        self.0.read().expect("fault cell lock poisoned").clone()
    }
}

pub struct Target<T> {
    tx: mpsc::Sender<T>,
    fault: FaultCell,
}

impl<T> Clone for Target<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            fault: self.fault.clone(),
        }
    }
}

impl<T> Target<T> {
    /// Bounded, backpressure-respecting send. Suspends while the target
    /// queue is full.
    pub async fn send(&self, item: T) -> Result<(), BlockError> {
        if let Some(fault) = self.fault.get() {
            return Err(fault.into());
        }
        self.tx.send(item).await.map_err(|_| BlockError::Closed)
    }

    /// Poisons the block: the paired source will report this fault (instead
    /// of a clean completion) once any already-buffered items are drained.
    pub fn fault(&self, fault: Arc<DataflowFault>) {
        self.fault.set(fault);
    }

    /// Marks the target complete. Consumes the sender; the paired source
    /// observes end-of-stream after draining whatever was already queued.
    pub fn complete(self) {
        drop(self.tx);
    }
}

pub struct Source<T> {
    rx: mpsc::Receiver<T>,
    fault: FaultCell,
}

impl<T> Source<T> {
    /// `None` means the upstream target completed cleanly and the queue is
    /// drained. `Some(Err(fault))` means it completed because of a fault.
    pub async fn recv(&mut self) -> Option<Result<T, Arc<DataflowFault>>> {
        match self.rx.recv().await {
            Some(item) => Some(Ok(item)),
            None => self.fault.get().map(Err),
        }
    }

    /// Lets a downstream block propagate an upstream fault onto its own
    /// output without having consumed an item first.
    pub fn fault(&self) -> Option<Arc<DataflowFault>> {
        self.fault.get()
    }
}

/// The `Buffer` primitive: a bounded queue with no transform, decoupling a
/// producer's pace from a consumer's.
pub fn link<T>(capacity: usize) -> (Target<T>, Source<T>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let fault = FaultCell::new();
    (
        Target {
            tx,
            fault: fault.clone(),
        },
        Source { rx, fault },
    )
}
