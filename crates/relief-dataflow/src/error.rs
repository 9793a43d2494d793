use std::sync::Arc;

use thiserror::Error;

/// A fault that has poisoned a block: every pending and future item on that
/// block's target is rejected with the same fault, and its source completes
/// faulted rather than empty.
#[derive(Debug, Error, Clone)]
pub enum DataflowFault {
    #[error("block faulted: {0}")]
    Block(String),
}

impl DataflowFault {
    pub fn from_display(err: impl std::fmt::Display) -> Arc<Self> {
        Arc::new(DataflowFault::Block(err.to_string()))
    }
}

/// Errors a caller can observe while pushing into or pulling from a block.
#[derive(Debug, Error, Clone)]
pub enum BlockError {
    #[error("operation cancelled")]
    Cancelled,
    #[error("{0}")]
    Faulted(Arc<DataflowFault>),
    #[error("target is closed")]
    Closed,
}

impl From<Arc<DataflowFault>> for BlockError {
    fn from(fault: Arc<DataflowFault>) -> Self {
        BlockError::Faulted(fault)
    }
}
