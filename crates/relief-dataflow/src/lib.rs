//! A small typed dataflow toolkit: bounded, backpressured blocks that
//! compose into pipelines, plus a multiplexer for sharing one pipeline
//! across concurrent callers.

pub mod action;
pub mod channel;
pub mod error;
pub mod fork_join;
pub mod merge;
pub mod multiplexer;
pub mod split;
pub mod transform;

pub use action::action;
pub use channel::{link, Source, Target};
pub use error::{BlockError, DataflowFault};
pub use fork_join::fork_join;
pub use merge::merge;
pub use multiplexer::{Multiplexer, MultiplexerFault};
pub use split::split;
pub use transform::{transform, transform_infallible};
