//! Turns a detector's raw per-pixel probability map into an ordered list of
//! oriented text bounding boxes, and crops word regions out of the source
//! image once boxes are known.
//!
//! This crate is pure computation: no model runtime, no I/O beyond the
//! `image` crate's in-memory buffers. Every stage of the pipeline (§4.1)
//! lives in its own module so each can be tested independently of the
//! others.

pub mod binarize;
pub mod boundary;
pub mod crop;
pub mod error;
pub mod hull;
pub mod min_rect;
pub mod morphology;
pub mod offset;
pub mod pipeline;
pub mod score;
pub mod simplify;
pub mod types;

pub use crop::crop as crop_image;
pub use error::{GeometryError, Result};
pub use pipeline::extract_boxes;
pub use types::{ConvexHull, Point, Polygon, ReliefMap, RotatedRect, TextBoundary};
