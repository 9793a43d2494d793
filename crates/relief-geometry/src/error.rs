use thiserror::Error;

/// Geometry errors are intentionally narrow: per-candidate degeneracy is
/// absorbed silently inside `extract_boxes` (a dropped candidate is not an
/// error), so this enum only covers malformed calls into the crate.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("relief map dimensions do not match source size: map is {map_w}x{map_h}, source is {src_w}x{src_h}")]
    DimensionMismatch {
        map_w: usize,
        map_h: usize,
        src_w: u32,
        src_h: u32,
    },

    #[error("empty image passed to crop")]
    EmptyImage,
}

pub type Result<T> = std::result::Result<T, GeometryError>;
