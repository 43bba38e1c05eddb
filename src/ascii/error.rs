//! Error types for grid conversion.

use thiserror::Error;

use crate::camera::FrameError;

/// Errors building a palette.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("palette must contain at least one glyph")]
    Empty,
}

/// Errors that can occur during a conversion call.
///
/// All variants except `SegmentFailed` are raised before any cell is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("grid size must be non-zero, got {rows} rows x {cols} columns")]
    InvalidGridSize { rows: usize, cols: usize },
    #[error("invalid frame: {0}")]
    InvalidFrame(#[from] FrameError),
    /// Cells of the failed segments keep their previous values.
    #[error("{failed} of {total} row segments failed")]
    SegmentFailed { failed: usize, total: usize },
}
