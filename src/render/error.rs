use std::path::PathBuf;

use thiserror::Error;

/// Errors from layout, font loading and rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("layout {width}x{height} has no room for a single {cell_width}x{cell_height} cell")]
    EmptyLayout {
        width: u32,
        height: u32,
        cell_width: u32,
        cell_height: u32,
    },
    #[error("grid of {rows}x{cols} cells does not fit layout of {max_rows}x{max_cols} cells")]
    GridTooLarge {
        rows: usize,
        cols: usize,
        max_rows: usize,
        max_cols: usize,
    },
    #[error("failed to read font {}: {}", .path.display(), .source)]
    FontIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse font {}: {}", .path.display(), .message)]
    FontParse { path: PathBuf, message: String },
    /// The previous bitmap stays visible.
    #[error("{failed} of {total} row bands failed to render")]
    SegmentFailed { failed: usize, total: usize },
}
