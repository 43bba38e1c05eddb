//! Frame to character grid conversion.
//!
//! The pipeline for one frame:
//!
//! 1. **Validation** - grid size and frame buffer length are checked up front
//! 2. **Partitioning** - output rows are split into one segment per worker
//! 3. **Sampling** - a [`PixelKernel`] averages luma (and color) per cell
//! 4. **Quantization** - the [`ColorMode`] reduces each cell color
//! 5. **Orientation** - the grid is reversed for upside-down sensors
//!
//! # Color Modes
//!
//! - `None` - glyphs only, default ramp `" .:oO8@"`
//! - `AnsiQuantized` - each channel forced to 0 or max, same ramp
//! - `FullColor` - hue kept, brightness carried by glyph `"O8@"`

mod color;
mod converter;
mod error;
mod grid;
mod kernel;
mod palette;
mod segment;

pub use color::{luminance, pack_argb, pack_argb18, unpack_rgb, yuv_to_rgb18, MAX_COLOR_18, MAX_COLOR_8};
pub use converter::{ConvertStats, Converter, ConverterSettings};
pub use error::{ConvertError, PaletteError};
pub use grid::{Grid, MONOCHROME_COLOR};
pub use kernel::{
    cell_span, select_kernel, AcceleratedKernel, Capability, PixelKernel, PortableKernel,
    SampleJob, SegmentOutput,
};
pub use palette::{
    normalize_full, quantize_ansi, ColorKind, ColorMode, Palette, Quantizer, DEFAULT_CHARS,
    FULL_COLOR_CHARS,
};
pub use segment::{partition_rows, split_rows_mut};
