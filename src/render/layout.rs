//! Output image sizing and glyph cell dimensions.

use super::error::RenderError;

/// Glyph cell width at scale 1.
pub const BASE_CELL_WIDTH: u32 = 7;
/// Glyph cell height at scale 1.
pub const BASE_CELL_HEIGHT: u32 = 9;

/// Pixel size of one glyph cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

impl CellSize {
    /// Cell size for an output image `width` pixels wide.
    ///
    /// Scale factor is 1 up to 1199 px, 2 up to 1999 px, and so on.
    pub fn for_output_width(width: u32) -> Self {
        let scale = (width.saturating_add(400) / 800).max(1);
        Self {
            width: BASE_CELL_WIDTH * scale,
            height: BASE_CELL_HEIGHT * scale,
        }
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for CellSize {
    fn default() -> Self {
        Self {
            width: BASE_CELL_WIDTH,
            height: BASE_CELL_HEIGHT,
        }
    }
}

/// Output image size and the grid that fills it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    width: u32,
    height: u32,
    cell: CellSize,
}

impl Layout {
    /// Layout for an output image of exactly `width` x `height` pixels.
    ///
    /// Fails if not even one glyph cell fits.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let cell = CellSize::for_output_width(width);
        if width < cell.width || height < cell.height {
            return Err(RenderError::EmptyLayout {
                width,
                height,
                cell_width: cell.width,
                cell_height: cell.height,
            });
        }
        Ok(Self {
            width,
            height,
            cell,
        })
    }

    /// Largest layout inside `max_width` x `max_height` with the aspect ratio
    /// of a `source_width` x `source_height` frame.
    pub fn fit(
        max_width: u32,
        max_height: u32,
        source_width: u32,
        source_height: u32,
    ) -> Result<Self, RenderError> {
        if source_width == 0 || source_height == 0 || max_width == 0 || max_height == 0 {
            return Self::new(0, 0);
        }
        let (sw, sh) = (source_width as u64, source_height as u64);
        let (mw, mh) = (max_width as u64, max_height as u64);
        // Compare sw/sh < mw/mh without floats
        let (width, height) = if sw * mh < mw * sh {
            (mh * sw / sh, mh)
        } else {
            (mw, mw * sh / sw)
        };
        Self::new(width as u32, height as u32)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell(&self) -> CellSize {
        self.cell
    }

    /// Grid rows that fit the output height. Always at least 1.
    pub fn rows(&self) -> usize {
        (self.height / self.cell.height) as usize
    }

    /// Grid columns that fit the output width. Always at least 1.
    pub fn columns(&self) -> usize {
        (self.width / self.cell.width) as usize
    }

    /// Thumbnail size: a quarter of the output in each dimension.
    pub fn thumbnail_size(&self) -> (u32, u32) {
        (self.width / 4, self.height / 4)
    }
}
