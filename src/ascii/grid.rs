//! The character grid produced by conversion.

use super::palette::{ColorKind, ColorMode, Palette};

/// Color reported for cells of a monochrome grid.
pub const MONOCHROME_COLOR: u32 = 0xffff_ffff;

/// Per-frame glyph indices and colors, reused across frames.
///
/// Arrays are flat, row-major (`row * columns + col`). They are reallocated
/// only when `rows * columns` changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    columns: usize,
    kind: ColorKind,
    palette: Palette,
    glyphs: Vec<u32>,
    colors: Option<Vec<u32>>,
}

impl Grid {
    /// An empty grid. Conversion sizes it on first use.
    pub fn new() -> Self {
        let mode = ColorMode::default_for(ColorKind::None);
        Self {
            rows: 0,
            columns: 0,
            kind: ColorKind::None,
            palette: mode.palette().clone(),
            glyphs: Vec::new(),
            colors: None,
        }
    }

    /// Build a grid directly from index and color arrays.
    ///
    /// Returns `None` if the array lengths don't match `rows * columns`,
    /// if an index is outside the palette, or if colors are missing for a
    /// colored kind.
    pub fn from_parts(
        rows: usize,
        columns: usize,
        mode: &ColorMode,
        glyphs: Vec<u32>,
        colors: Option<Vec<u32>>,
    ) -> Option<Self> {
        let cells = rows * columns;
        let palette_len = mode.palette().len() as u32;
        if glyphs.len() != cells || glyphs.iter().any(|&g| g >= palette_len) {
            return None;
        }
        let colors = match (mode.kind(), colors) {
            (ColorKind::None, _) => None,
            (_, Some(c)) if c.len() == cells => Some(c),
            _ => return None,
        };
        Some(Self {
            rows,
            columns,
            kind: mode.kind(),
            palette: mode.palette().clone(),
            glyphs,
            colors,
        })
    }

    /// Size the arrays for a conversion. Only called once the call's inputs
    /// have been validated.
    pub(crate) fn prepare(&mut self, rows: usize, columns: usize, mode: &ColorMode) {
        let cells = rows * columns;
        if self.glyphs.len() != cells {
            self.glyphs = vec![0; cells];
        }
        if mode.kind() == ColorKind::None {
            self.colors = None;
        } else if !matches!(&self.colors, Some(colors) if colors.len() == cells) {
            self.colors = Some(vec![MONOCHROME_COLOR; cells]);
        }
        self.rows = rows;
        self.columns = columns;
        self.kind = mode.kind();
        if self.palette != *mode.palette() {
            self.palette = mode.palette().clone();
        }
    }

    /// Mutable access to both arrays for the conversion workers.
    pub(crate) fn buffers_mut(&mut self) -> (&mut [u32], Option<&mut [u32]>) {
        (&mut self.glyphs, self.colors.as_deref_mut())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn color_kind(&self) -> ColorKind {
        self.kind
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Flat glyph index array.
    pub fn glyph_indices(&self) -> &[u32] {
        &self.glyphs
    }

    /// Flat packed ARGB array, absent for monochrome grids.
    pub fn colors(&self) -> Option<&[u32]> {
        self.colors.as_deref()
    }

    pub fn glyph_index_at(&self, row: usize, col: usize) -> u32 {
        self.glyphs[row * self.columns + col]
    }

    pub fn glyph_at(&self, row: usize, col: usize) -> char {
        self.palette.glyph(self.glyph_index_at(row, col))
    }

    /// Packed ARGB color of a cell; opaque white for monochrome grids.
    pub fn color_at(&self, row: usize, col: usize) -> u32 {
        match &self.colors {
            Some(colors) => colors[row * self.columns + col],
            None => MONOCHROME_COLOR,
        }
    }

    /// Glyph index as a fraction of the palette length, in `[0, 1)`.
    pub fn brightness_ratio_at(&self, row: usize, col: usize) -> f32 {
        self.glyph_index_at(row, col) as f32 / self.palette.len() as f32
    }

    /// Rotate by 180 degrees: both arrays are reversed end-to-end.
    pub fn rotate_180(&mut self) {
        self.glyphs.reverse();
        if let Some(colors) = &mut self.colors {
            colors.reverse();
        }
    }

    /// Lines of glyphs, one string per row.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.rows).map(move |r| (0..self.columns).map(|c| self.glyph_at(r, c)).collect())
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
