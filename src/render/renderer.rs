//! Grid to bitmap rendering.

use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use super::atlas::GlyphAtlas;
use super::bitmap::{Bitmap, RenderBuffer, BLACK};
use super::error::RenderError;
use super::font::{BitmapFont, GlyphRasterizer};
use super::layout::Layout;
use super::thumbnail::draw_thumbnail;
use crate::ascii::{partition_rows, split_rows_mut, Grid};
use crate::pool::WorkerPool;

/// Draws destination pixel rows into one band of the target bitmap.
type BandDrawer = fn(&Grid, &GlyphAtlas, u32, usize, Range<usize>, &mut [u32]);

/// Tile-blits glyph masks into double-buffered bitmaps.
pub struct Renderer {
    layout: Layout,
    background: u32,
    rasterizer: Box<dyn GlyphRasterizer>,
    atlas: Option<GlyphAtlas>,
    atlas_builds: usize,
    buffer: RenderBuffer,
    pool: WorkerPool,
}

impl Renderer {
    /// Renderer using the built-in font on a black background.
    ///
    /// `workers == 0` means one band per CPU. Glyph masks are built by the
    /// first render.
    pub fn new(layout: Layout, workers: usize) -> Self {
        Self {
            layout,
            background: BLACK,
            rasterizer: Box::new(BitmapFont),
            atlas: None,
            atlas_builds: 0,
            buffer: RenderBuffer::new(),
            pool: WorkerPool::new("ascii-render", workers),
        }
    }

    pub fn with_background(mut self, background: u32) -> Self {
        self.background = background;
        self
    }

    /// Replace the glyph source. Masks from the old source are discarded.
    pub fn with_rasterizer(mut self, rasterizer: Box<dyn GlyphRasterizer>) -> Self {
        self.atlas = None;
        self.rasterizer = rasterizer;
        self
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Change the output size. Glyph masks follow on the next render.
    pub fn set_layout(&mut self, layout: Layout) {
        if layout != self.layout {
            log::debug!(
                "Render layout {}x{} -> {}x{}",
                self.layout.width(),
                self.layout.height(),
                layout.width(),
                layout.height()
            );
            self.layout = layout;
        }
    }

    pub fn background(&self) -> u32 {
        self.background
    }

    /// Number of times the glyph atlas has been built.
    pub fn atlas_builds(&self) -> usize {
        self.atlas_builds
    }

    /// The last successfully rendered bitmap.
    pub fn visible_bitmap(&self) -> Option<Arc<Bitmap>> {
        self.buffer.active()
    }

    pub fn is_running(&self) -> bool {
        self.pool.is_running()
    }

    /// Stop the worker threads. They are recreated by the next render.
    pub fn pause(&mut self) {
        self.pool.shutdown();
    }

    fn check_fits(&self, grid: &Grid) -> Result<(), RenderError> {
        let (max_rows, max_cols) = (self.layout.rows(), self.layout.columns());
        if grid.rows() > max_rows || grid.columns() > max_cols {
            return Err(RenderError::GridTooLarge {
                rows: grid.rows(),
                cols: grid.columns(),
                max_rows,
                max_cols,
            });
        }
        Ok(())
    }

    /// Render `grid` at full size and make it the visible bitmap.
    ///
    /// On failure the previous visible bitmap is kept.
    pub fn render_full(&mut self, grid: &Grid) -> Result<Arc<Bitmap>, RenderError> {
        self.render_with(grid, draw_band)
    }

    fn render_with(&mut self, grid: &Grid, draw: BandDrawer) -> Result<Arc<Bitmap>, RenderError> {
        let start = Instant::now();
        self.check_fits(grid)?;

        let cell = self.layout.cell();
        let atlas = match self.atlas.take() {
            Some(atlas) if atlas.matches(grid.palette(), cell) => atlas,
            _ => {
                self.atlas_builds += 1;
                GlyphAtlas::build(self.rasterizer.as_ref(), grid.palette(), cell)
            }
        };
        let atlas = self.atlas.insert(atlas);

        let (width, height) = (self.layout.width(), self.layout.height());
        let mut target = self.buffer.take_offscreen(width, height, self.background);

        let segments = partition_rows(height as usize, self.pool.worker_count());
        let bands = split_rows_mut(target.pixels_mut(), &segments, width as usize);
        let work: Vec<_> = segments.iter().cloned().zip(bands).collect();

        let atlas = &*atlas;
        let background = self.background;
        let failed = self.pool.run(work, |(rows, band)| {
            draw(grid, atlas, background, width as usize, rows, band)
        });
        if failed > 0 {
            log::warn!("{} of {} render bands failed", failed, segments.len());
            return Err(RenderError::SegmentFailed {
                failed,
                total: segments.len(),
            });
        }

        let bitmap = self.buffer.publish(target);
        log::trace!("Rendered {}x{} in {:?}", width, height, start.elapsed());
        Ok(bitmap)
    }

    /// Render the quarter-size block thumbnail of `grid`.
    pub fn render_thumbnail(&self, grid: &Grid) -> Result<Bitmap, RenderError> {
        self.check_fits(grid)?;
        let (width, height) = self.layout.thumbnail_size();
        Ok(draw_thumbnail(grid, width, height))
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("layout", &self.layout)
            .field("font", &self.rasterizer.name())
            .field("pool", &self.pool)
            .finish()
    }
}

/// Draw destination pixel rows `rows` into `band`.
///
/// `band` starts at row `rows.start` and already holds the background.
fn draw_band(
    grid: &Grid,
    atlas: &GlyphAtlas,
    background: u32,
    width: usize,
    rows: Range<usize>,
    band: &mut [u32],
) {
    let cell = atlas.cell();
    let (cw, ch) = (cell.width as usize, cell.height as usize);
    for (y, line) in rows.zip(band.chunks_exact_mut(width)) {
        let r = y / ch;
        if r >= grid.rows() {
            break;
        }
        let mask_y = y % ch;
        for c in 0..grid.columns() {
            let mask = atlas.mask_row(grid.glyph_index_at(r, c), mask_y);
            let color = grid.color_at(r, c);
            for (px, &m) in line[c * cw..(c + 1) * cw].iter_mut().zip(mask) {
                *px = if m != 0 { color } else { background };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii::{ColorKind, ColorMode, Palette};

    fn layout() -> Layout {
        Layout::new(70, 45).unwrap() // 10 x 5 cells
    }

    fn grid(rows: usize, cols: usize, glyph: u32) -> Grid {
        let mode = ColorMode::default_for(ColorKind::AnsiQuantized);
        Grid::from_parts(rows, cols, &mode, vec![glyph; rows * cols], Some(vec![0xffff_0000; rows * cols]))
            .unwrap()
    }

    #[test]
    fn test_blank_glyphs_render_background() {
        let mut renderer = Renderer::new(layout(), 2);
        let bitmap = renderer.render_full(&grid(5, 10, 0)).unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (70, 45));
        assert!(bitmap.pixels().iter().all(|&p| p == BLACK));
    }

    #[test]
    fn test_glyph_pixels_take_cell_color() {
        let mut renderer = Renderer::new(layout(), 2);
        let bitmap = renderer.render_full(&grid(5, 10, 6)).unwrap();
        let lit = bitmap.pixels().iter().filter(|&&p| p == 0xffff_0000).count();
        assert!(lit > 0);
        assert!(bitmap.pixels().iter().all(|&p| p == 0xffff_0000 || p == BLACK));
    }

    #[test]
    fn test_area_outside_grid_is_background() {
        let mut renderer = Renderer::new(layout(), 1).with_background(0xff00_00ff);
        let bitmap = renderer.render_full(&grid(2, 3, 6)).unwrap();
        // Right of column 3 and below row 2
        assert_eq!(bitmap.pixel(69, 0), 0xff00_00ff);
        assert_eq!(bitmap.pixel(0, 44), 0xff00_00ff);
    }

    #[test]
    fn test_grid_too_large() {
        let mut renderer = Renderer::new(layout(), 1);
        let err = renderer.render_full(&grid(6, 10, 0)).unwrap_err();
        assert!(matches!(err, RenderError::GridTooLarge { rows: 6, max_rows: 5, .. }));
        assert!(renderer.visible_bitmap().is_none());
        assert!(renderer.render_thumbnail(&grid(5, 11, 0)).is_err());
    }

    #[test]
    fn test_same_output_for_any_worker_count() {
        let g = grid(5, 10, 4);
        let expected = Renderer::new(layout(), 1).render_full(&g).unwrap();
        for workers in 2..6 {
            let bitmap = Renderer::new(layout(), workers).render_full(&g).unwrap();
            assert_eq!(*bitmap, *expected, "workers {}", workers);
        }
    }

    #[test]
    fn test_atlas_rebuilt_only_on_change() {
        let mut renderer = Renderer::new(layout(), 1);
        assert_eq!(renderer.atlas_builds(), 0);
        renderer.render_full(&grid(5, 10, 1)).unwrap();
        renderer.render_full(&grid(5, 10, 2)).unwrap();
        assert_eq!(renderer.atlas_builds(), 1);

        let mode = ColorMode::with_palette(ColorKind::None, Palette::new("#").unwrap());
        let other = Grid::from_parts(1, 1, &mode, vec![0], None).unwrap();
        renderer.render_full(&other).unwrap();
        assert_eq!(renderer.atlas_builds(), 2);

        renderer.set_layout(Layout::new(1400, 900).unwrap());
        renderer.render_full(&other).unwrap();
        assert_eq!(renderer.atlas_builds(), 3);
    }

    #[test]
    fn test_rasterizer_swap_builds_once() {
        let mut renderer = Renderer::new(layout(), 1).with_rasterizer(Box::new(BitmapFont));
        assert_eq!(renderer.atlas_builds(), 0);
        renderer.render_full(&grid(5, 10, 6)).unwrap();
        assert_eq!(renderer.atlas_builds(), 1);

        // Swapping after a render drops the old masks
        let mut renderer = renderer.with_rasterizer(Box::new(BitmapFont));
        renderer.render_full(&grid(5, 10, 6)).unwrap();
        assert_eq!(renderer.atlas_builds(), 2);
    }

    fn draw_band_except_first(
        grid: &Grid,
        atlas: &GlyphAtlas,
        background: u32,
        width: usize,
        rows: Range<usize>,
        band: &mut [u32],
    ) {
        if rows.start == 0 {
            panic!("band at row 0 failed");
        }
        draw_band(grid, atlas, background, width, rows, band)
    }

    #[test]
    fn test_failed_band_keeps_visible_bitmap() {
        let mut renderer = Renderer::new(layout(), 3);
        let first = renderer.render_full(&grid(5, 10, 6)).unwrap();
        let snapshot = first.pixels().to_vec();

        let err = renderer
            .render_with(&grid(5, 10, 0), draw_band_except_first)
            .unwrap_err();
        assert!(matches!(err, RenderError::SegmentFailed { failed: 1, total: 3 }));
        let visible = renderer.visible_bitmap().unwrap();
        assert!(Arc::ptr_eq(&visible, &first));
        assert_eq!(visible.pixels(), snapshot.as_slice());

        // The next clean render publishes normally
        let next = renderer.render_full(&grid(5, 10, 0)).unwrap();
        assert!(next.pixels().iter().all(|&p| p == BLACK));
        assert!(Arc::ptr_eq(&renderer.visible_bitmap().unwrap(), &next));
    }

    #[test]
    fn test_double_buffer_keeps_previous() {
        let mut renderer = Renderer::new(layout(), 1);
        let first = renderer.render_full(&grid(5, 10, 6)).unwrap();
        let second = renderer.render_full(&grid(5, 10, 0)).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(first.pixels().iter().any(|&p| p != BLACK));
        assert!(Arc::ptr_eq(&renderer.visible_bitmap().unwrap(), &second));
    }

    #[test]
    fn test_thumbnail_size() {
        let renderer = Renderer::new(Layout::new(640, 400).unwrap(), 1);
        let thumb = renderer.render_thumbnail(&grid(44, 91, 3)).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (160, 100));
    }
}
