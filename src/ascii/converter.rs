//! Frame to grid conversion.

use std::time::{Duration, Instant};

use super::error::ConvertError;
use super::grid::Grid;
use super::kernel::{select_kernel, Capability, PixelKernel, SampleJob, SegmentOutput};
use super::palette::ColorMode;
use super::segment::{partition_rows, split_rows_mut};
use crate::camera::{Frame, Orientation};
use crate::pool::WorkerPool;

/// Converter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConverterSettings {
    /// Number of row segments per frame; 0 = one per CPU
    pub workers: usize,
    /// Use the accelerated kernel when the CPU supports it
    pub accelerated: bool,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            workers: 0,
            accelerated: true,
        }
    }
}

/// Timing for one conversion call.
#[derive(Debug, Clone, Copy)]
pub struct ConvertStats {
    pub segments: usize,
    pub elapsed: Duration,
    pub kernel: &'static str,
}

/// Converts frames to glyph grids on a pool of row workers.
///
/// Only one frame may be converted at a time per converter; `&mut self`
/// enforces this.
pub struct Converter {
    pool: WorkerPool,
    kernel: Box<dyn PixelKernel>,
}

impl Converter {
    pub fn new(settings: ConverterSettings) -> Self {
        let capability = if settings.accelerated {
            Capability::detect()
        } else {
            Capability::Portable
        };
        Self::with_kernel(settings.workers, select_kernel(capability))
    }

    /// Build a converter around a specific kernel.
    pub fn with_kernel(workers: usize, kernel: Box<dyn PixelKernel>) -> Self {
        let pool = WorkerPool::new("ascii-convert", workers);
        log::debug!(
            "Converter using {} kernel, {} workers",
            kernel.name(),
            pool.worker_count()
        );
        Self { pool, kernel }
    }

    pub fn kernel_name(&self) -> &'static str {
        self.kernel.name()
    }

    pub fn worker_count(&self) -> usize {
        self.pool.worker_count()
    }

    pub fn is_running(&self) -> bool {
        self.pool.is_running()
    }

    /// Stop the worker threads. They are recreated by the next conversion.
    pub fn pause(&mut self) {
        self.pool.shutdown();
    }

    /// Convert `frame` into `grid` with `rows` x `cols` cells.
    ///
    /// Invalid sizes or a malformed frame are rejected before `grid` is
    /// touched. If a segment fails, its cells keep their previous values and
    /// `ConvertError::SegmentFailed` is returned; the rest of the grid is
    /// written.
    pub fn compute_grid(
        &mut self,
        frame: &Frame<'_>,
        rows: usize,
        cols: usize,
        mode: &ColorMode,
        orientation: Orientation,
        grid: &mut Grid,
    ) -> Result<ConvertStats, ConvertError> {
        let start = Instant::now();
        if rows == 0 || cols == 0 {
            return Err(ConvertError::InvalidGridSize { rows, cols });
        }
        frame.validate()?;

        grid.prepare(rows, cols, mode);
        let segments = partition_rows(rows, self.pool.worker_count());
        let job = SampleJob {
            frame: *frame,
            rows,
            cols,
            palette: mode.palette(),
            quantizer: mode.quantizer(),
        };

        let (glyphs, colors) = grid.buffers_mut();
        let glyph_parts = split_rows_mut(glyphs, &segments, cols);
        let outputs: Vec<SegmentOutput<'_>> = match colors {
            Some(colors) => {
                let color_parts = split_rows_mut(colors, &segments, cols);
                segments
                    .iter()
                    .zip(glyph_parts)
                    .zip(color_parts)
                    .map(|((rows, glyphs), colors)| SegmentOutput {
                        rows: rows.clone(),
                        glyphs,
                        colors: Some(colors),
                    })
                    .collect()
            }
            None => segments
                .iter()
                .zip(glyph_parts)
                .map(|(rows, glyphs)| SegmentOutput {
                    rows: rows.clone(),
                    glyphs,
                    colors: None,
                })
                .collect(),
        };

        let kernel = &*self.kernel;
        let failed = self
            .pool
            .run(outputs, |out| kernel.convert_segment(&job, out));
        if failed > 0 {
            log::warn!("{} of {} segments failed", failed, segments.len());
            return Err(ConvertError::SegmentFailed {
                failed,
                total: segments.len(),
            });
        }

        if orientation == Orientation::Rotated180 {
            grid.rotate_180();
        }

        let stats = ConvertStats {
            segments: segments.len(),
            elapsed: start.elapsed(),
            kernel: kernel.name(),
        };
        log::trace!(
            "Converted {}x{} frame to {}x{} grid in {:?}",
            frame.width,
            frame.height,
            cols,
            rows,
            stats.elapsed
        );
        Ok(stats)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConverterSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii::palette::ColorKind;
    use crate::camera::{gradient_nv21, solid_nv21};

    #[test]
    fn test_rejects_zero_rows_without_touching_grid() {
        let frame = solid_nv21(8, 8, 200, 128, 128);
        let mut converter = Converter::default();
        let mut grid = Grid::new();
        let mode = ColorMode::default_for(ColorKind::None);
        converter
            .compute_grid(&frame.view(), 2, 2, &mode, Orientation::Normal, &mut grid)
            .unwrap();
        let before = grid.clone();

        let err = converter
            .compute_grid(&frame.view(), 0, 2, &mode, Orientation::Normal, &mut grid)
            .unwrap_err();
        assert_eq!(err, ConvertError::InvalidGridSize { rows: 0, cols: 2 });
        assert_eq!(grid, before);
    }

    #[test]
    fn test_rejects_short_buffer() {
        let frame = solid_nv21(8, 8, 200, 128, 128);
        let data = &frame.data[..frame.data.len() - 1];
        let mut converter = Converter::default();
        let mut grid = Grid::new();
        let err = converter
            .compute_grid(
                &Frame::nv21(data, 8, 8),
                2,
                2,
                &ColorMode::default(),
                Orientation::Normal,
                &mut grid,
            )
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidFrame(_)));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_rotation_matches_manual_reverse() {
        let frame = gradient_nv21(120, 80, 0);
        let mode = ColorMode::default_for(ColorKind::FullColor);
        let mut converter = Converter::default();
        let mut normal = Grid::new();
        let mut rotated = Grid::new();
        converter
            .compute_grid(&frame.view(), 10, 15, &mode, Orientation::Normal, &mut normal)
            .unwrap();
        converter
            .compute_grid(&frame.view(), 10, 15, &mode, Orientation::Rotated180, &mut rotated)
            .unwrap();
        normal.rotate_180();
        assert_eq!(normal, rotated);
    }

    #[test]
    fn test_pause_and_resume() {
        let frame = gradient_nv21(64, 64, 1);
        let mode = ColorMode::default();
        let mut converter = Converter::with_kernel(2, select_kernel(Capability::Portable));
        let mut grid = Grid::new();
        converter
            .compute_grid(&frame.view(), 8, 8, &mode, Orientation::Normal, &mut grid)
            .unwrap();
        assert!(converter.is_running());
        converter.pause();
        assert!(!converter.is_running());
        let first = grid.clone();
        converter
            .compute_grid(&frame.view(), 8, 8, &mode, Orientation::Normal, &mut grid)
            .unwrap();
        assert!(converter.is_running());
        assert_eq!(grid, first);
    }

    #[test]
    fn test_stats() {
        let frame = gradient_nv21(64, 64, 1);
        let mut converter = Converter::with_kernel(4, select_kernel(Capability::Portable));
        let mut grid = Grid::new();
        let stats = converter
            .compute_grid(&frame.view(), 3, 8, &ColorMode::default(), Orientation::Normal, &mut grid)
            .unwrap();
        // 4 workers over 3 rows: one range is empty and dropped
        assert_eq!(stats.segments, 3);
        assert_eq!(stats.kernel, "portable");
    }
}
