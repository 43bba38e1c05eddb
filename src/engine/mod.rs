//! Real-time frame processing.
//!
//! [`LiveEngine`] owns a converter, a renderer and the grids they share.
//! Frames arrive one at a time, typically from a [`FrameQueue`] thread.

mod queue;

pub use queue::FrameQueue;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::ascii::{ColorMode, ConvertError, ConvertStats, Converter, ConverterSettings, Grid};
use crate::camera::{Frame, Orientation};
use crate::config::{Config, ConfigError};
use crate::render::{load_rasterizer, Bitmap, Layout, RenderError, Renderer, BLACK};

/// Errors from processing one frame.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("conversion failed: {0}")]
    Convert(#[from] ConvertError),
    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),
    #[error("engine is paused")]
    Paused,
}

/// Everything needed to build a [`LiveEngine`].
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub converter: ConverterSettings,
    /// Render workers; 0 = one per CPU
    pub render_workers: usize,
    pub color_mode: ColorMode,
    pub max_width: u32,
    pub max_height: u32,
    pub background: u32,
    pub font_path: Option<PathBuf>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            converter: ConverterSettings::default(),
            render_workers: 0,
            color_mode: ColorMode::default(),
            max_width: 800,
            max_height: 600,
            background: BLACK,
            font_path: None,
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let kind = config.color_kind()?;
        Ok(Self {
            converter: config.converter_settings(),
            render_workers: config.engine.workers,
            color_mode: config.color_mode(kind)?,
            max_width: config.render.max_width,
            max_height: config.render.max_height,
            background: config.background()?,
            font_path: config.render.font_path.clone(),
        })
    }
}

/// Result of one processed frame.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub bitmap: Arc<Bitmap>,
    pub convert: ConvertStats,
    pub elapsed: Duration,
}

/// Running totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub frames: u64,
    pub failed: u64,
}

/// Converts and renders frames, keeping the last good result.
pub struct LiveEngine {
    converter: Converter,
    renderer: Renderer,
    mode: ColorMode,
    max_width: u32,
    max_height: u32,
    /// Grid of the last successful frame
    grid: Grid,
    /// Conversion target; swapped with `grid` on success
    scratch: Grid,
    source_size: Option<(u32, u32)>,
    paused: bool,
    stats: EngineStats,
}

impl LiveEngine {
    pub fn new(settings: EngineSettings) -> Result<Self, RenderError> {
        let layout = Layout::new(settings.max_width, settings.max_height)?;
        let rasterizer = load_rasterizer(settings.font_path.as_deref())?;
        let renderer = Renderer::new(layout, settings.render_workers)
            .with_background(settings.background)
            .with_rasterizer(rasterizer);
        let converter = Converter::new(settings.converter);
        log::info!(
            "Engine ready: {} kernel, {} convert workers, max output {}x{}",
            converter.kernel_name(),
            converter.worker_count(),
            settings.max_width,
            settings.max_height
        );
        Ok(Self {
            converter,
            renderer,
            mode: settings.color_mode,
            max_width: settings.max_width,
            max_height: settings.max_height,
            grid: Grid::new(),
            scratch: Grid::new(),
            source_size: None,
            paused: false,
            stats: EngineStats::default(),
        })
    }

    pub fn color_mode(&self) -> &ColorMode {
        &self.mode
    }

    /// Takes effect from the next frame.
    pub fn set_color_mode(&mut self, mode: ColorMode) {
        log::info!("Color mode: {}", mode.kind().name());
        self.mode = mode;
    }

    /// Current output layout, once a frame has been seen.
    pub fn layout(&self) -> Option<Layout> {
        self.source_size.map(|_| self.renderer.layout())
    }

    /// Grid of the last successful frame.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Bitmap of the last successful frame.
    pub fn visible_bitmap(&self) -> Option<Arc<Bitmap>> {
        self.renderer.visible_bitmap()
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop both worker pools. Frames are rejected until [`LiveEngine::resume`].
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.converter.pause();
            self.renderer.pause();
            log::info!("Engine paused");
        }
    }

    /// Accept frames again. Pools restart on the next frame.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            log::info!("Engine resumed");
        }
    }

    fn update_layout(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if self.source_size != Some((width, height)) {
            let layout = Layout::fit(self.max_width, self.max_height, width, height)?;
            log::info!(
                "Source {}x{}: output {}x{}, grid {}x{}",
                width,
                height,
                layout.width(),
                layout.height(),
                layout.columns(),
                layout.rows()
            );
            self.renderer.set_layout(layout);
            self.source_size = Some((width, height));
        }
        Ok(())
    }

    /// Convert and render one frame.
    ///
    /// On failure the previous grid and bitmap stay current.
    pub fn process_frame(
        &mut self,
        frame: &Frame<'_>,
        orientation: Orientation,
    ) -> Result<FrameOutput, EngineError> {
        if self.paused {
            return Err(EngineError::Paused);
        }
        let start = Instant::now();
        let result = self.convert_and_render(frame, orientation);
        match &result {
            Ok(_) => self.stats.frames += 1,
            Err(e) => {
                self.stats.failed += 1;
                log::warn!("Dropping frame: {}", e);
            }
        }
        let (bitmap, convert) = result?;
        let elapsed = start.elapsed();
        log::debug!(
            "Frame {}: convert {:?} ({} segments), total {:?}",
            self.stats.frames,
            convert.elapsed,
            convert.segments,
            elapsed
        );
        Ok(FrameOutput {
            bitmap,
            convert,
            elapsed,
        })
    }

    fn convert_and_render(
        &mut self,
        frame: &Frame<'_>,
        orientation: Orientation,
    ) -> Result<(Arc<Bitmap>, ConvertStats), EngineError> {
        frame.validate().map_err(ConvertError::from)?;
        self.update_layout(frame.width, frame.height)?;
        let layout = self.renderer.layout();
        let convert = self.converter.compute_grid(
            frame,
            layout.rows(),
            layout.columns(),
            &self.mode,
            orientation,
            &mut self.scratch,
        )?;
        let bitmap = self.renderer.render_full(&self.scratch)?;
        std::mem::swap(&mut self.grid, &mut self.scratch);
        Ok((bitmap, convert))
    }

    /// Quarter-size block thumbnail of the last successful frame.
    pub fn thumbnail(&self) -> Result<Bitmap, EngineError> {
        Ok(self.renderer.render_thumbnail(&self.grid)?)
    }
}

impl std::fmt::Debug for LiveEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveEngine")
            .field("mode", &self.mode.kind())
            .field("renderer", &self.renderer)
            .field("paused", &self.paused)
            .field("stats", &self.stats)
            .finish()
    }
}
