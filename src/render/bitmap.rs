//! ARGB bitmaps and the two-slot render buffer.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{Rgba, RgbaImage};

/// Opaque black.
pub const BLACK: u32 = 0xff00_0000;

/// Row-major bitmap of packed ARGB (0xAARRGGBB) pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, fill: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Fill `[x0, x1) x [y0, y1)`, clipped to the bitmap.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: u32) {
        let x0 = x0.clamp(0, self.width as i64) as usize;
        let x1 = x1.clamp(0, self.width as i64) as usize;
        let y0 = y0.clamp(0, self.height as i64) as usize;
        let y1 = y1.clamp(0, self.height as i64) as usize;
        if x0 >= x1 {
            return;
        }
        let w = self.width as usize;
        for y in y0..y1 {
            self.pixels[y * w + x0..y * w + x1].fill(color);
        }
    }

    /// Convert to an RGBA image for encoding.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let p = self.pixel(x, y);
            Rgba([(p >> 16) as u8, (p >> 8) as u8, p as u8, (p >> 24) as u8])
        })
    }

    /// Write as PNG (format picked from the extension).
    pub fn save(&self, path: &Path) -> Result<(), image::ImageError> {
        self.to_rgba_image().save(path)
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bitmap({}x{})", self.width, self.height)
    }
}

/// Two bitmap slots: one visible, one being drawn.
///
/// Readers hold `Arc` handles to the visible bitmap, so a frame being drawn
/// is never observed and a bitmap still being read is never overwritten.
#[derive(Debug, Default)]
pub struct RenderBuffer {
    slots: [Option<Arc<Bitmap>>; 2],
    active: AtomicUsize,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The visible bitmap, if anything has been published yet.
    pub fn active(&self) -> Option<Arc<Bitmap>> {
        self.slots[self.active.load(Ordering::Acquire)].clone()
    }

    /// Index of the visible slot.
    pub fn active_index(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    fn offscreen_index(&self) -> usize {
        (self.active.load(Ordering::Acquire) + 1) % 2
    }

    /// Take the offscreen bitmap for drawing, reusing its allocation when
    /// the size matches and no reader still holds it.
    pub fn take_offscreen(&mut self, width: u32, height: u32, background: u32) -> Bitmap {
        let index = self.offscreen_index();
        match self.slots[index].take().map(Arc::try_unwrap) {
            Some(Ok(mut bitmap)) if bitmap.width == width && bitmap.height == height => {
                bitmap.fill(background);
                bitmap
            }
            _ => Bitmap::new(width, height, background),
        }
    }

    /// Store a finished bitmap in the offscreen slot and make it visible.
    pub fn publish(&mut self, bitmap: Bitmap) -> Arc<Bitmap> {
        let index = self.offscreen_index();
        let bitmap = Arc::new(bitmap);
        self.slots[index] = Some(Arc::clone(&bitmap));
        self.active.store(index, Ordering::Release);
        bitmap
    }
}
