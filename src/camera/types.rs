//! Frame types handed to the conversion engine.

use std::time::Instant;

use thiserror::Error;

/// Pixel layout of a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Planar luma followed by interleaved V/U chroma, subsampled 2x2.
    /// Chroma rows use the same stride as luma rows.
    Nv21,
    /// 4 bytes per pixel: R, G, B, A
    Rgba,
}

impl PixelFormat {
    /// Minimum buffer length for a frame of the given size.
    ///
    /// For NV21 this is the luma plane plus one chroma row (stride `width`)
    /// per pair of luma rows. An odd width needs one extra byte because the
    /// last chroma pair of a row starts at the last even column.
    pub fn required_len(&self, width: u32, height: u32) -> usize {
        let w = width as usize;
        let h = height as usize;
        match self {
            PixelFormat::Nv21 => w * h + w * h.div_ceil(2) + (w & 1),
            PixelFormat::Rgba => w * h * 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PixelFormat::Nv21 => "nv21",
            PixelFormat::Rgba => "rgba",
        }
    }
}

/// Rotation applied to the output grid after conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    /// Image is upside down; the grid is reversed end-to-end.
    Rotated180,
}

/// Errors for frames whose declared geometry does not match their buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame has zero dimension ({width}x{height})")]
    ZeroDimension { width: u32, height: u32 },
    #[error("{format} frame {width}x{height} needs {expected} bytes, got {actual}")]
    BufferTooShort {
        format: &'static str,
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A borrowed, read-only view of a captured frame.
///
/// The buffer must stay untouched for the duration of one conversion call;
/// the engine never keeps the view beyond that.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl<'a> Frame<'a> {
    pub fn nv21(data: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            format: PixelFormat::Nv21,
        }
    }

    pub fn rgba(data: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            format: PixelFormat::Rgba,
        }
    }

    /// Check the declared size against the buffer length.
    ///
    /// Must pass before any pixel is read; the sampling loops index the
    /// buffer without further bounds reasoning.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.format.required_len(self.width, self.height);
        if self.data.len() < expected {
            return Err(FrameError::BufferTooShort {
                format: self.format.name(),
                width: self.width,
                height: self.height,
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}

/// An owned frame, as queued between a producer thread and the engine.
#[derive(Debug, Clone)]
pub struct OwnedFrame {
    /// Raw pixel data in `format` layout
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel format
    pub format: PixelFormat,
    /// Orientation correction to apply to the converted grid
    pub orientation: Orientation,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

impl OwnedFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            data,
            width,
            height,
            format,
            orientation: Orientation::Normal,
            timestamp: Instant::now(),
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Borrow this frame as a [`Frame`] view.
    pub fn view(&self) -> Frame<'_> {
        Frame {
            data: &self.data,
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_len_nv21_even() {
        // 4x4 luma + 4x2 chroma
        assert_eq!(PixelFormat::Nv21.required_len(4, 4), 24);
        assert_eq!(PixelFormat::Nv21.required_len(640, 400), 640 * 400 * 3 / 2);
    }

    #[test]
    fn test_required_len_nv21_odd() {
        // 3x3 luma (9) + chroma rows ceil(3/2)=2 of stride 3 (6) + 1 for odd width
        assert_eq!(PixelFormat::Nv21.required_len(3, 3), 16);
        assert_eq!(PixelFormat::Nv21.required_len(1, 1), 3);
    }

    #[test]
    fn test_required_len_rgba() {
        assert_eq!(PixelFormat::Rgba.required_len(2, 3), 24);
    }

    #[test]
    fn test_validate_zero_dimension() {
        let data = [0u8; 16];
        let frame = Frame::nv21(&data, 0, 4);
        assert_eq!(
            frame.validate(),
            Err(FrameError::ZeroDimension {
                width: 0,
                height: 4
            })
        );
    }

    #[test]
    fn test_validate_short_buffer() {
        let data = vec![0u8; 23];
        let frame = Frame::nv21(&data, 4, 4);
        let err = frame.validate().unwrap_err();
        assert!(matches!(
            err,
            FrameError::BufferTooShort {
                expected: 24,
                actual: 23,
                ..
            }
        ));
        assert!(err.to_string().contains("needs 24 bytes, got 23"));
    }

    #[test]
    fn test_validate_ok() {
        let data = vec![0u8; 24];
        assert!(Frame::nv21(&data, 4, 4).validate().is_ok());
        let rgba = vec![0u8; 16];
        assert!(Frame::rgba(&rgba, 2, 2).validate().is_ok());
    }

    #[test]
    fn test_owned_frame_view() {
        let owned = OwnedFrame::new(vec![1, 2, 3, 4], 1, 1, PixelFormat::Rgba)
            .with_orientation(Orientation::Rotated180);
        let view = owned.view();
        assert_eq!(view.width, 1);
        assert_eq!(view.data, &[1, 2, 3, 4]);
        assert_eq!(owned.orientation, Orientation::Rotated180);
    }
}
