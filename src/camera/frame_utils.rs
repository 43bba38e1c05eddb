//! Frame construction and transformation utilities.

use image::DynamicImage;

use super::types::{OwnedFrame, PixelFormat};

/// Convert a decoded still image to an RGBA frame for the import path.
pub fn frame_from_image(image: &DynamicImage) -> OwnedFrame {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    OwnedFrame::new(rgba.into_raw(), width, height, PixelFormat::Rgba)
}

/// Build a uniform NV21 frame: every luma byte is `luma`, every chroma pair is (`v`, `u`).
pub fn solid_nv21(width: u32, height: u32, luma: u8, u: u8, v: u8) -> OwnedFrame {
    let luma_len = width as usize * height as usize;
    let total = PixelFormat::Nv21.required_len(width, height);
    let mut data = vec![luma; luma_len];
    data.reserve(total - luma_len);
    for i in 0..total - luma_len {
        data.push(if i % 2 == 0 { v } else { u });
    }
    OwnedFrame::new(data, width, height, PixelFormat::Nv21)
}

/// Build an NV21 frame whose luma ramps left to right and whose chroma
/// sweeps top to bottom. `phase` shifts the pattern so consecutive frames differ.
pub fn gradient_nv21(width: u32, height: u32, phase: u32) -> OwnedFrame {
    let w = width as usize;
    let h = height as usize;
    let total = PixelFormat::Nv21.required_len(width, height);
    let mut data = Vec::with_capacity(total);
    for _y in 0..h {
        for x in 0..w {
            data.push(((x * 255 / w.max(1)) as u32 + phase) as u8);
        }
    }
    let chroma_rows = h.div_ceil(2);
    for cy in 0..chroma_rows {
        let sweep = ((cy * 255 / chroma_rows.max(1)) as u32 + phase * 3) as u8;
        for x in 0..w {
            data.push(if x % 2 == 0 { sweep } else { 255 - sweep });
        }
    }
    data.resize(total, 128);
    OwnedFrame::new(data, width, height, PixelFormat::Nv21)
}
