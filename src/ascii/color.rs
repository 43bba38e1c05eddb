//! Pixel color math: YUV to RGB, luminance and ARGB packing.

/// Largest channel value produced by [`yuv_to_rgb18`] (2^18 - 1).
pub const MAX_COLOR_18: u32 = (1 << 18) - 1;

/// Largest 8-bit channel value.
pub const MAX_COLOR_8: u32 = 255;

/// Convert one YUV sample to 18-bit RGB using integer coefficients.
///
/// `v` and `u` are the raw chroma bytes (centered on 128). Each channel is
/// clamped to `[0, MAX_COLOR_18]`.
#[inline]
pub fn yuv_to_rgb18(y: u8, u: u8, v: u8) -> [u32; 3] {
    let yy = (y as i32 - 16).max(0);
    let u = u as i32 - 128;
    let v = v as i32 - 128;
    let y1192 = 1192 * yy;
    let r = y1192 + 1634 * v;
    let g = y1192 - 833 * v - 400 * u;
    let b = y1192 + 2066 * u;
    [clamp18(r), clamp18(g), clamp18(b)]
}

#[inline]
fn clamp18(c: i32) -> u32 {
    c.clamp(0, MAX_COLOR_18 as i32) as u32
}

/// ITU-R BT.601 luminance with integer math.
///
/// Coefficients scaled by 1000: 299 + 587 + 114 = 1000
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u32 {
    (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000
}

/// Pack 8-bit channels into opaque ARGB.
#[inline]
pub fn pack_argb(rgb: [u32; 3]) -> u32 {
    0xff00_0000 | ((rgb[0] & 0xff) << 16) | ((rgb[1] & 0xff) << 8) | (rgb[2] & 0xff)
}

/// Pack 18-bit channels into opaque ARGB, keeping the top 8 bits of each.
#[inline]
pub fn pack_argb18(rgb: [u32; 3]) -> u32 {
    pack_argb(rgb.map(|c| c >> 10))
}

/// Split packed ARGB into `[r, g, b]` bytes.
#[inline]
pub fn unpack_rgb(argb: u32) -> [u8; 3] {
    [(argb >> 16) as u8, (argb >> 8) as u8, argb as u8]
}
