//! Cell sampling kernels.
//!
//! A [`PixelKernel`] fills the glyph and color cells of one row segment. Two
//! implementations exist and produce bit-identical output:
//!
//! - [`PortableKernel`] - plain Rust, works everywhere
//! - [`AcceleratedKernel`] - sums luma rows with AVX2 on x86_64
//!
//! The kernel is chosen once from a [`Capability`] when the converter is built.

use std::fmt;
use std::ops::Range;

use super::color::{luminance, pack_argb, pack_argb18, yuv_to_rgb18, MAX_COLOR_18, MAX_COLOR_8};
use super::palette::{Palette, Quantizer};
use crate::camera::{Frame, PixelFormat};

/// Inputs shared by every segment of one conversion call.
///
/// The frame has been validated, and `rows`/`cols` are non-zero.
pub struct SampleJob<'a> {
    pub frame: Frame<'a>,
    pub rows: usize,
    pub cols: usize,
    pub palette: &'a Palette,
    pub quantizer: Option<Quantizer>,
}

/// Output cells for one row segment.
///
/// `glyphs` (and `colors`, when present) hold exactly
/// `rows.len() * cols` cells, starting at row `rows.start`.
pub struct SegmentOutput<'a> {
    pub rows: Range<usize>,
    pub glyphs: &'a mut [u32],
    pub colors: Option<&'a mut [u32]>,
}

/// Strategy that fills the cells of one segment.
pub trait PixelKernel: Send + Sync {
    fn name(&self) -> &'static str;

    fn convert_segment(&self, job: &SampleJob<'_>, out: SegmentOutput<'_>);
}

/// CPU features relevant to conversion, detected once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Portable,
    Avx2,
}

impl Capability {
    /// Detect what the running CPU supports.
    pub fn detect() -> Self {
        if Avx2Sum::detect().is_some() {
            Capability::Avx2
        } else {
            Capability::Portable
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Capability::Portable => "portable",
            Capability::Avx2 => "avx2",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build the kernel for a capability.
///
/// Falls back to the portable kernel when the accelerated one cannot run
/// here, e.g. a capability taken from configuration on a different machine.
pub fn select_kernel(capability: Capability) -> Box<dyn PixelKernel> {
    match capability {
        Capability::Avx2 => match AcceleratedKernel::new() {
            Some(kernel) => Box::new(kernel),
            None => {
                log::debug!("AVX2 kernel unavailable, using portable kernel");
                Box::new(PortableKernel)
            }
        },
        Capability::Portable => Box::new(PortableKernel),
    }
}

/// Kernel written in plain Rust.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortableKernel;

impl PixelKernel for PortableKernel {
    fn name(&self) -> &'static str {
        "portable"
    }

    fn convert_segment(&self, job: &SampleJob<'_>, out: SegmentOutput<'_>) {
        convert_segment_with(&ScalarSum, job, out);
    }
}

/// Kernel that sums luma spans with AVX2 `vpsadbw`.
#[derive(Debug, Clone, Copy)]
pub struct AcceleratedKernel {
    sum: Avx2Sum,
}

impl AcceleratedKernel {
    /// Returns `None` when the CPU lacks AVX2.
    pub fn new() -> Option<Self> {
        Avx2Sum::detect().map(|sum| Self { sum })
    }
}

impl PixelKernel for AcceleratedKernel {
    fn name(&self) -> &'static str {
        "avx2"
    }

    fn convert_segment(&self, job: &SampleJob<'_>, out: SegmentOutput<'_>) {
        convert_segment_with(&self.sum, job, out);
    }
}

/// Sums a contiguous span of luma bytes.
trait SpanSum {
    fn sum(&self, bytes: &[u8]) -> u32;
}

struct ScalarSum;

impl SpanSum for ScalarSum {
    #[inline]
    fn sum(&self, bytes: &[u8]) -> u32 {
        bytes.iter().map(|&b| b as u32).sum()
    }
}

/// Proof that AVX2 is available. Only [`Avx2Sum::detect`] creates one.
#[derive(Debug, Clone, Copy)]
struct Avx2Sum {
    _detected: (),
}

impl Avx2Sum {
    fn detect() -> Option<Self> {
        #[cfg(target_arch = "x86_64")]
        {
            if std::is_x86_feature_detected!("avx2") {
                return Some(Self { _detected: () });
            }
        }
        None
    }
}

impl SpanSum for Avx2Sum {
    #[inline]
    fn sum(&self, bytes: &[u8]) -> u32 {
        #[cfg(target_arch = "x86_64")]
        {
            // SAFETY: an Avx2Sum only exists once AVX2 support was detected.
            unsafe { sum_bytes_avx2(bytes) }
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            ScalarSum.sum(bytes)
        }
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn sum_bytes_avx2(bytes: &[u8]) -> u32 {
    use std::arch::x86_64::{
        __m256i, _mm256_add_epi64, _mm256_loadu_si256, _mm256_sad_epu8, _mm256_setzero_si256,
        _mm256_storeu_si256,
    };

    let zero = _mm256_setzero_si256();
    let mut acc = _mm256_setzero_si256();
    let chunks = bytes.chunks_exact(32);
    let tail = chunks.remainder();
    for chunk in chunks {
        let v = _mm256_loadu_si256(chunk.as_ptr() as *const __m256i);
        // four u64 lanes, each the sum of 8 bytes
        acc = _mm256_add_epi64(acc, _mm256_sad_epu8(v, zero));
    }
    let mut lanes = [0u64; 4];
    _mm256_storeu_si256(lanes.as_mut_ptr() as *mut __m256i, acc);
    let head: u64 = lanes.iter().sum();
    head as u32 + tail.iter().map(|&b| b as u32).sum::<u32>()
}

/// Pixel span `[lo, hi)` covered by cell `index` of `count` along an axis of
/// `len` pixels. Never empty: when there are more cells than pixels the cell
/// samples the single pixel at `lo`.
#[inline]
pub fn cell_span(len: usize, index: usize, count: usize) -> Range<usize> {
    let lo = len * index / count;
    let hi = len * (index + 1) / count;
    if hi > lo {
        lo..hi
    } else {
        lo..lo + 1
    }
}

/// Accumulated sample totals for one cell.
#[derive(Debug, Clone, Copy, Default)]
struct CellTotals {
    luma: u64,
    rgb: [u64; 3],
    samples: u64,
}

fn convert_segment_with<S: SpanSum>(sum: &S, job: &SampleJob<'_>, out: SegmentOutput<'_>) {
    let frame = &job.frame;
    let data = frame.data;
    let w = frame.width as usize;
    let h = frame.height as usize;

    match (frame.format, job.quantizer.is_some()) {
        (PixelFormat::Nv21, false) => fill_cells(job, out, MAX_COLOR_18, pack_argb18, |ys, xs| {
            let mut luma = 0u64;
            for y in ys.clone() {
                let row = y * w;
                luma += sum.sum(&data[row + xs.start..row + xs.end]) as u64;
            }
            CellTotals {
                luma,
                rgb: [0; 3],
                samples: (ys.len() * xs.len()) as u64,
            }
        }),
        (PixelFormat::Nv21, true) => fill_cells(job, out, MAX_COLOR_18, pack_argb18, |ys, xs| {
            let mut totals = CellTotals::default();
            for y in ys.clone() {
                let row = y * w;
                totals.luma += sum.sum(&data[row + xs.start..row + xs.end]) as u64;
                // one V/U pair per 2x2 block of luma
                let uv_row = w * h + w * (y / 2);
                for x in xs.clone() {
                    let uv = uv_row + (x & !1);
                    let rgb = yuv_to_rgb18(data[row + x], data[uv + 1], data[uv]);
                    for (t, c) in totals.rgb.iter_mut().zip(rgb) {
                        *t += c as u64;
                    }
                }
            }
            totals.samples = (ys.len() * xs.len()) as u64;
            totals
        }),
        (PixelFormat::Rgba, with_color) => fill_cells(job, out, MAX_COLOR_8, pack_argb, |ys, xs| {
            let mut totals = CellTotals::default();
            for y in ys.clone() {
                let row = (y * w + xs.start) * 4;
                let span = &data[row..row + xs.len() * 4];
                for px in span.chunks_exact(4) {
                    totals.luma += luminance(px[0], px[1], px[2]) as u64;
                    if with_color {
                        totals.rgb[0] += px[0] as u64;
                        totals.rgb[1] += px[1] as u64;
                        totals.rgb[2] += px[2] as u64;
                    }
                }
            }
            totals.samples = (ys.len() * xs.len()) as u64;
            totals
        }),
    }
}

fn fill_cells<F>(
    job: &SampleJob<'_>,
    out: SegmentOutput<'_>,
    channel_max: u32,
    pack: fn([u32; 3]) -> u32,
    sample: F,
) where
    F: Fn(Range<usize>, Range<usize>) -> CellTotals,
{
    let w = job.frame.width as usize;
    let h = job.frame.height as usize;
    let SegmentOutput {
        rows,
        glyphs,
        mut colors,
    } = out;

    let mut index = 0;
    for r in rows {
        let ys = cell_span(h, r, job.rows);
        for c in 0..job.cols {
            let xs = cell_span(w, c, job.cols);
            let totals = sample(ys.clone(), xs);
            let brightness = (totals.luma / totals.samples) as u32;
            glyphs[index] = job.palette.index_for_brightness(brightness);
            if let (Some(colors), Some(quantize)) = (colors.as_deref_mut(), job.quantizer) {
                let average = totals.rgb.map(|t| (t / totals.samples) as u32);
                colors[index] = pack(quantize(average, channel_max));
            }
            index += 1;
        }
    }
}
