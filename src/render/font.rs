//! Glyph rasterization into cell-sized coverage masks.

use std::fs;
use std::path::Path;

use font8x8::{UnicodeFonts, BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, LATIN_FONTS};
use fontdue::{Font, FontSettings};

use super::error::RenderError;
use super::layout::CellSize;

/// Produces one coverage mask per glyph.
///
/// A mask is `cell.width * cell.height` bytes, row-major; nonzero bytes are
/// foreground.
pub trait GlyphRasterizer: Send + Sync {
    fn name(&self) -> &str;

    fn rasterize(&self, ch: char, cell: CellSize) -> Vec<u8>;
}

/// Built-in 8x8 bitmap font, scaled to the cell with nearest-neighbour.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapFont;

impl BitmapFont {
    fn glyph_rows(ch: char) -> [u8; 8] {
        BASIC_FONTS
            .get(ch)
            .or_else(|| LATIN_FONTS.get(ch))
            .or_else(|| BLOCK_FONTS.get(ch))
            .or_else(|| BOX_FONTS.get(ch))
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8])
    }
}

impl GlyphRasterizer for BitmapFont {
    fn name(&self) -> &str {
        "font8x8"
    }

    fn rasterize(&self, ch: char, cell: CellSize) -> Vec<u8> {
        let rows = Self::glyph_rows(ch);
        let (w, h) = (cell.width as usize, cell.height as usize);
        let mut mask = vec![0u8; w * h];
        for y in 0..h {
            let bits = rows[y * 8 / h];
            for x in 0..w {
                // bit 0 is the leftmost pixel
                if (bits >> (x * 8 / w)) & 1 == 1 {
                    mask[y * w + x] = 0xff;
                }
            }
        }
        mask
    }
}

/// Coverage below this is treated as background.
const COVERAGE_THRESHOLD: u8 = 64;

/// TrueType/OpenType font rendered with fontdue.
pub struct TrueTypeFont {
    name: String,
    font: Font,
}

impl TrueTypeFont {
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let bytes = fs::read(path).map_err(|source| RenderError::FontIo {
            path: path.to_path_buf(),
            source,
        })?;
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|message| {
            RenderError::FontParse {
                path: path.to_path_buf(),
                message: message.to_string(),
            }
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "truetype".to_string());
        log::info!("Loaded font {}", path.display());
        Ok(Self { name, font })
    }
}

impl GlyphRasterizer for TrueTypeFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn rasterize(&self, ch: char, cell: CellSize) -> Vec<u8> {
        let (w, h) = (cell.width as i32, cell.height as i32);
        let mut mask = vec![0u8; (w * h) as usize];
        let px = cell.height as f32;
        let (metrics, coverage) = self.font.rasterize(ch, px);
        let ascent = self
            .font
            .horizontal_line_metrics(px)
            .map(|m| m.ascent)
            .unwrap_or(px * 0.8);
        let baseline = ascent.round() as i32;
        let top = baseline - metrics.ymin - metrics.height as i32;

        for gy in 0..metrics.height as i32 {
            let y = top + gy;
            if !(0..h).contains(&y) {
                continue;
            }
            for gx in 0..metrics.width as i32 {
                let x = metrics.xmin + gx;
                if !(0..w).contains(&x) {
                    continue;
                }
                let c = coverage[(gy * metrics.width as i32 + gx) as usize];
                if c >= COVERAGE_THRESHOLD {
                    mask[(y * w + x) as usize] = c;
                }
            }
        }
        mask
    }
}

/// Load the configured font, or the built-in one when no path is set.
pub fn load_rasterizer(path: Option<&Path>) -> Result<Box<dyn GlyphRasterizer>, RenderError> {
    match path {
        Some(path) => Ok(Box::new(TrueTypeFont::load(path)?)),
        None => Ok(Box::new(BitmapFont)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_is_blank() {
        let mask = BitmapFont.rasterize(' ', CellSize::default());
        assert_eq!(mask.len(), 63);
        assert!(mask.iter().all(|&m| m == 0));
    }

    #[test]
    fn test_at_sign_has_ink() {
        let mask = BitmapFont.rasterize('@', CellSize::default());
        assert!(mask.iter().filter(|&&m| m != 0).count() > 10);
    }

    #[test]
    fn test_denser_glyph_has_more_ink() {
        let cell = CellSize::default();
        let ink = |c| BitmapFont.rasterize(c, cell).iter().filter(|&&m| m != 0).count();
        assert!(ink('.') < ink('8'));
    }

    #[test]
    fn test_scaled_mask_size() {
        let cell = CellSize::for_output_width(1600);
        let mask = BitmapFont.rasterize('O', cell);
        assert_eq!(mask.len(), cell.area());
    }

    #[test]
    fn test_full_block() {
        let mask = BitmapFont.rasterize('█', CellSize { width: 8, height: 8 });
        assert!(mask.iter().all(|&m| m == 0xff));
    }

    #[test]
    fn test_missing_font_file() {
        let err = load_rasterizer(Some(Path::new("/nonexistent/font.ttf")))
            .err()
            .unwrap();
        assert!(matches!(err, RenderError::FontIo { .. }));
    }

    #[test]
    fn test_invalid_font_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        let err = TrueTypeFont::load(&path).err().unwrap();
        assert!(matches!(err, RenderError::FontParse { .. }));
    }

    #[test]
    fn test_default_rasterizer() {
        assert_eq!(load_rasterizer(None).unwrap().name(), "font8x8");
    }
}
