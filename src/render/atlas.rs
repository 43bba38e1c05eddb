//! Pre-rasterized glyph masks for tile-blitting.

use super::font::GlyphRasterizer;
use super::layout::CellSize;
use crate::ascii::Palette;

/// One coverage mask per palette glyph, all at the same cell size.
#[derive(Debug, Clone)]
pub struct GlyphAtlas {
    palette: Palette,
    cell: CellSize,
    masks: Vec<u8>,
}

impl GlyphAtlas {
    pub fn build(rasterizer: &dyn GlyphRasterizer, palette: &Palette, cell: CellSize) -> Self {
        let mut masks = Vec::with_capacity(palette.len() * cell.area());
        for &ch in palette.glyphs() {
            let mut mask = rasterizer.rasterize(ch, cell);
            mask.resize(cell.area(), 0);
            masks.extend_from_slice(&mask);
        }
        log::debug!(
            "Built glyph atlas for {} at {}x{} with {}",
            palette,
            cell.width,
            cell.height,
            rasterizer.name()
        );
        Self {
            palette: palette.clone(),
            cell,
            masks,
        }
    }

    /// True if this atlas was built for `palette` at `cell`.
    pub fn matches(&self, palette: &Palette, cell: CellSize) -> bool {
        self.cell == cell && self.palette == *palette
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn cell(&self) -> CellSize {
        self.cell
    }

    pub fn glyph_count(&self) -> usize {
        self.palette.len()
    }

    /// Mask of glyph `index`, clamped to the last glyph.
    pub fn mask(&self, index: u32) -> &[u8] {
        let area = self.cell.area();
        let i = (index as usize).min(self.palette.len() - 1);
        &self.masks[i * area..(i + 1) * area]
    }

    /// Row `y` of the mask of glyph `index`.
    #[inline]
    pub fn mask_row(&self, index: u32, y: usize) -> &[u8] {
        let w = self.cell.width as usize;
        &self.mask(index)[y * w..(y + 1) * w]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::font::BitmapFont;

    #[test]
    fn test_atlas_layout() {
        let palette = Palette::new(" @").unwrap();
        let atlas = GlyphAtlas::build(&BitmapFont, &palette, CellSize::default());
        assert_eq!(atlas.glyph_count(), 2);
        assert!(atlas.mask(0).iter().all(|&m| m == 0));
        assert!(atlas.mask(1).iter().any(|&m| m != 0));
        assert_eq!(atlas.mask_row(1, 8).len(), 7);
        // Out of range index clamps
        assert_eq!(atlas.mask(9), atlas.mask(1));
    }

    #[test]
    fn test_matches() {
        let palette = Palette::new(" .:oO8@").unwrap();
        let atlas = GlyphAtlas::build(&BitmapFont, &palette, CellSize::default());
        assert!(atlas.matches(&palette, CellSize::default()));
        assert!(!atlas.matches(&Palette::new("O8@").unwrap(), CellSize::default()));
        assert!(!atlas.matches(&palette, CellSize::for_output_width(1600)));
    }
}
