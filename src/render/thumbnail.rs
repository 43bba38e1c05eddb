//! Coarse block thumbnails for gallery previews.

use super::bitmap::{Bitmap, BLACK};
use crate::ascii::{ColorKind, Grid};

/// Draw `grid` into a `width` x `height` thumbnail.
///
/// Every second row and column is sampled. Each sample covers a 2x2 block
/// of cells and is drawn as a filled rectangle when the grid is full color
/// or the cell is brighter than half the palette, otherwise as a 2x2 dot in
/// the middle of the block.
pub fn draw_thumbnail(grid: &Grid, width: u32, height: u32) -> Bitmap {
    let mut bitmap = Bitmap::new(width, height, BLACK);
    let (rows, cols) = (grid.rows() as i64, grid.columns() as i64);
    if grid.is_empty() {
        return bitmap;
    }
    let (w, h) = (width as i64, height as i64);
    let full_color = grid.color_kind() == ColorKind::FullColor;

    for r in (0..rows).step_by(2) {
        let ymin = h * r / rows;
        let ymax = h * (r + 2) / rows;
        for c in (0..cols).step_by(2) {
            let xmin = w * c / cols;
            let xmax = w * (c + 2) / cols;
            let (row, col) = (r as usize, c as usize);
            let color = grid.color_at(row, col);
            if full_color || grid.brightness_ratio_at(row, col) > 0.5 {
                bitmap.fill_rect(xmin, ymin, xmax, ymax, color);
            } else {
                let x = (xmin + xmax) / 2 - 1;
                let y = (ymin + ymax) / 2 - 1;
                bitmap.fill_rect(x, y, x + 2, y + 2, color);
            }
        }
    }
    bitmap
}
