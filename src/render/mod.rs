//! Grid to bitmap rendering.
//!
//! The full render copies one pre-rasterized mask per glyph (the atlas) into
//! the output, row bands in parallel. The thumbnail path draws blocks instead
//! of glyphs since text doesn't survive downscaling.

mod atlas;
mod bitmap;
mod error;
mod font;
mod layout;
mod renderer;
mod thumbnail;

pub use atlas::GlyphAtlas;
pub use bitmap::{Bitmap, RenderBuffer, BLACK};
pub use error::RenderError;
pub use font::{load_rasterizer, BitmapFont, GlyphRasterizer, TrueTypeFont};
pub use layout::{CellSize, Layout, BASE_CELL_HEIGHT, BASE_CELL_WIDTH};
pub use renderer::Renderer;
pub use thumbnail::draw_thumbnail;
