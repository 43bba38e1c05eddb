//! Glyph palettes and color modes.

use std::fmt;
use std::sync::Arc;

use super::error::PaletteError;

/// Default glyph ramp for monochrome and ANSI color output.
/// Characters ordered from darkest (space) to brightest (@).
pub const DEFAULT_CHARS: &str = " .:oO8@";

/// Default glyph ramp for full color output.
/// No blank glyph: in full color mode every cell shows its color.
pub const FULL_COLOR_CHARS: &str = "O8@";

/// Ordered glyphs, darkest to brightest. Never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Palette {
    glyphs: Arc<[char]>,
}

impl Palette {
    /// Build a palette from a string, one glyph per char.
    pub fn new(chars: &str) -> Result<Self, PaletteError> {
        let glyphs: Vec<char> = chars.chars().collect();
        if glyphs.is_empty() {
            return Err(PaletteError::Empty);
        }
        Ok(Self {
            glyphs: glyphs.into(),
        })
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    /// Glyph for an index, clamped to the last glyph.
    pub fn glyph(&self, index: u32) -> char {
        let i = (index as usize).min(self.glyphs.len() - 1);
        self.glyphs[i]
    }

    /// Map an average brightness (0-255) to a glyph index.
    ///
    /// Index `i` covers brightness `[256*i/len, 256*(i+1)/len)`.
    #[inline]
    pub fn index_for_brightness(&self, brightness: u32) -> u32 {
        let len = self.glyphs.len() as u32;
        (brightness.min(255) * len / 256).min(len - 1)
    }
}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = self.glyphs.iter().collect();
        write!(f, "Palette({:?})", s)
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.glyphs.iter() {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// Which kind of color a grid carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ColorKind {
    /// All glyphs drawn in one color
    #[default]
    None,
    /// Primary colors and their combinations (8 colors)
    AnsiQuantized,
    /// Averaged colors, normalized to full intensity
    FullColor,
}

impl ColorKind {
    /// Human-readable name, also used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            ColorKind::None => "none",
            ColorKind::AnsiQuantized => "ansi",
            ColorKind::FullColor => "full",
        }
    }

    /// Parse a name as written by [`ColorKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Some(ColorKind::None),
            "ansi" => Some(ColorKind::AnsiQuantized),
            "full" => Some(ColorKind::FullColor),
            _ => None,
        }
    }

    pub fn default_chars(&self) -> &'static str {
        match self {
            ColorKind::None | ColorKind::AnsiQuantized => DEFAULT_CHARS,
            ColorKind::FullColor => FULL_COLOR_CHARS,
        }
    }
}

/// Reduces averaged channel values. Arguments are `[r, g, b]` and the maximum
/// value a channel can hold at the current precision.
pub type Quantizer = fn([u32; 3], u32) -> [u32; 3];

/// A channel is switched on in ANSI mode when it reaches 7/8 of the strongest
/// channel. {200, 180, 160} becomes yellow: green is at 0.9, blue at 0.8.
const ANSI_RATIO_NUM: u32 = 7;
const ANSI_RATIO_DEN: u32 = 8;

/// Force every channel to either 0 or `max`, keeping the dominant hue.
pub fn quantize_ansi(rgb: [u32; 3], max: u32) -> [u32; 3] {
    let max_c = rgb[0].max(rgb[1]).max(rgb[2]);
    if max_c == 0 {
        return rgb;
    }
    let threshold = max_c * ANSI_RATIO_NUM / ANSI_RATIO_DEN;
    rgb.map(|c| if c >= threshold { max } else { 0 })
}

/// Scale channels so the strongest one reaches `max`; brightness is carried
/// by the glyph instead.
pub fn normalize_full(rgb: [u32; 3], max: u32) -> [u32; 3] {
    let max_c = rgb[0].max(rgb[1]).max(rgb[2]);
    if max_c == 0 {
        return rgb;
    }
    rgb.map(|c| (c as u64 * max as u64 / max_c as u64) as u32)
}

/// Color mode for one conversion, carrying the palette it draws with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorMode {
    None { palette: Palette },
    AnsiQuantized { palette: Palette },
    FullColor { palette: Palette },
}

impl ColorMode {
    /// Mode of the given kind with its default palette.
    pub fn default_for(kind: ColorKind) -> Self {
        let palette = Palette {
            glyphs: kind.default_chars().chars().collect::<Vec<_>>().into(),
        };
        Self::with_palette(kind, palette)
    }

    pub fn with_palette(kind: ColorKind, palette: Palette) -> Self {
        match kind {
            ColorKind::None => ColorMode::None { palette },
            ColorKind::AnsiQuantized => ColorMode::AnsiQuantized { palette },
            ColorKind::FullColor => ColorMode::FullColor { palette },
        }
    }

    /// Mode of the given kind using `chars`, or the kind's default when `None`.
    pub fn from_chars(kind: ColorKind, chars: Option<&str>) -> Result<Self, PaletteError> {
        match chars {
            Some(chars) => Ok(Self::with_palette(kind, Palette::new(chars)?)),
            None => Ok(Self::default_for(kind)),
        }
    }

    pub fn kind(&self) -> ColorKind {
        match self {
            ColorMode::None { .. } => ColorKind::None,
            ColorMode::AnsiQuantized { .. } => ColorKind::AnsiQuantized,
            ColorMode::FullColor { .. } => ColorKind::FullColor,
        }
    }

    pub fn palette(&self) -> &Palette {
        match self {
            ColorMode::None { palette }
            | ColorMode::AnsiQuantized { palette }
            | ColorMode::FullColor { palette } => palette,
        }
    }

    /// Color reduction rule, or `None` when colors are not computed at all.
    pub fn quantizer(&self) -> Option<Quantizer> {
        match self {
            ColorMode::None { .. } => None,
            ColorMode::AnsiQuantized { .. } => Some(quantize_ansi),
            ColorMode::FullColor { .. } => Some(normalize_full),
        }
    }
}

impl Default for ColorMode {
    fn default() -> Self {
        Self::default_for(ColorKind::AnsiQuantized)
    }
}
