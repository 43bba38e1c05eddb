//! CLI enum types for color mode options.

use clap::ValueEnum;

use ascii_cam::ascii::ColorKind;

/// Color mode for conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorModeArg {
    /// Monochrome glyphs
    None,
    /// Each channel fully on or off
    #[default]
    Ansi,
    /// Averaged colors at full intensity
    Full,
}

impl From<ColorModeArg> for ColorKind {
    fn from(c: ColorModeArg) -> Self {
        match c {
            ColorModeArg::None => ColorKind::None,
            ColorModeArg::Ansi => ColorKind::AnsiQuantized,
            ColorModeArg::Full => ColorKind::FullColor,
        }
    }
}
