//! Configuration file handling for ascii-cam.
//!
//! Loads configuration from `<config_dir>/ascii-cam/config.toml` or a custom path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ascii::{ColorKind, ColorMode, ConverterSettings};

/// Configuration file structure for ascii-cam.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub ascii: AsciiConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Worker threads per engine; 0 = one per CPU
    #[serde(default)]
    pub workers: usize,
    /// Use the AVX2 kernel when available
    #[serde(default = "default_true")]
    pub accelerated: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            accelerated: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct AsciiConfig {
    /// none, ansi or full
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_mode: Option<String>,
    #[serde(default)]
    pub chars: CharsConfig,
}

/// Glyph ramps per color mode, darkest first.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct CharsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub none: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ansi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full: Option<String>,
}

impl CharsConfig {
    pub fn for_kind(&self, kind: ColorKind) -> Option<&str> {
        match kind {
            ColorKind::None => self.none.as_deref(),
            ColorKind::AnsiQuantized => self.ansi.as_deref(),
            ColorKind::FullColor => self.full.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RenderConfig {
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
    /// Background color as `#rrggbb`
    #[serde(default = "default_background")]
    pub background: String,
    /// TrueType font for glyphs; built-in bitmap font when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
            background: default_background(),
            font_path: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_width() -> u32 {
    800
}

fn default_max_height() -> u32 {
    600
}

fn default_background() -> String {
    "#000000".to_string()
}

/// Template written by `config init`.
pub const DEFAULT_CONFIG: &str = r##"# ascii-cam configuration

[engine]
# Worker threads per engine (0 = one per CPU)
workers = 0
# Use the AVX2 kernel when the CPU supports it
accelerated = true

[ascii]
# Color mode: none, ansi, full
color_mode = "ansi"

[ascii.chars]
# Glyph ramps, darkest first
none = " .:oO8@"
ansi = " .:oO8@"
full = "O8@"

[render]
# Output image is fitted inside this size
max_width = 800
max_height = 600
# Background color
background = "#000000"
# TrueType font for glyphs (default: built-in 8x8 font)
# font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf"
"##;

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            Self::load_from_explicit(&path)
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Load configuration from a path that must exist.
    pub fn load_from_explicit(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Color kind from `[ascii] color_mode`, ANSI when unset.
    pub fn color_kind(&self) -> Result<ColorKind, ConfigError> {
        match &self.ascii.color_mode {
            None => Ok(ColorKind::AnsiQuantized),
            Some(name) => ColorKind::from_name(name).ok_or_else(|| ConfigError::InvalidValue {
                key: "ascii.color_mode",
                value: name.clone(),
            }),
        }
    }

    /// Color mode of `kind` with the configured glyph ramp for it.
    pub fn color_mode(&self, kind: ColorKind) -> Result<ColorMode, ConfigError> {
        let chars = self.ascii.chars.for_kind(kind);
        ColorMode::from_chars(kind, chars).map_err(|_| ConfigError::InvalidValue {
            key: "ascii.chars",
            value: chars.unwrap_or_default().to_string(),
        })
    }

    /// Background as opaque ARGB.
    pub fn background(&self) -> Result<u32, ConfigError> {
        parse_hex_color(&self.render.background).ok_or_else(|| ConfigError::InvalidValue {
            key: "render.background",
            value: self.render.background.clone(),
        })
    }

    pub fn converter_settings(&self) -> ConverterSettings {
        ConverterSettings {
            workers: self.engine.workers,
            accelerated: self.engine.accelerated,
        }
    }
}

/// Parse `#rrggbb` (leading `#` optional) to opaque ARGB.
pub fn parse_hex_color(s: &str) -> Option<u32> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().map(|rgb| 0xff00_0000 | rgb)
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {}", .path.display(), .source)]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {}", .path.display(), .source)]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("ascii-cam").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/ascii-cam/config.toml")
        })
}
