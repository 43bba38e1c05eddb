//! CLI argument parsing with clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use super::enums::ColorModeArg;

/// Convert camera frames and images to ASCII art
#[derive(Parser, Debug)]
#[command(name = "ascii-cam")]
#[command(version, about = "Camera frames and images to ASCII art", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert an image to ASCII art
    Convert(ConvertArgs),
    /// Run synthetic camera frames through the live engine
    Bench(BenchArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug)]
pub struct ConvertArgs {
    /// Input image (PNG or JPEG)
    pub input: PathBuf,

    /// Rendered PNG output
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Quarter-size block thumbnail PNG
    #[arg(long)]
    pub thumbnail: Option<PathBuf>,

    /// Plain text output
    #[arg(long)]
    pub text: Option<PathBuf>,

    /// HTML output
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Color mode (default: from config)
    #[arg(long)]
    pub color_mode: Option<ColorModeArg>,

    /// Glyph ramp, darkest first
    #[arg(long)]
    pub chars: Option<String>,

    /// Maximum output width in pixels
    #[arg(long)]
    pub max_width: Option<u32>,

    /// Maximum output height in pixels
    #[arg(long)]
    pub max_height: Option<u32>,

    /// Rotate 180 degrees
    #[arg(long)]
    pub rotate: bool,
}

#[derive(clap::Args, Debug)]
pub struct BenchArgs {
    /// Frame width
    #[arg(long, default_value = "640")]
    pub width: u32,

    /// Frame height
    #[arg(long, default_value = "480")]
    pub height: u32,

    /// Number of frames
    #[arg(long, default_value = "100")]
    pub frames: u32,

    /// Color mode (default: from config)
    #[arg(long)]
    pub color_mode: Option<ColorModeArg>,

    /// Worker threads (default: from config)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Feed frames through the frame queue at this rate instead of back to back
    #[arg(long)]
    pub fps: Option<u32>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_defaults() {
        let args = Args::parse_from(["ascii-cam", "convert", "photo.jpg"]);
        let Command::Convert(convert) = args.command else {
            panic!("Expected Convert subcommand");
        };
        assert_eq!(convert.input, PathBuf::from("photo.jpg"));
        assert!(convert.output.is_none());
        assert!(convert.thumbnail.is_none());
        assert!(convert.text.is_none());
        assert!(convert.html.is_none());
        assert!(convert.color_mode.is_none());
        assert!(convert.chars.is_none());
        assert!(!convert.rotate);
        assert!(args.config.is_none());
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_convert_all_options() {
        let args = Args::parse_from([
            "ascii-cam",
            "convert",
            "in.png",
            "-o",
            "out.png",
            "--thumbnail",
            "thumb.png",
            "--text",
            "out.txt",
            "--html",
            "out.html",
            "--color-mode",
            "full",
            "--chars",
            " .#",
            "--max-width",
            "1024",
            "--max-height",
            "768",
            "--rotate",
        ]);
        let Command::Convert(convert) = args.command else {
            panic!("Expected Convert subcommand");
        };
        assert_eq!(convert.output, Some(PathBuf::from("out.png")));
        assert_eq!(convert.thumbnail, Some(PathBuf::from("thumb.png")));
        assert_eq!(convert.text, Some(PathBuf::from("out.txt")));
        assert_eq!(convert.html, Some(PathBuf::from("out.html")));
        assert_eq!(convert.color_mode, Some(ColorModeArg::Full));
        assert_eq!(convert.chars.as_deref(), Some(" .#"));
        assert_eq!(convert.max_width, Some(1024));
        assert_eq!(convert.max_height, Some(768));
        assert!(convert.rotate);
    }

    #[test]
    fn test_color_mode_values() {
        for (name, expected) in [
            ("none", ColorModeArg::None),
            ("ansi", ColorModeArg::Ansi),
            ("full", ColorModeArg::Full),
        ] {
            let args = Args::parse_from(["ascii-cam", "convert", "x.png", "--color-mode", name]);
            let Command::Convert(convert) = args.command else {
                panic!("Expected Convert subcommand");
            };
            assert_eq!(convert.color_mode, Some(expected));
        }
    }

    #[test]
    fn test_invalid_color_mode_rejected() {
        let result = Args::try_parse_from(["ascii-cam", "convert", "x.png", "--color-mode", "sepia"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bench_defaults() {
        let args = Args::parse_from(["ascii-cam", "bench"]);
        let Command::Bench(bench) = args.command else {
            panic!("Expected Bench subcommand");
        };
        assert_eq!(bench.width, 640);
        assert_eq!(bench.height, 480);
        assert_eq!(bench.frames, 100);
        assert!(bench.workers.is_none());
        assert!(bench.fps.is_none());
    }

    #[test]
    fn test_bench_options() {
        let args = Args::parse_from([
            "ascii-cam", "bench", "--width", "1280", "--height", "720", "--frames", "10",
            "--workers", "4", "--fps", "30", "--color-mode", "none",
        ]);
        let Command::Bench(bench) = args.command else {
            panic!("Expected Bench subcommand");
        };
        assert_eq!((bench.width, bench.height, bench.frames), (1280, 720, 10));
        assert_eq!(bench.workers, Some(4));
        assert_eq!(bench.fps, Some(30));
        assert_eq!(bench.color_mode, Some(ColorModeArg::None));
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = Args::parse_from(["ascii-cam", "bench", "-vv", "--config", "/tmp/c.toml"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));

        let args = Args::parse_from(["ascii-cam", "-c", "/tmp/test.toml", "config", "show"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
    }

    #[test]
    fn test_config_subcommands() {
        let args = Args::parse_from(["ascii-cam", "config", "show"]);
        match args.command {
            Command::Config {
                action: ConfigAction::Show,
            } => (),
            _ => panic!("Expected Config Show subcommand"),
        }

        let args = Args::parse_from(["ascii-cam", "config", "init"]);
        match args.command {
            Command::Config {
                action: ConfigAction::Init,
            } => (),
            _ => panic!("Expected Config Init subcommand"),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["ascii-cam"]).is_err());
    }
}
