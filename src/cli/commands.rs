//! Subcommand handlers for convert, bench and config actions.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};

use ascii_cam::ascii::{ColorKind, ColorMode};
use ascii_cam::camera::{frame_from_image, gradient_nv21, Orientation, OwnedFrame};
use ascii_cam::config::{default_path, Config, DEFAULT_CONFIG};
use ascii_cam::engine::{EngineSettings, FrameQueue, LiveEngine};
use ascii_cam::export::{write_html, write_text};

use super::args::{BenchArgs, ConfigAction, ConvertArgs};

static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

fn setup_ctrlc_handler() {
    let result = ctrlc::set_handler(move || {
        CTRLC_RECEIVED.store(true, Ordering::SeqCst);
        eprintln!("\nReceived Ctrl+C, stopping...");
    });
    if let Err(e) = result {
        log::warn!("Could not install Ctrl+C handler: {}", e);
    }
}

fn color_kind(arg: Option<super::ColorModeArg>, config: &Config) -> Result<ColorKind> {
    match arg {
        Some(arg) => Ok(arg.into()),
        None => Ok(config.color_kind()?),
    }
}

/// Convert a still image and write the requested outputs.
pub fn run_convert(args: ConvertArgs, config: &Config) -> Result<()> {
    let image = image::open(&args.input)
        .with_context(|| format!("Failed to open image '{}'", args.input.display()))?;
    let frame = frame_from_image(&image);

    let kind = color_kind(args.color_mode, config)?;
    let mut settings = EngineSettings::from_config(config)?;
    settings.color_mode = match &args.chars {
        Some(chars) => ColorMode::from_chars(kind, Some(chars.as_str())).context("Invalid --chars")?,
        None => config.color_mode(kind)?,
    };
    if let Some(width) = args.max_width {
        settings.max_width = width;
    }
    if let Some(height) = args.max_height {
        settings.max_height = height;
    }

    let mut engine = LiveEngine::new(settings)?;
    let orientation = if args.rotate {
        Orientation::Rotated180
    } else {
        Orientation::Normal
    };
    let output = engine.process_frame(&frame.view(), orientation)?;
    let grid = engine.grid();
    log::info!(
        "Converted {} ({}x{}) to {}x{} cells in {:?}",
        args.input.display(),
        frame.width,
        frame.height,
        grid.columns(),
        grid.rows(),
        output.elapsed
    );

    if let Some(path) = &args.output {
        output
            .bitmap
            .save(path)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &args.thumbnail {
        engine
            .thumbnail()?
            .save(path)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &args.text {
        write_file(path, |w| write_text(grid, w))?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &args.html {
        let title = args
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        write_file(path, |w| write_html(grid, w, &title))?;
        println!("Wrote {}", path.display());
    }

    let any_output = args.output.is_some()
        || args.thumbnail.is_some()
        || args.text.is_some()
        || args.html.is_some();
    if !any_output {
        let stdout = io::stdout();
        write_text(grid, &mut stdout.lock())?;
    }
    Ok(())
}

fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let file =
        File::create(path).with_context(|| format!("Failed to create '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).with_context(|| format!("Failed to write '{}'", path.display()))?;
    writer.flush()?;
    Ok(())
}

/// Run synthetic NV21 frames through the engine and report timing.
pub fn run_bench(args: BenchArgs, config: &Config) -> Result<()> {
    let kind = color_kind(args.color_mode, config)?;
    let mut settings = EngineSettings::from_config(config)?;
    settings.color_mode = config.color_mode(kind)?;
    if let Some(workers) = args.workers {
        settings.converter.workers = workers;
        settings.render_workers = workers;
    }
    let engine = LiveEngine::new(settings)?;
    setup_ctrlc_handler();

    println!(
        "Benchmarking {} frames of {}x{} ({} color)",
        args.frames,
        args.width,
        args.height,
        kind.name()
    );
    match args.fps {
        Some(fps) => bench_queued(engine, &args, fps.max(1)),
        None => bench_direct(engine, &args),
    }
}

fn bench_direct(mut engine: LiveEngine, args: &BenchArgs) -> Result<()> {
    let mut convert_total = Duration::ZERO;
    let mut total = Duration::ZERO;
    let mut frames = 0u32;
    let start = Instant::now();

    for i in 0..args.frames {
        if CTRLC_RECEIVED.load(Ordering::SeqCst) {
            break;
        }
        let frame = gradient_nv21(args.width, args.height, i);
        let output = engine.process_frame(&frame.view(), frame.orientation)?;
        convert_total += output.convert.elapsed;
        total += output.elapsed;
        frames += 1;
    }

    if frames == 0 {
        println!("No frames processed");
        return Ok(());
    }
    let wall = start.elapsed();
    println!("Frames:        {}", frames);
    println!("Avg convert:   {:?}", convert_total / frames);
    println!("Avg total:     {:?}", total / frames);
    println!(
        "Throughput:    {:.1} fps",
        frames as f64 / wall.as_secs_f64().max(f64::EPSILON)
    );
    Ok(())
}

fn bench_queued(mut engine: LiveEngine, args: &BenchArgs, fps: u32) -> Result<()> {
    let busy_micros = Arc::new(AtomicU64::new(0));
    let busy = Arc::clone(&busy_micros);
    let mut queue = FrameQueue::start("ascii-cam-frames", move |frame: OwnedFrame| {
        // Failures are logged by the engine
        if let Ok(output) = engine.process_frame(&frame.view(), frame.orientation) {
            busy.fetch_add(output.elapsed.as_micros() as u64, Ordering::Relaxed);
        }
    })
    .context("Failed to start frame queue thread")?;

    let interval = Duration::from_secs(1) / fps;
    let start = Instant::now();
    for i in 0..args.frames {
        if CTRLC_RECEIVED.load(Ordering::SeqCst) {
            break;
        }
        queue.push(gradient_nv21(args.width, args.height, i));
        let next = interval * (i + 1);
        if let Some(wait) = next.checked_sub(start.elapsed()) {
            thread::sleep(wait);
        }
    }
    while queue.has_pending() && !CTRLC_RECEIVED.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(5));
    }
    queue.stop();

    let processed = queue.processed();
    println!("Frames pushed:    {}", args.frames);
    println!("Frames processed: {}", processed);
    println!("Frames dropped:   {}", queue.dropped());
    if processed > 0 {
        let avg = Duration::from_micros(busy_micros.load(Ordering::Relaxed) / processed);
        println!("Avg frame time:   {:?}", avg);
    }
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, path: Option<&Path>) -> Result<()> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_path);
    match action {
        ConfigAction::Show => {
            let config = Config::load(Some(&config_path))?;
            println!("Current configuration:");
            println!();
            print!("{}", toml::to_string_pretty(&config)?);
            println!();
            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            if config_path.exists() {
                bail!(
                    "Config file already exists: {}\nUse 'ascii-cam config show' to view current settings.",
                    config_path.display()
                );
            }

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory '{}'", parent.display())
                })?;
            }
            std::fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write '{}'", config_path.display()))?;

            println!("Created config file: {}", config_path.display());
        }
    }
    Ok(())
}
