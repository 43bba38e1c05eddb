//! End-to-end tests for the live pipeline.
//!
//! Frames flow from a producer through the [`FrameQueue`] into a
//! [`LiveEngine`], and the resulting grid is exported as text and HTML.

use std::sync::mpsc;
use std::time::Duration;

use ascii_cam::ascii::{ColorKind, ColorMode, ConverterSettings, Grid};
use ascii_cam::camera::{gradient_nv21, solid_nv21, Orientation, OwnedFrame};
use ascii_cam::config::Config;
use ascii_cam::engine::{EngineError, EngineSettings, FrameQueue, LiveEngine};
use ascii_cam::export::{write_html, write_text};

fn settings(kind: ColorKind) -> EngineSettings {
    EngineSettings {
        converter: ConverterSettings {
            workers: 3,
            accelerated: true,
        },
        render_workers: 3,
        color_mode: ColorMode::default_for(kind),
        max_width: 640,
        max_height: 400,
        ..EngineSettings::default()
    }
}

fn text(grid: &Grid) -> String {
    let mut out = Vec::new();
    write_text(grid, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

// ==================== Pipeline Tests ====================

#[test]
fn test_flat_frame_through_pipeline() {
    let mut engine = LiveEngine::new(settings(ColorKind::None)).unwrap();
    let frame = solid_nv21(640, 400, 128, 128, 128);
    let output = engine.process_frame(&frame.view(), Orientation::Normal).unwrap();

    assert_eq!((output.bitmap.width(), output.bitmap.height()), (640, 400));
    let grid = engine.grid();
    assert_eq!((grid.rows(), grid.columns()), (44, 91));
    assert!(grid.glyph_indices().iter().all(|&g| g == 3));

    let thumb = engine.thumbnail().unwrap();
    assert_eq!((thumb.width(), thumb.height()), (160, 100));

    let text = text(grid);
    assert_eq!(text.lines().count(), 44);
    assert!(text.lines().all(|l| l == "o".repeat(91)));
}

#[test]
fn test_queue_feeds_engine() {
    let (tx, rx) = mpsc::channel();
    let mut engine = LiveEngine::new(settings(ColorKind::AnsiQuantized)).unwrap();
    let mut queue = FrameQueue::start("e2e-frames", move |frame: OwnedFrame| {
        let result = engine
            .process_frame(&frame.view(), frame.orientation)
            .map(|_| engine.grid().clone());
        tx.send(result).unwrap();
    })
    .unwrap();

    queue.push(gradient_nv21(320, 200, 0));
    let upright = rx.recv_timeout(Duration::from_secs(10)).unwrap().unwrap();
    queue.push(gradient_nv21(320, 200, 0).with_orientation(Orientation::Rotated180));
    let flipped = rx.recv_timeout(Duration::from_secs(10)).unwrap().unwrap();

    let mut expected = upright.clone();
    expected.rotate_180();
    assert_eq!(flipped, expected);
    for &c in upright.colors().unwrap() {
        assert!([(c >> 16) & 0xff, (c >> 8) & 0xff, c & 0xff]
            .iter()
            .all(|&b| b == 0 || b == 0xff));
    }

    queue.stop();
    assert_eq!(queue.processed(), 2);
}

#[test]
fn test_bad_frame_between_good_ones() {
    let mut engine = LiveEngine::new(settings(ColorKind::FullColor)).unwrap();
    let good = gradient_nv21(320, 240, 4);
    engine.process_frame(&good.view(), Orientation::Normal).unwrap();
    let grid = engine.grid().clone();
    let bitmap = engine.visible_bitmap().unwrap();

    let truncated = OwnedFrame {
        data: good.data[..100].to_vec(),
        ..good.clone()
    };
    assert!(matches!(
        engine.process_frame(&truncated.view(), Orientation::Normal),
        Err(EngineError::Convert(_))
    ));
    assert_eq!(engine.grid(), &grid);
    assert_eq!(engine.visible_bitmap().unwrap().pixels(), bitmap.pixels());

    engine.process_frame(&good.view(), Orientation::Normal).unwrap();
    assert_eq!(engine.stats().frames, 2);
    assert_eq!(engine.stats().failed, 1);
}

#[test]
fn test_source_size_change_refits_layout() {
    let mut engine = LiveEngine::new(settings(ColorKind::None)).unwrap();
    engine
        .process_frame(&gradient_nv21(640, 480, 0).view(), Orientation::Normal)
        .unwrap();
    let landscape = engine.layout().unwrap();
    assert_eq!((landscape.width(), landscape.height()), (533, 400));

    engine
        .process_frame(&gradient_nv21(480, 640, 0).view(), Orientation::Normal)
        .unwrap();
    let portrait = engine.layout().unwrap();
    assert_eq!((portrait.width(), portrait.height()), (300, 400));
    assert_eq!(engine.grid().columns(), portrait.columns());
}

// ==================== Export Tests ====================

#[test]
fn test_html_export_of_live_grid() {
    let mut engine = LiveEngine::new(settings(ColorKind::FullColor)).unwrap();
    let frame = solid_nv21(64, 40, 200, 90, 200);
    engine.process_frame(&frame.view(), Orientation::Normal).unwrap();

    let mut out = Vec::new();
    write_html(engine.grid(), &mut out, "live").unwrap();
    let html = String::from_utf8(out).unwrap();
    assert!(html.starts_with("<html><head><title>Ascii Picture live</title>"));
    assert!(html.contains("<span style=\"color:#"));
    assert_eq!(html.matches("</span>\n").count(), engine.grid().rows());
}

// ==================== Config Tests ====================

#[test]
fn test_engine_from_config_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        r#"
[engine]
workers = 2

[ascii]
color_mode = "none"

[ascii.chars]
none = " #"

[render]
max_width = 140
max_height = 90
"#,
    )
    .unwrap();

    let config = Config::load_from_explicit(file.path()).unwrap();
    let mut engine = LiveEngine::new(EngineSettings::from_config(&config).unwrap()).unwrap();
    engine
        .process_frame(&solid_nv21(140, 90, 255, 128, 128).view(), Orientation::Normal)
        .unwrap();
    assert_eq!(text(engine.grid()), format!("{}\n", "#".repeat(20)).repeat(10));
}
