//! End-to-end pipeline tests: scan a real directory, process it, and check
//! the written JPEGs.

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use squarepack::config::Config;
use squarepack::imaging::{ImageCodec, JpegCodec};
use squarepack::process::{self, ImageStatus};
use squarepack::scan;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_gradient_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 255) / width.max(1)) as u8,
            ((y * 255) / height.max(1)) as u8,
            96,
        ])
    });
    img.save(path).unwrap();
}

fn test_config(side: u32, max_bytes: u64) -> Config {
    let mut config = Config::default();
    config.output.dimensions = [side, side];
    config.output.max_bytes = max_bytes;
    config
}

#[test]
fn full_pipeline_produces_uniform_jpegs() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("images");
    let output = tmp.path().join("resized");
    let sub = source.join("shoot");
    fs::create_dir_all(&sub).unwrap();

    write_gradient_jpeg(&source.join("landscape.jpg"), 400, 300);
    write_gradient_jpeg(&source.join("portrait.jpg"), 150, 260);
    write_gradient_jpeg(&sub.join("nested.jpg"), 200, 200);

    let manifest = scan::scan(&source).unwrap();
    assert_eq!(manifest.images.len(), 3);

    let config = test_config(120, 256_000);
    let summary = process::process(&manifest, &source, &output, &config, false, None).unwrap();
    assert_eq!(summary.succeeded(), 3);
    assert_eq!(summary.failed(), 0);

    let codec = JpegCodec::new();
    for name in ["landscape.jpg", "portrait.jpg", "nested.jpg"] {
        let bytes = fs::read(output.join(name)).unwrap();
        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 120), "{name}");
        assert!(bytes.len() as u64 <= 256_000, "{name} over budget");
    }
}

#[test]
fn generous_budget_reaches_top_quality() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("images");
    let output = tmp.path().join("resized");
    fs::create_dir_all(&source).unwrap();
    write_gradient_jpeg(&source.join("smooth.jpg"), 300, 300);

    let manifest = scan::scan(&source).unwrap();
    // A small smooth gradient compresses far below any sane budget at q=95
    let config = test_config(64, 10_000_000);
    let summary = process::process(&manifest, &source, &output, &config, false, None).unwrap();

    match &summary.reports[0].status {
        ImageStatus::Done { quality, .. } => assert_eq!(*quality, Some(95)),
        other => panic!("expected success, got {other:?}"),
    }
}

#[test]
fn unattainable_budget_still_writes_output() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("images");
    let output = tmp.path().join("resized");
    fs::create_dir_all(&source).unwrap();

    // Noise compresses poorly; 1 byte is unattainable at any quality
    let mut seed = 0x2545_F491u32;
    let noisy = RgbImage::from_fn(256, 256, |_, _| {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        Rgb([(seed >> 8) as u8, (seed >> 16) as u8, (seed >> 24) as u8])
    });
    noisy.save(source.join("noise.png")).unwrap();

    let manifest = scan::scan(&source).unwrap();
    let config = test_config(128, 1);
    let summary = process::process(&manifest, &source, &output, &config, false, None).unwrap();

    assert_eq!(summary.succeeded(), 1);
    match &summary.reports[0].status {
        ImageStatus::Done { quality, bytes, .. } => {
            assert_eq!(*quality, Some(1));
            assert!(*bytes > 1);
        }
        other => panic!("expected success, got {other:?}"),
    }
    assert!(output.join("noise.jpg").exists());
}

#[test]
fn transparent_png_flattens_to_white_jpeg() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("images");
    let output = tmp.path().join("resized");
    fs::create_dir_all(&source).unwrap();

    let rgba = RgbaImage::from_pixel(200, 200, Rgba([40, 40, 200, 0]));
    rgba.save(source.join("ghost.png")).unwrap();

    let manifest = scan::scan(&source).unwrap();
    let config = test_config(80, 256_000);
    let summary = process::process(&manifest, &source, &output, &config, false, None).unwrap();
    assert_eq!(summary.succeeded(), 1);

    let bytes = fs::read(output.join("ghost.jpg")).unwrap();
    let decoded = JpegCodec::new().decode(&bytes).unwrap().to_rgb8();
    let [r, g, b] = decoded.get_pixel(40, 40).0;
    assert!(r > 248 && g > 248 && b > 248, "expected white, got {r},{g},{b}");
}

#[test]
fn broken_source_reported_without_stopping_batch() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("images");
    let output = tmp.path().join("resized");
    fs::create_dir_all(&source).unwrap();

    write_gradient_jpeg(&source.join("fine.jpg"), 100, 100);
    fs::write(source.join("trap.jpg"), b"<html>404 not found</html>").unwrap();

    let manifest = scan::scan(&source).unwrap();
    let config = test_config(64, 256_000);
    let summary = process::process(&manifest, &source, &output, &config, false, None).unwrap();

    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.failed(), 1);
    assert!(output.join("fine.jpg").exists());
    assert!(!output.join("trap.jpg").exists());
}

#[test]
fn rerun_with_cache_skips_unchanged_sources() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("images");
    let output = tmp.path().join("resized");
    fs::create_dir_all(&source).unwrap();
    write_gradient_jpeg(&source.join("a.jpg"), 150, 150);
    write_gradient_jpeg(&source.join("b.jpg"), 150, 150);

    let config = test_config(64, 256_000);

    let manifest = scan::scan(&source).unwrap();
    let first = process::process(&manifest, &source, &output, &config, true, None).unwrap();
    assert_eq!(first.cache_stats.misses, 2);

    // Touch one source with different content
    write_gradient_jpeg(&source.join("a.jpg"), 160, 150);

    let manifest = scan::scan(&source).unwrap();
    let second = process::process(&manifest, &source, &output, &config, true, None).unwrap();
    assert_eq!(second.cache_stats.hits, 1);
    assert_eq!(second.cache_stats.misses, 1);
}
