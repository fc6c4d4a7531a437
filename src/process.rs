//! Batch image processing.
//!
//! Stage 2 of the pipeline. Takes the manifest from the scan stage and runs
//! every image through decode → flatten → cover resize → center crop →
//! budget-constrained JPEG encode, writing one `<stem>.jpg` per source into
//! a flat output directory.
//!
//! ## Failure isolation
//!
//! A broken source file (truncated download, wrong extension, unsupported
//! color mode) fails only its own image: the report for that file carries the
//! error and the rest of the batch proceeds. Only environmental problems
//! (output directory not creatable, cache manifest unwritable) abort the run.
//!
//! ## Output Structure
//!
//! ```text
//! resized/
//! ├── .cache-manifest.json       # Processing cache (see cache module)
//! ├── IMG_4821.jpg
//! ├── logo.jpg                   # logo.png, flattened and re-encoded
//! └── 001.jpg
//! ```
//!
//! Output names are flat: `<stem>.jpg` regardless of the source subdirectory
//! or container format. Two sources with the same stem collide; last writer
//! wins, matching a plain shell loop over the same tree.
//!
//! ## Parallel Processing
//!
//! Images are processed in parallel using [rayon](https://docs.rs/rayon).
//! Each worker owns its decode and encode buffers; cache entries are
//! collected per-image and merged after the parallel section.

use crate::cache::{self, CacheManifest, CacheStats};
use crate::config::Config;
use crate::imaging::{normalize, compress_to_budget, ImageCodec, JpegCodec};
use crate::scan::{Manifest, SourceImage};
use rayon::prelude::*;
use std::path::Path;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome for one source image.
#[derive(Debug, Clone)]
pub enum ImageStatus {
    Done {
        bytes: u64,
        /// Resolved encode quality; `None` when served from cache (the
        /// manifest does not record it).
        quality: Option<u8>,
        cached: bool,
    },
    Failed {
        reason: String,
    },
}

/// Progress report for one source image, sent as each finishes.
#[derive(Debug, Clone)]
pub struct ImageReport {
    pub file_name: String,
    pub dimensions: Option<(u32, u32)>,
    pub source_bytes: u64,
    pub status: ImageStatus,
}

/// Result of a processing run.
#[derive(Debug)]
pub struct ProcessSummary {
    pub reports: Vec<ImageReport>,
    pub cache_stats: CacheStats,
}

impl ProcessSummary {
    pub fn succeeded(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.status, ImageStatus::Done { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.succeeded()
    }
}

pub fn process(
    manifest: &Manifest,
    source_root: &Path,
    output_dir: &Path,
    config: &Config,
    use_cache: bool,
    progress: Option<Sender<ImageReport>>,
) -> Result<ProcessSummary, ProcessError> {
    let codec = JpegCodec::new();
    process_with_codec(
        &codec,
        manifest,
        source_root,
        output_dir,
        config,
        use_cache,
        progress,
    )
}

/// Per-image result carried out of the parallel section.
struct ImageOutcome {
    report: ImageReport,
    cache_entry: Option<(String, String, String)>, // (output_path, source_hash, params_hash)
    cache_hit: bool,
}

/// Process images using a specific codec (allows testing with a scripted one).
pub fn process_with_codec(
    codec: &impl ImageCodec,
    manifest: &Manifest,
    source_root: &Path,
    output_dir: &Path,
    config: &Config,
    use_cache: bool,
    progress: Option<Sender<ImageReport>>,
) -> Result<ProcessSummary, ProcessError> {
    std::fs::create_dir_all(output_dir)?;

    let cache_manifest = if use_cache {
        CacheManifest::load(output_dir)
    } else {
        CacheManifest::empty()
    };

    let target = config.target();
    let opts = config.encode_options();
    let params_hash = cache::hash_params((target.width, target.height), &opts);

    let outcomes: Vec<ImageOutcome> = manifest
        .images
        .par_iter()
        .map(|image| {
            let outcome = process_one(
                codec,
                image,
                source_root,
                output_dir,
                config,
                &cache_manifest,
                &params_hash,
            );
            if let Some(tx) = &progress {
                // Receiver hangup just means nobody is listening
                let _ = tx.send(outcome.report.clone());
            }
            outcome
        })
        .collect();

    drop(progress);

    let mut stats = CacheStats::default();
    let mut updated = cache_manifest;
    for outcome in &outcomes {
        if matches!(outcome.report.status, ImageStatus::Done { .. }) {
            if outcome.cache_hit {
                stats.hit();
            } else {
                stats.miss();
            }
        }
        if let Some((output_path, source_hash, params)) = &outcome.cache_entry {
            updated.insert(output_path.clone(), source_hash.clone(), params.clone());
        }
    }

    if use_cache {
        updated.save(output_dir)?;
    }

    Ok(ProcessSummary {
        reports: outcomes.into_iter().map(|o| o.report).collect(),
        cache_stats: stats,
    })
}

/// Process a single source image; never fails the batch.
fn process_one(
    codec: &impl ImageCodec,
    image: &SourceImage,
    source_root: &Path,
    output_dir: &Path,
    config: &Config,
    cache_manifest: &CacheManifest,
    params_hash: &str,
) -> ImageOutcome {
    let source_path = source_root.join(&image.path);
    let output_name = output_file_name(&image.file_name, codec.extension());

    let report = |status| ImageReport {
        file_name: image.file_name.clone(),
        dimensions: image.dimensions,
        source_bytes: image.file_size,
        status,
    };
    let failed = |reason: String| ImageOutcome {
        report: report(ImageStatus::Failed { reason }),
        cache_entry: None,
        cache_hit: false,
    };

    let source_hash = match cache::hash_file(&source_path) {
        Ok(h) => h,
        Err(e) => return failed(format!("cannot read source: {e}")),
    };

    if cache_manifest.is_fresh(&output_name, &source_hash, params_hash, output_dir) {
        let bytes = std::fs::metadata(output_dir.join(&output_name))
            .map(|m| m.len())
            .unwrap_or(0);
        return ImageOutcome {
            report: report(ImageStatus::Done {
                bytes,
                quality: None,
                cached: true,
            }),
            cache_entry: None,
            cache_hit: true,
        };
    }

    let source_bytes = match std::fs::read(&source_path) {
        Ok(b) => b,
        Err(e) => return failed(format!("cannot read source: {e}")),
    };

    let decoded = match codec.decode(&source_bytes) {
        Ok(img) => img,
        Err(e) => return failed(e.to_string()),
    };

    let normalized = match normalize(&decoded, config.target()) {
        Ok(img) => img,
        Err(e) => return failed(e.to_string()),
    };

    let encoded = match compress_to_budget(codec, &normalized, &config.encode_options()) {
        Ok(enc) => enc,
        Err(e) => return failed(e.to_string()),
    };

    if let Err(e) = std::fs::write(output_dir.join(&output_name), &encoded.bytes) {
        return failed(format!("cannot write output: {e}"));
    }

    ImageOutcome {
        report: report(ImageStatus::Done {
            bytes: encoded.bytes.len() as u64,
            quality: Some(encoded.quality.value()),
            cached: false,
        }),
        cache_entry: Some((output_name, source_hash, params_hash.to_string())),
        cache_hit: false,
    }
}

/// Output file name for a source: `<stem>.<ext>`, flat.
fn output_file_name(source_name: &str, ext: &str) -> String {
    let stem = Path::new(source_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| source_name.to_string());
    format!("{stem}.{ext}")
}
