//! Source directory scanning and manifest generation.
//!
//! Stage 1 of the pipeline. Walks a directory tree to discover candidate
//! images, producing a structured manifest that the process stage and the
//! `check` command consume.
//!
//! ## Directory Structure
//!
//! Any layout works; the scanner recurses and keeps relative paths:
//!
//! ```text
//! images/                          # Source root
//! ├── config.toml                  # Tool configuration (optional)
//! ├── IMG_4821.jpg
//! ├── logo.png                     # Transparency flattened on process
//! └── shoot-2024/
//!     ├── 001.webp
//!     └── 002.jpg
//! ```
//!
//! Selection is by extension only (case-insensitive): jpg, jpeg, png, webp,
//! bmp, gif. Hidden files and directories are skipped, and `config.toml`
//! falls out naturally. A file that merely has an image extension may still
//! fail to decode later; the scanner reports its header dimensions as unknown
//! and leaves the decision to the process stage, which isolates the failure
//! to that one file.

use image::image_dimensions;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Manifest output from the scan stage.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub images: Vec<SourceImage>,
}

/// A discovered source image.
///
/// Dimensions come from the file header only (no full decode); `None` means
/// the header was unreadable, which the `check` command reports as unknown
/// and the process stage later surfaces as a per-file decode error.
#[derive(Debug, Clone, Serialize)]
pub struct SourceImage {
    /// Path relative to the source root.
    pub path: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<(u32, u32)>,
    pub file_size: u64,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif"];

/// Scan a source root for images, sorted by relative path.
///
/// An empty result is not an error; the caller decides how to report it.
pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }

        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap_or(path);
        let file_name = entry.file_name().to_string_lossy().to_string();
        let file_size = entry.metadata()?.len();

        images.push(SourceImage {
            path: rel.to_string_lossy().to_string(),
            file_name,
            dimensions: image_dimensions(path).ok(),
            file_size,
        });
    }

    images.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(Manifest { images })
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}
