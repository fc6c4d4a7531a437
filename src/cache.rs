//! Processing cache for incremental runs.
//!
//! Decoding, Lanczos resampling, and the multi-probe quality search make each
//! image cost several encodes. This module lets the process stage skip a
//! source file entirely when nothing that affects its output has changed
//! since the last run.
//!
//! ## Cache keys
//!
//! The cache is content-addressed: lookups are by the combination of
//! `source_hash` and `params_hash`, not by modification time.
//!
//! - **`source_hash`**: SHA-256 of the source file contents. Content-based
//!   rather than mtime-based so it survives `git checkout` (which resets
//!   modification times).
//!
//! - **`params_hash`**: SHA-256 of everything that shapes the output: target
//!   dimensions, byte budget, quality range, starting quality, and step. Any
//!   config change re-processes every image.
//!
//! A cache hit requires a matching entry **and** the previously-written
//! output file still on disk.
//!
//! ## Storage
//!
//! The manifest is a JSON file at `<output_dir>/.cache-manifest.json`. It
//! lives alongside the processed images so it travels with the output
//! directory.
//!
//! ## Bypassing
//!
//! `--no-cache` loads an empty manifest, so every image is re-processed and
//! old outputs are overwritten naturally.

use crate::imaging::EncodeOptions;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;

/// Name of the cache manifest file within the output directory.
const MANIFEST_FILENAME: &str = ".cache-manifest.json";

/// Version of the cache manifest format. Bump this to invalidate all
/// existing caches when the format or key computation changes.
const MANIFEST_VERSION: u32 = 1;

/// A single cached output file, keyed by its output-relative path.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
}

/// On-disk cache manifest mapping output paths to their cache entries.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
}

impl CacheManifest {
    /// Create an empty manifest (used for `--no-cache` or a first run).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the output directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(output_dir: &Path) -> Self {
        let path = output_dir.join(MANIFEST_FILENAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => return Self::empty(),
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    /// Save to the output directory.
    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let path = output_dir.join(MANIFEST_FILENAME);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Whether the output at `output_path` is current for the given hashes.
    ///
    /// Requires both a matching entry and the file still on disk.
    pub fn is_fresh(
        &self,
        output_path: &str,
        source_hash: &str,
        params_hash: &str,
        output_dir: &Path,
    ) -> bool {
        match self.entries.get(output_path) {
            Some(entry) => {
                entry.source_hash == source_hash
                    && entry.params_hash == params_hash
                    && output_dir.join(output_path).exists()
            }
            None => false,
        }
    }

    /// Record a cache entry for an output file.
    pub fn insert(&mut self, output_path: String, source_hash: String, params_hash: String) {
        self.entries.insert(
            output_path,
            CacheEntry {
                source_hash,
                params_hash,
            },
        );
    }
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// SHA-256 hash of the processing parameters.
///
/// Covers everything between source bytes and output bytes: target
/// dimensions, byte budget, quality range, starting quality, and step.
pub fn hash_params(target: (u32, u32), opts: &EncodeOptions) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"squarepack\0");
    hasher.update(target.0.to_le_bytes());
    hasher.update(target.1.to_le_bytes());
    hasher.update(opts.max_bytes.to_le_bytes());
    hasher.update([opts.range.min, opts.range.max, opts.start.value(), opts.step]);
    format!("{:x}", hasher.finalize())
}

/// Summary of cache performance for a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} processed ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} processed", self.misses)
        }
    }
}
