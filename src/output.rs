//! CLI output formatting for both pipeline stages.
//!
//! # Display Contract
//!
//! Every image gets one line with the same columns across stages:
//!
//! ```text
//! <file name>  <dimensions>  <source size>  <status>
//! ```
//!
//! ## Check
//!
//! ```text
//! IMG_4821.jpg  4000x3000  3.2 MB  ready
//! broken.jpg    unknown    1.1 KB  unreadable header
//! Found 2 images in images/
//! ```
//!
//! ## Run
//!
//! ```text
//! IMG_4821.jpg  4000x3000  3.2 MB  done (213.9 KB, q=87)
//! logo.png      640x640    88.0 KB  done (41.2 KB, q=95)
//! huge.png      9000x9000  61.0 MB  done (261.3 KB over budget, q=1)
//! broken.jpg    unknown    1.1 KB  error: Failed to decode image
//! Processed 3 of 4 images (1 failed)
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::process::{ImageReport, ImageStatus, ProcessSummary};
use crate::scan::Manifest;
use std::path::Path;

/// Human-readable byte size: KB below 1 MB, MB above.
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000 {
        format!("{:.1} MB", bytes as f64 / 1_000_000.0)
    } else {
        format!("{:.1} KB", bytes as f64 / 1000.0)
    }
}

fn format_dimensions(dims: Option<(u32, u32)>) -> String {
    match dims {
        Some((w, h)) => format!("{w}x{h}"),
        None => "unknown".to_string(),
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format check output: one line per discovered image plus a total.
pub fn format_check_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for image in &manifest.images {
        let readiness = if image.dimensions.is_some() {
            "ready"
        } else {
            "unreadable header"
        };
        lines.push(format!(
            "{}  {}  {}  {}",
            image.path,
            format_dimensions(image.dimensions),
            format_size(image.file_size),
            readiness
        ));
    }
    lines.push(format!(
        "Found {} images in {}",
        manifest.images.len(),
        source_root.display()
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(manifest: &Manifest, source_root: &Path) {
    for line in format_check_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Run output
// ============================================================================

/// Format a single progress report as one status line.
pub fn format_report(report: &ImageReport, max_bytes: u64) -> String {
    let status = match &report.status {
        ImageStatus::Done {
            bytes,
            quality,
            cached,
        } => {
            let size = format_size(*bytes);
            let over = *bytes > max_bytes;
            match (cached, quality, over) {
                (true, _, _) => format!("cached ({size})"),
                (false, Some(q), false) => format!("done ({size}, q={q})"),
                (false, Some(q), true) => format!("done ({size} over budget, q={q})"),
                (false, None, _) => format!("done ({size})"),
            }
        }
        ImageStatus::Failed { reason } => format!("error: {reason}"),
    };

    format!(
        "{}  {}  {}  {}",
        report.file_name,
        format_dimensions(report.dimensions),
        format_size(report.source_bytes),
        status
    )
}

/// Format the end-of-run summary line.
pub fn format_summary(summary: &ProcessSummary) -> String {
    let total = summary.reports.len();
    let ok = summary.succeeded();
    if summary.failed() > 0 {
        format!(
            "Processed {} of {} images ({} failed)",
            ok,
            total,
            summary.failed()
        )
    } else {
        format!("Processed {} images", total)
    }
}

/// Print a progress report line to stdout.
pub fn print_report(report: &ImageReport, max_bytes: u64) {
    println!("{}", format_report(report, max_bytes));
}
