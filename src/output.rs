//! CLI output formatting.
//!
//! # Output Format
//!
//! ```text
//! Converting 3 images
//!     dawn.jpg → out/dawn.webp (800x533 WEBP)
//!     dusk.png → out/dusk.webp (533x800 WEBP)
//!     broken.jpg: FAILED Decode failed: ...
//!
//! Converted 2 images, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each kind of output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure and do no I/O.

use crate::convert::{BatchSummary, ConvertEvent};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Format a single conversion progress event as display lines.
pub fn format_convert_event(event: &ConvertEvent) -> Vec<String> {
    match event {
        ConvertEvent::Started { total } => {
            vec![format!("Converting {}", plural(*total, "image"))]
        }
        ConvertEvent::Converted {
            source,
            output,
            width,
            height,
            format,
        } => vec![format!(
            "{}{} → {} ({}x{} {})",
            indent(1),
            source,
            output.display(),
            width,
            height,
            format
        )],
        ConvertEvent::Failed { source, error } => {
            vec![format!("{}{}: FAILED {}", indent(1), source, error)]
        }
    }
}

/// Format the end-of-batch tally.
pub fn format_summary(summary: &BatchSummary) -> Vec<String> {
    let mut lines = vec![String::new()];
    if summary.failed == 0 {
        lines.push(format!("Converted {}", plural(summary.processed, "image")));
    } else {
        lines.push(format!(
            "Converted {}, {} failed",
            plural(summary.processed, "image"),
            summary.failed
        ));
        for result in summary.results.iter().filter(|r| r.error.is_some()) {
            lines.push(format!(
                "{}{}: {}",
                indent(1),
                result.source,
                result.error.as_deref().unwrap_or_default()
            ));
        }
    }
    lines
}

pub fn print_convert_event(event: &ConvertEvent) {
    for line in format_convert_event(event) {
        println!("{}", line);
    }
}

pub fn print_summary(summary: &BatchSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
