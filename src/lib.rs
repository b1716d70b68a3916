//! # Batch Resize
//!
//! Resize, and optionally re-encode, every image in a folder.
//!
//! ```text
//! input/                         output/
//! ├── dawn.jpg   (4000x3000)  →  ├── dawn.webp  (800x600)
//! ├── logo.png   (512x512)    →  ├── logo.webp  (800x800)
//! ├── notes.txt               ✗  │
//! └── raw/                    ✗  │
//! ```
//!
//! # Architecture
//!
//! One linear pass per batch:
//!
//! ```text
//! enumerate → (per file: identify → compute size → pick format → convert) → summary
//! ```
//!
//! The decisions (how big, which codec, which filename) are pure functions in
//! [`imaging`], testable without files or pixels. The pixel work sits behind
//! the [`imaging::ImageBackend`] trait so the batch logic in [`convert`] can
//! be exercised with a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`convert`] | The batch converter: file selection, per-file pipeline, error policy, summary |
//! | [`imaging`] | Target-size math, format policy, `ImageBackend` + `RustBackend` |
//! | [`config`] | `ConvertConfig`: TOML loading, validation, CLI overrides |
//! | [`prompt`] | Interactive questionnaire producing a `ConvertConfig` |
//! | [`output`] | CLI output formatting for progress events and the final tally |
//!
//! # Design Decisions
//!
//! ## One Config, Many Front Ends
//!
//! Flags, a config file, the interactive prompt and library callers all build
//! the same [`config::ConvertConfig`], which resolves into a
//! [`convert::ConversionRequest`]. The converter never knows where a setting
//! came from.
//!
//! ## Abort or Skip
//!
//! By default the first unreadable or unwritable file stops the batch, leaving
//! what was already written in place. `on_error = "skip"` isolates each file
//! instead and reports failures in the summary.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling and encoding all come from the `image`
//! crate. No system libraries, so the binary runs anywhere it is copied.

pub mod config;
pub mod convert;
pub mod imaging;
pub mod output;
pub mod prompt;
