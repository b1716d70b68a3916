//! Image processing in pure Rust, built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` (header only) |
//! | **Target size** | [`compute_target_size`] (pure) |
//! | **Output format** | [`determine_output_format`], [`output_file_name`] (pure) |
//! | **Convert** | decode → Lanczos3 `resize_exact` → encode |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Format**: Output codec and filename policy (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod format;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, SourceInfo};
pub use calculations::{MAX_TARGET_EDGE, SizePolicy, compute_target_size};
pub use format::{
    OutputFormat, RequestedFormat, SUPPORTED_INPUT_EXTENSIONS, UnsupportedFormat,
    determine_output_format, is_supported_input, output_file_name,
};
pub use params::{ConvertParams, Quality};
pub use rust_backend::{ImageAsset, RustBackend};
