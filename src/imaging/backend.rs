//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the batch converter
//! needs: identify (cheap header read) and convert (decode, resample, encode).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` below.

use super::format::OutputFormat;
use super::params::ConvertParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// What the converter needs to know about a source before converting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub dimensions: Dimensions,
    pub format: OutputFormat,
}

/// Trait for image processing backends.
///
/// `Sync` so a single backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Read dimensions and the sniffed format without decoding pixels.
    fn identify(&self, path: &Path) -> Result<SourceInfo, BackendError>;

    /// Decode `params.source`, resample to the target size, write `params.output`.
    fn convert(&self, params: &ConvertParams) -> Result<(), BackendError>;
}
