//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::with_guessed_format` + `into_dimensions` (header only) |
//! | Decode (JPEG, PNG, BMP, GIF, WebP) | `image` crate (pure Rust decoders) |
//! | Resample | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Drop alpha for JPEG | `DynamicImage::to_rgb8` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with explicit quality |
//! | Encode → others | `DynamicImage::write_to` with codec defaults |

use super::backend::{BackendError, Dimensions, ImageBackend, SourceInfo};
use super::format::OutputFormat;
use super::params::{ConvertParams, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// A decoded source image. Lives only for the duration of one conversion.
pub struct ImageAsset {
    pub original_width: u32,
    pub original_height: u32,
    pub source_format: OutputFormat,
    pub pixels: DynamicImage,
}

impl ImageAsset {
    /// Resample to exactly `width × height`. Deterministic for equal inputs.
    pub fn resample(&self, width: u32, height: u32) -> DynamicImage {
        self.pixels.resize_exact(width, height, FilterType::Lanczos3)
    }
}

type FileReader = ImageReader<std::io::BufReader<std::fs::File>>;

/// Open `path` with its format sniffed from content. The extension is not consulted.
fn open_reader(path: &Path) -> Result<(FileReader, OutputFormat), BackendError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader
        .format()
        .and_then(OutputFormat::from_image_format)
        .ok_or_else(|| {
            BackendError::Decode(format!("Unrecognized image format: {}", path.display()))
        })?;
    Ok((reader, format))
}

/// Load and decode an image from disk.
pub fn decode(path: &Path) -> Result<ImageAsset, BackendError> {
    let (reader, source_format) = open_reader(path)?;
    let pixels = reader.decode().map_err(|e| {
        BackendError::Decode(format!("Failed to decode {}: {}", path.display(), e))
    })?;
    Ok(ImageAsset {
        original_width: pixels.width(),
        original_height: pixels.height(),
        source_format,
        pixels,
    })
}

fn is_8bit(color: ColorType) -> bool {
    color.bytes_per_pixel() == color.channel_count()
}

/// Coerce pixel layout to something the target encoder accepts.
fn prepare_for(img: DynamicImage, format: OutputFormat) -> DynamicImage {
    let color = img.color();
    match format {
        OutputFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        OutputFormat::Gif if !matches!(color, ColorType::Rgb8 | ColorType::Rgba8) => {
            DynamicImage::ImageRgba8(img.to_rgba8())
        }
        f if f.requires_8bit() && !is_8bit(color) => {
            if color.has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            }
        }
        _ => img,
    }
}

/// Encode `img` as `format` and write it to `path`.
///
/// JPEG output is flattened to RGB and written at `quality`; every other
/// codec runs with its defaults. The file is only created once encoding has
/// succeeded, so a failed encode leaves nothing at `path`.
pub fn encode(
    img: DynamicImage,
    format: OutputFormat,
    path: &Path,
    quality: Quality,
) -> Result<(), BackendError> {
    let prepared = prepare_for(img, format);
    let mut buffer = Cursor::new(Vec::new());

    let result = if format.is_jpeg_family() {
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.value() as u8);
        prepared.write_with_encoder(encoder)
    } else {
        prepared.write_to(&mut buffer, format.image_format())
    };
    result.map_err(|e| {
        BackendError::Encode(format!("{} encode of {} failed: {}", format, path.display(), e))
    })?;

    std::fs::write(path, buffer.into_inner())?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<SourceInfo, BackendError> {
        let (reader, format) = open_reader(path)?;
        let (width, height) = reader.into_dimensions().map_err(|e| {
            BackendError::Decode(format!("Failed to read dimensions of {}: {}", path.display(), e))
        })?;
        Ok(SourceInfo {
            dimensions: Dimensions { width, height },
            format,
        })
    }

    fn convert(&self, params: &ConvertParams) -> Result<(), BackendError> {
        let asset = decode(&params.source)?;
        let resized = asset.resample(params.width, params.height);
        drop(asset);
        encode(resized, params.format, &params.output, params.quality)
    }
}
