//! Output format policy.
//!
//! Decides which codec each output is written with and what the output file
//! is called. Pure functions only; the backend does the encoding.
//!
//! ## Extension rule
//!
//! | Request | Source | Output name |
//! |---|---|---|
//! | none | `photo.JPG` (JPEG) | `photo.jpg` |
//! | none | `photo.jpg` (PNG) | `photo.png` |
//! | `WEBP` | `photo.png` (PNG) | `photo.webp` |
//! | `jpg` | `photo.png` (PNG) | `photo.jpg` |
//! | `JPEG` | `photo.png` (PNG) | `photo.jpeg` |
//!
//! With a requested format the extension is the requested name lowercased and
//! the source extension is dropped entirely. Without one the source extension
//! is kept as long as it names the codec the file actually contains;
//! otherwise the codec's own name is used.

use image::ImageFormat;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Input extensions picked up by the batch converter.
pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp"];

/// True if `path` has one of [`SUPPORTED_INPUT_EXTENSIONS`] (case-insensitive).
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_INPUT_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported output format: {0}")]
pub struct UnsupportedFormat(pub String);

/// Codecs the converter can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Bmp,
    Gif,
    WebP,
    Tiff,
}

impl OutputFormat {
    /// Parse a user-supplied format name (`"JPEG"`, `"jpg"`, `"webp"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::WebP),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    /// Map a detected `image` crate format; `None` for formats we cannot write.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Bmp => Some(Self::Bmp),
            ImageFormat::Gif => Some(Self::Gif),
            ImageFormat::WebP => Some(Self::WebP),
            ImageFormat::Tiff => Some(Self::Tiff),
            _ => None,
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Bmp => ImageFormat::Bmp,
            Self::Gif => ImageFormat::Gif,
            Self::WebP => ImageFormat::WebP,
            Self::Tiff => ImageFormat::Tiff,
        }
    }

    /// JPEG has no alpha channel and takes a quality setting.
    pub fn is_jpeg_family(self) -> bool {
        matches!(self, Self::Jpeg)
    }

    /// Encoders that only accept 8-bit samples.
    pub fn requires_8bit(self) -> bool {
        matches!(self, Self::Jpeg | Self::Bmp | Self::Gif | Self::WebP)
    }

    /// Lowercased codec name, used as the extension when the source's own
    /// extension does not match its content.
    pub fn extension(self) -> String {
        self.name().to_ascii_lowercase()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Bmp => "BMP",
            Self::Gif => "GIF",
            Self::WebP => "WEBP",
            Self::Tiff => "TIFF",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A format override as the user spelled it.
///
/// The spelling matters: `"JPG"` and `"JPEG"` encode the same way but produce
/// `.jpg` and `.jpeg` files respectively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedFormat {
    pub format: OutputFormat,
    pub extension: String,
}

impl RequestedFormat {
    pub fn parse(name: &str) -> Result<Self, UnsupportedFormat> {
        let trimmed = name.trim();
        let format =
            OutputFormat::from_name(trimmed).ok_or_else(|| UnsupportedFormat(trimmed.into()))?;
        Ok(Self {
            format,
            extension: trimmed.to_ascii_lowercase(),
        })
    }
}

/// The codec chosen for one output: the request if present, else the source's.
pub fn determine_output_format(
    source: OutputFormat,
    requested: Option<&RequestedFormat>,
) -> OutputFormat {
    requested.map(|r| r.format).unwrap_or(source)
}

/// Output filename for `source_name` under the extension rule above.
///
/// `source_format` is the codec detected in the source file's content.
///
/// ```
/// # use batch_resize::imaging::{OutputFormat, RequestedFormat, output_file_name};
/// let webp = RequestedFormat::parse("WEBP").unwrap();
/// assert_eq!(output_file_name("cat.png", OutputFormat::Png, Some(&webp)), "cat.webp");
/// assert_eq!(output_file_name("cat.PNG", OutputFormat::Png, None), "cat.png");
/// assert_eq!(output_file_name("cat.jpg", OutputFormat::Png, None), "cat.png");
/// ```
pub fn output_file_name(
    source_name: &str,
    source_format: OutputFormat,
    requested: Option<&RequestedFormat>,
) -> String {
    let path = Path::new(source_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_name.to_string());

    let extension = match requested {
        Some(r) => r.extension.clone(),
        None => path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .filter(|ext| OutputFormat::from_name(ext) == Some(source_format))
            .unwrap_or_else(|| source_format.extension()),
    };

    format!("{stem}.{extension}")
}
