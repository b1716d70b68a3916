//! Conversion configuration.
//!
//! Every way of starting a batch (CLI flags, a `config.toml`, the interactive
//! prompt, a library call) ends up in the same [`ConvertConfig`]. Stock
//! defaults are overridden by the config file, which is overridden by flags.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # width = 1200          # Explicit output width (source width if unset)
//! # height = 800          # Explicit output height (source height if unset)
//! # max_dimension = 800   # Bound on the longer edge; wins over width/height
//! # format = "webp"       # Output format; omit to keep each source's format
//! jpeg_quality = 90       # JPEG quality (1-100)
//! on_error = "abort"      # "abort" stops the batch, "skip" records and continues
//!
//! [processing]
//! # max_processes = 4     # Parallel workers (omit for sequential)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{MAX_TARGET_EDGE, Quality, RequestedFormat, SizePolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// What to do when a single file fails to convert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the whole batch at the first failure. Files already written stay.
    #[default]
    Abort,
    /// Record the failure, skip the file, keep going.
    Skip,
}

/// Batch conversion settings.
///
/// All fields have defaults; a config file need only name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub max_dimension: Option<u32>,
    /// Output format name, case-insensitive (`"JPEG"`, `"jpg"`, `"webp"`, ...).
    pub format: Option<String>,
    pub jpeg_quality: u32,
    pub on_error: ErrorPolicy,
    pub processing: ProcessingConfig,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            max_dimension: None,
            format: None,
            jpeg_quality: Quality::default().value(),
            on_error: ErrorPolicy::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl ConvertConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Validation(
                "jpeg_quality must be 1-100".into(),
            ));
        }
        for (key, value) in [
            ("width", self.width),
            ("height", self.height),
            ("max_dimension", self.max_dimension),
        ] {
            if value.is_some_and(|v| v > MAX_TARGET_EDGE) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be at most {MAX_TARGET_EDGE}"
                )));
            }
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        self.requested_format()?;
        Ok(())
    }

    pub fn size_policy(&self) -> SizePolicy {
        SizePolicy {
            width: self.width,
            height: self.height,
            max_dimension: self.max_dimension,
        }
    }

    /// Parsed format override. Blank names count as "keep source format".
    pub fn requested_format(&self) -> Result<Option<RequestedFormat>, ConfigError> {
        match self.format.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => RequestedFormat::parse(name)
                .map(Some)
                .map_err(|e| ConfigError::Validation(e.to_string())),
        }
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.jpeg_quality)
    }

    /// Layer command-line overrides on top of this config.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if overrides.width.is_some() {
            self.width = overrides.width;
        }
        if overrides.height.is_some() {
            self.height = overrides.height;
        }
        if overrides.max_dimension.is_some() {
            self.max_dimension = overrides.max_dimension;
        }
        if overrides.format.is_some() {
            self.format = overrides.format.clone();
        }
        if let Some(q) = overrides.jpeg_quality {
            self.jpeg_quality = q;
        }
        if let Some(policy) = overrides.on_error {
            self.on_error = policy;
        }
        if overrides.max_processes.is_some() {
            self.processing.max_processes = overrides.max_processes;
        }
        self
    }
}

/// Values supplied on the command line. `None` leaves the config value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub max_dimension: Option<u32>,
    pub format: Option<String>,
    pub jpeg_quality: Option<u32>,
    pub on_error: Option<ErrorPolicy>,
    pub max_processes: Option<usize>,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel conversion workers.
    /// When absent, files are converted one at a time.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → 1 (sequential)
/// - `Some(n)` → `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(1)
}

/// Parse and validate config text.
pub fn parse_config(content: &str) -> Result<ConvertConfig, ConfigError> {
    let config: ConvertConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load a config file. A missing file is an error: the path was asked for.
pub fn load_config(path: &Path) -> Result<ConvertConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// A documented config file with every option at its default.
pub fn stock_config_toml() -> &'static str {
    r#"# batch-resize configuration
# All options are optional - defaults shown below.

# Explicit output width in pixels. Unset keeps each source's width.
# width = 1200

# Explicit output height in pixels. Unset keeps each source's height.
# Setting only one of width/height stretches or squashes the image.
# height = 800

# Bound on the longer edge in pixels. The shorter edge scales by the same
# ratio. Takes precedence over width/height.
# max_dimension = 800

# Output format: jpeg, jpg, png, bmp, gif, webp, tif, tiff.
# The output extension is this name lowercased. Unset keeps each source's format.
# format = "webp"

# JPEG quality (1-100). Other formats use their encoder defaults.
jpeg_quality = 90

# What to do when one file fails: "abort" stops the batch,
# "skip" records the failure and continues.
on_error = "abort"

[processing]
# Maximum parallel workers. Unset converts files one at a time.
# max_processes = 4
"#
}
