//! Batch conversion of a folder of images.
//!
//! Takes every supported image directly inside the input directory, computes
//! its target size, resamples it, optionally changes its format, and writes
//! the result into the output directory.
//!
//! ## Flow
//!
//! ```text
//! input/  ──enumerate──▶  per file: identify → size → plan output → convert
//!                                                                    │
//! output/ ◀──────────────────────────────────────────────────────────┘
//!         ──▶ BatchSummary { processed, failed, results }
//! ```
//!
//! ## File selection
//!
//! Only regular files directly inside the input directory whose extension is
//! one of `jpg`, `jpeg`, `png`, `bmp`, `gif`, `webp` (any case) are picked up.
//! Subdirectories and everything else are skipped silently. Files are handled
//! in whatever order the filesystem lists them.
//!
//! ## Failures
//!
//! With [`ErrorPolicy::Abort`] the first failing file ends the batch with
//! [`ConvertError::File`]; outputs already written stay on disk. With
//! [`ErrorPolicy::Skip`] the failure is recorded in the summary and the
//! batch carries on.
//!
//! ## Parallel Processing
//!
//! With more than one worker thread the files are fanned out over a
//! [rayon](https://docs.rs/rayon) pool. The output directory is created
//! before fan-out, and results keep enumeration order either way.
//!
//! Every file is identified and planned before any conversion starts. Files
//! whose planned outputs collide (`a.png` and `a.jpg` both going to
//! `a.webp`) are converted one after another on the same worker, in listing
//! order, so the last one listed wins just as it does sequentially.

use crate::config::{ConfigError, ConvertConfig, ErrorPolicy, effective_threads};
use crate::imaging::{
    BackendError, ConvertParams, ImageBackend, OutputFormat, Quality, RequestedFormat,
    RustBackend, SizePolicy, SourceInfo, compute_target_size, determine_output_format,
    is_supported_input, output_file_name,
};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Input directory not found: {0}")]
    InputDir(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to convert {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("Could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a batch needs to know, resolved and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub size: SizePolicy,
    pub format: Option<RequestedFormat>,
    pub quality: Quality,
    pub on_error: ErrorPolicy,
    /// Worker threads; 1 converts strictly one file at a time.
    pub threads: usize,
}

impl ConversionRequest {
    /// A passthrough request: source sizes, source formats, abort on error.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            size: SizePolicy::default(),
            format: None,
            quality: Quality::default(),
            on_error: ErrorPolicy::default(),
            threads: 1,
        }
    }

    pub fn from_config(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        config: &ConvertConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            size: config.size_policy(),
            format: config.requested_format()?,
            quality: config.quality(),
            on_error: config.on_error,
            threads: effective_threads(&config.processing),
            ..Self::new(input_dir, output_dir)
        })
    }
}

/// The planned output for one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSpec {
    pub target_width: u32,
    pub target_height: u32,
    pub target_format: OutputFormat,
    pub output_path: PathBuf,
}

/// Decide size, format and destination for `source` without touching pixels.
pub fn plan_output(source: &Path, info: &SourceInfo, request: &ConversionRequest) -> OutputSpec {
    let dims = info.dimensions;
    let (target_width, target_height) =
        compute_target_size((dims.width, dims.height), &request.size);
    let name = file_name(source);

    OutputSpec {
        target_width,
        target_height,
        target_format: determine_output_format(info.format, request.format.as_ref()),
        output_path: request
            .output_dir
            .join(output_file_name(&name, info.format, request.format.as_ref())),
    }
}

/// Progress events, one per file, for whoever is printing.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertEvent {
    Started {
        total: usize,
    },
    Converted {
        source: String,
        output: PathBuf,
        width: u32,
        height: u32,
        format: OutputFormat,
    },
    Failed {
        source: String,
        error: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Converted,
    Failed,
}

/// Outcome for one source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileResult {
    pub source: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    pub results: Vec<FileResult>,
}

impl BatchSummary {
    fn from_results(results: Vec<FileResult>) -> Self {
        let failed = results
            .iter()
            .filter(|r| r.status == FileStatus::Failed)
            .count();
        Self {
            processed: results.len() - failed,
            failed,
            results,
        }
    }
}

/// Write the summary as pretty JSON.
pub fn write_report(summary: &BatchSummary, path: &Path) -> Result<(), ConvertError> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// List the eligible images directly inside `input_dir`, in listing order.
pub fn collect_sources(input_dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && is_supported_input(entry.path()) {
            sources.push(entry.into_path());
        }
    }
    Ok(sources)
}

pub fn convert_all(
    request: &ConversionRequest,
    events: Option<Sender<ConvertEvent>>,
) -> Result<BatchSummary, ConvertError> {
    convert_with_backend(&RustBackend::new(), request, events)
}

/// Identify `source` and decide where and how it will be written.
fn plan_file(
    backend: &impl ImageBackend,
    source: &Path,
    request: &ConversionRequest,
) -> Result<OutputSpec, BackendError> {
    let info = backend.identify(source)?;
    Ok(plan_output(source, &info, request))
}

fn convert_planned(
    backend: &impl ImageBackend,
    source: &Path,
    spec: &OutputSpec,
    request: &ConversionRequest,
) -> Result<(), BackendError> {
    backend.convert(&ConvertParams {
        source: source.to_path_buf(),
        output: spec.output_path.clone(),
        width: spec.target_width,
        height: spec.target_height,
        format: spec.target_format,
        quality: request.quality,
    })
}

/// Group file indices by destination, in order of first appearance.
///
/// Files that would write the same output path share a group and keep their
/// listing order, so a group run sequentially leaves the last file's output
/// in place. `None` (a file that could not be planned) is always its own group.
fn group_by_destination(destinations: &[Option<&Path>]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut by_path: HashMap<&Path, usize> = HashMap::new();
    for (index, destination) in destinations.iter().copied().enumerate() {
        match destination {
            Some(path) => match by_path.get(path) {
                Some(&group) => groups[group].push(index),
                None => {
                    by_path.insert(path, groups.len());
                    groups.push(vec![index]);
                }
            },
            None => groups.push(vec![index]),
        }
    }
    groups
}

/// Convert a folder using a specific backend (allows testing with mock).
pub fn convert_with_backend(
    backend: &impl ImageBackend,
    request: &ConversionRequest,
    events: Option<Sender<ConvertEvent>>,
) -> Result<BatchSummary, ConvertError> {
    if !request.input_dir.is_dir() {
        return Err(ConvertError::InputDir(request.input_dir.clone()));
    }
    std::fs::create_dir_all(&request.output_dir)?;

    let sources = collect_sources(&request.input_dir)?;

    let emit = |event: ConvertEvent| {
        if let Some(tx) = &events {
            // A closed receiver only means nobody is printing
            let _ = tx.send(event);
        }
    };
    emit(ConvertEvent::Started {
        total: sources.len(),
    });

    let finish = |source: &PathBuf,
                  plan: Result<OutputSpec, BackendError>|
     -> Result<FileResult, ConvertError> {
        let name = file_name(source);
        let outcome = plan.and_then(|spec| {
            convert_planned(backend, source, &spec, request)?;
            Ok(spec)
        });
        match outcome {
            Ok(spec) => {
                emit(ConvertEvent::Converted {
                    source: name.clone(),
                    output: spec.output_path.clone(),
                    width: spec.target_width,
                    height: spec.target_height,
                    format: spec.target_format,
                });
                Ok(FileResult {
                    source: name,
                    status: FileStatus::Converted,
                    output: Some(spec.output_path.to_string_lossy().into_owned()),
                    width: Some(spec.target_width),
                    height: Some(spec.target_height),
                    error: None,
                })
            }
            Err(e) => match request.on_error {
                ErrorPolicy::Abort => Err(ConvertError::File {
                    path: source.clone(),
                    source: e,
                }),
                ErrorPolicy::Skip => {
                    emit(ConvertEvent::Failed {
                        source: name.clone(),
                        error: e.to_string(),
                    });
                    Ok(FileResult {
                        source: name,
                        status: FileStatus::Failed,
                        output: None,
                        width: None,
                        height: None,
                        error: Some(e.to_string()),
                    })
                }
            },
        }
    };

    let results = if request.threads <= 1 {
        sources
            .iter()
            .map(|source| finish(source, plan_file(backend, source, request)))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(request.threads)
            .build()?;
        pool.install(|| -> Result<Vec<FileResult>, ConvertError> {
            let plans: Vec<_> = sources
                .par_iter()
                .map(|source| plan_file(backend, source, request))
                .collect();
            let groups = {
                let destinations: Vec<Option<&Path>> = plans
                    .iter()
                    .map(|plan| plan.as_ref().ok().map(|spec| spec.output_path.as_path()))
                    .collect();
                group_by_destination(&destinations)
            };

            let mut slots: Vec<Option<_>> = plans.into_iter().map(Some).collect();
            let jobs: Vec<Vec<(usize, Result<OutputSpec, BackendError>)>> = groups
                .into_iter()
                .map(|group| {
                    group
                        .into_iter()
                        .filter_map(|index| slots[index].take().map(|plan| (index, plan)))
                        .collect()
                })
                .collect();

            // Groups run in parallel; files within a group run in listing order
            let done = jobs
                .into_par_iter()
                .map(|group| {
                    group
                        .into_iter()
                        .map(|(index, plan)| Ok((index, finish(&sources[index], plan)?)))
                        .collect::<Result<Vec<_>, ConvertError>>()
                })
                .collect::<Result<Vec<_>, _>>()?;

            let mut ordered: Vec<(usize, FileResult)> = done.into_iter().flatten().collect();
            ordered.sort_by_key(|(index, _)| *index);
            Ok(ordered.into_iter().map(|(_, result)| result).collect())
        })?
    };

    Ok(BatchSummary::from_results(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        input: PathBuf,
        output: PathBuf,
    }

    /// Input dir with empty placeholder files; the mock never reads them.
    fn fixture(files: &[&str]) -> Fixture {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("input");
        let output = tmp.path().join("output");
        fs::create_dir_all(&input).unwrap();
        for name in files {
            fs::write(input.join(name), "").unwrap();
        }
        Fixture {
            _tmp: tmp,
            input,
            output,
        }
    }

    fn only_conversion(backend: &MockBackend) -> RecordedOp {
        let ops = backend.conversions();
        assert_eq!(ops.len(), 1, "expected one conversion, got {ops:?}");
        ops.into_iter().next().unwrap()
    }

    // =========================================================================
    // ConversionRequest / plan_output (no filesystem)
    // =========================================================================

    #[test]
    fn request_from_default_config_is_passthrough() {
        let request = ConversionRequest::from_config("in", "out", &ConvertConfig::default()).unwrap();
        assert_eq!(request, ConversionRequest::new("in", "out"));
    }

    #[test]
    fn request_from_config_rejects_bad_format() {
        let config = ConvertConfig {
            format: Some("psd".into()),
            ..ConvertConfig::default()
        };
        let result = ConversionRequest::from_config("in", "out", &config);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn plan_output_applies_policy_and_format() {
        let mut request = ConversionRequest::new("/in", "/out");
        request.size = SizePolicy::max_dimension(800);
        request.format = Some(RequestedFormat::parse("WEBP").unwrap());
        let info = SourceInfo {
            dimensions: Dimensions {
                width: 1920,
                height: 1080,
            },
            format: OutputFormat::Jpeg,
        };

        let spec = plan_output(Path::new("/in/photo.jpg"), &info, &request);
        assert_eq!(
            spec,
            OutputSpec {
                target_width: 800,
                target_height: 450,
                target_format: OutputFormat::WebP,
                output_path: PathBuf::from("/out/photo.webp"),
            }
        );
    }

    // =========================================================================
    // Batch conversion with mock backend
    // =========================================================================

    #[test]
    fn scenario_max_dimension_landscape_jpeg() {
        let fx = fixture(&["wide.jpg"]);
        let backend = MockBackend::new().with_source("wide.jpg", 1920, 1080, OutputFormat::Jpeg);
        let mut request = ConversionRequest::new(&fx.input, &fx.output);
        request.size = SizePolicy::max_dimension(800);

        let summary = convert_with_backend(&backend, &request, None).unwrap();
        assert_eq!(summary.processed, 1);

        let RecordedOp::Convert {
            output,
            width,
            height,
            format,
            quality,
            ..
        } = only_conversion(&backend)
        else {
            unreachable!()
        };
        assert_eq!((width, height), (800, 450));
        assert_eq!(format, OutputFormat::Jpeg);
        assert_eq!(quality, 90);
        assert!(output.ends_with("wide.jpg"));
    }

    #[test]
    fn scenario_max_dimension_square_png() {
        let fx = fixture(&["square.png"]);
        let backend = MockBackend::new().with_source("square.png", 500, 500, OutputFormat::Png);
        let mut request = ConversionRequest::new(&fx.input, &fx.output);
        request.size = SizePolicy::max_dimension(800);

        convert_with_backend(&backend, &request, None).unwrap();
        assert!(matches!(
            only_conversion(&backend),
            RecordedOp::Convert {
                width: 800,
                height: 800,
                ..
            }
        ));
    }

    #[test]
    fn scenario_width_only_keeps_source_height() {
        let fx = fixture(&["small.png"]);
        let backend = MockBackend::new().with_source("small.png", 300, 200, OutputFormat::Png);
        let mut request = ConversionRequest::new(&fx.input, &fx.output);
        request.size = SizePolicy::exact(Some(150), None);

        convert_with_backend(&backend, &request, None).unwrap();
        assert!(matches!(
            only_conversion(&backend),
            RecordedOp::Convert {
                width: 150,
                height: 200,
                ..
            }
        ));
    }

    #[test]
    fn scenario_png_to_webp_renames_output() {
        let fx = fixture(&["name.png"]);
        let backend = MockBackend::new().with_source("name.png", 64, 64, OutputFormat::Png);
        let mut request = ConversionRequest::new(&fx.input, &fx.output);
        request.format = Some(RequestedFormat::parse("WEBP").unwrap());

        let summary = convert_with_backend(&backend, &request, None).unwrap();

        let expected = fx.output.join("name.webp");
        assert_eq!(
            summary.results[0].output.as_deref(),
            Some(expected.to_string_lossy().as_ref())
        );
        assert!(matches!(
            only_conversion(&backend),
            RecordedOp::Convert { format: OutputFormat::WebP, output, .. } if output.ends_with("name.webp")
        ));
    }

    #[test]
    fn scenario_empty_folder() {
        let fx = fixture(&[]);
        let backend = MockBackend::new();
        let request = ConversionRequest::new(&fx.input, &fx.output);

        let summary = convert_with_backend(&backend, &request, None).unwrap();
        assert_eq!(summary, BatchSummary::default());
        assert!(backend.get_operations().is_empty());
        assert!(fx.output.is_dir());
    }

    #[test]
    fn passthrough_keeps_dimensions_and_format() {
        let fx = fixture(&["keep.gif"]);
        let backend = MockBackend::new().with_source("keep.gif", 321, 123, OutputFormat::Gif);
        let request = ConversionRequest::new(&fx.input, &fx.output);

        convert_with_backend(&backend, &request, None).unwrap();
        assert!(matches!(
            only_conversion(&backend),
            RecordedOp::Convert {
                width: 321,
                height: 123,
                format: OutputFormat::Gif,
                output,
                ..
            } if output.ends_with("keep.gif")
        ));
    }

    #[test]
    fn skips_unsupported_files_and_subdirectories() {
        let fx = fixture(&["a.JPG", "notes.txt", "b.tiff", "c.webp"]);
        fs::create_dir_all(fx.input.join("nested.png")).unwrap();
        fs::write(fx.input.join("nested.png/inner.png"), "").unwrap();

        let backend = MockBackend::new()
            .with_source("a.JPG", 10, 10, OutputFormat::Jpeg)
            .with_source("c.webp", 10, 10, OutputFormat::WebP);
        let request = ConversionRequest::new(&fx.input, &fx.output);

        let summary = convert_with_backend(&backend, &request, None).unwrap();

        let mut names: Vec<&str> = summary.results.iter().map(|r| r.source.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["a.JPG", "c.webp"]);
    }

    #[test]
    fn creates_missing_output_parents() {
        let fx = fixture(&[]);
        let nested = fx.output.join("deep/er");
        let request = ConversionRequest::new(&fx.input, &nested);

        convert_with_backend(&MockBackend::new(), &request, None).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn missing_input_dir_is_error() {
        let fx = fixture(&[]);
        let request = ConversionRequest::new(fx.input.join("nope"), &fx.output);

        let result = convert_with_backend(&MockBackend::new(), &request, None);
        assert!(matches!(result, Err(ConvertError::InputDir(_))));
    }

    #[test]
    fn jpeg_quality_is_forwarded() {
        let fx = fixture(&["q.png"]);
        let backend = MockBackend::new().with_source("q.png", 10, 10, OutputFormat::Png);
        let mut request = ConversionRequest::new(&fx.input, &fx.output);
        request.format = Some(RequestedFormat::parse("jpg").unwrap());
        request.quality = Quality::new(70);

        convert_with_backend(&backend, &request, None).unwrap();
        assert!(matches!(
            only_conversion(&backend),
            RecordedOp::Convert { format: OutputFormat::Jpeg, quality: 70, output, .. }
                if output.ends_with("q.jpg")
        ));
    }

    #[test]
    fn abort_policy_stops_on_failure() {
        let fx = fixture(&["bad.png"]);
        let backend = MockBackend::new()
            .with_source("bad.png", 10, 10, OutputFormat::Png)
            .failing_on("bad.png");
        let request = ConversionRequest::new(&fx.input, &fx.output);

        let result = convert_with_backend(&backend, &request, None);
        match result {
            Err(ConvertError::File { path, source }) => {
                assert!(path.ends_with("bad.png"));
                assert!(matches!(source, BackendError::Decode(_)));
            }
            other => panic!("expected file error, got {other:?}"),
        }
    }

    #[test]
    fn abort_policy_on_unreadable_source() {
        // No mock source registered → identify fails
        let fx = fixture(&["unknown.png"]);
        let request = ConversionRequest::new(&fx.input, &fx.output);

        let result = convert_with_backend(&MockBackend::new(), &request, None);
        assert!(matches!(result, Err(ConvertError::File { .. })));
    }

    #[test]
    fn skip_policy_records_failure_and_continues() {
        let fx = fixture(&["ok1.png", "bad.png", "ok2.jpg"]);
        let backend = MockBackend::new()
            .with_source("ok1.png", 10, 10, OutputFormat::Png)
            .with_source("bad.png", 10, 10, OutputFormat::Png)
            .with_source("ok2.jpg", 10, 10, OutputFormat::Jpeg)
            .failing_on("bad.png");
        let mut request = ConversionRequest::new(&fx.input, &fx.output);
        request.on_error = ErrorPolicy::Skip;

        let summary = convert_with_backend(&backend, &request, None).unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 1);
        let failed = summary
            .results
            .iter()
            .find(|r| r.status == FileStatus::Failed)
            .unwrap();
        assert_eq!(failed.source, "bad.png");
        assert!(failed.error.as_deref().unwrap().contains("corrupt"));
        assert!(failed.output.is_none());
        assert_eq!(backend.conversions().len(), 3);
    }

    #[test]
    fn events_report_each_file() {
        let fx = fixture(&["one.png", "two.png"]);
        let backend = MockBackend::new()
            .with_source("one.png", 40, 20, OutputFormat::Png)
            .with_source("two.png", 20, 40, OutputFormat::Png)
            .failing_on("two.png");
        let mut request = ConversionRequest::new(&fx.input, &fx.output);
        request.on_error = ErrorPolicy::Skip;
        request.size = SizePolicy::max_dimension(10);

        let (tx, rx) = std::sync::mpsc::channel();
        convert_with_backend(&backend, &request, Some(tx)).unwrap();
        let events: Vec<ConvertEvent> = rx.iter().collect();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0], ConvertEvent::Started { total: 2 });
        assert!(events.contains(&ConvertEvent::Converted {
            source: "one.png".into(),
            output: fx.output.join("one.png"),
            width: 10,
            height: 5,
            format: OutputFormat::Png,
        }));
        assert!(events
            .iter()
            .any(|e| matches!(e, ConvertEvent::Failed { source, .. } if source == "two.png")));
    }

    #[test]
    fn parallel_matches_sequential() {
        let names: Vec<String> = (0..12).map(|i| format!("img{i:02}.png")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let fx = fixture(&refs);
        let backend = names.iter().fold(MockBackend::new(), |b, n| {
            b.with_source(n, 100, 50, OutputFormat::Png)
        });

        let mut request = ConversionRequest::new(&fx.input, &fx.output);
        request.size = SizePolicy::max_dimension(40);
        let sequential = convert_with_backend(&backend, &request, None).unwrap();

        request.threads = 4;
        let parallel = convert_with_backend(&backend, &request, None).unwrap();

        assert_eq!(sequential.processed, 12);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn colliding_destinations_share_a_group() {
        let a = Path::new("/out/a.webp");
        let b = Path::new("/out/b.webp");
        let groups = group_by_destination(&[Some(a), Some(b), None, Some(a), None]);
        assert_eq!(groups, vec![vec![0, 3], vec![1], vec![2], vec![4]]);
    }

    #[test]
    fn parallel_collisions_convert_in_listing_order() {
        let fx = fixture(&["a.png", "a.jpg", "a.gif", "b.png", "c.png"]);
        let backend = MockBackend::new()
            .with_source("a.png", 10, 10, OutputFormat::Png)
            .with_source("a.jpg", 10, 10, OutputFormat::Jpeg)
            .with_source("a.gif", 10, 10, OutputFormat::Gif)
            .with_source("b.png", 10, 10, OutputFormat::Png)
            .with_source("c.png", 10, 10, OutputFormat::Png);
        let mut request = ConversionRequest::new(&fx.input, &fx.output);
        request.format = Some(RequestedFormat::parse("webp").unwrap());
        request.threads = 4;

        let summary = convert_with_backend(&backend, &request, None).unwrap();
        assert_eq!(summary.processed, 5);

        let listed: Vec<String> = collect_sources(&fx.input)
            .unwrap()
            .iter()
            .map(|p| file_name(p))
            .filter(|n| n.starts_with("a."))
            .collect();
        let written: Vec<String> = backend
            .conversions()
            .into_iter()
            .filter_map(|op| match op {
                RecordedOp::Convert { source, output, .. } if output.ends_with("a.webp") => {
                    Some(file_name(Path::new(&source)))
                }
                _ => None,
            })
            .collect();
        assert_eq!(written, listed);
    }

    #[test]
    fn passthrough_names_output_after_detected_content() {
        // PNG bytes behind a .jpg extension
        let fx = fixture(&["photo.jpg"]);
        let backend = MockBackend::new().with_source("photo.jpg", 10, 10, OutputFormat::Png);
        let request = ConversionRequest::new(&fx.input, &fx.output);

        convert_with_backend(&backend, &request, None).unwrap();
        assert!(matches!(
            only_conversion(&backend),
            RecordedOp::Convert { format: OutputFormat::Png, output, .. }
                if output.ends_with("photo.png")
        ));
    }

    #[test]
    fn report_serializes_results() {
        let tmp = TempDir::new().unwrap();
        let summary = BatchSummary::from_results(vec![
            FileResult {
                source: "a.png".into(),
                status: FileStatus::Converted,
                output: Some("out/a.png".into()),
                width: Some(10),
                height: Some(20),
                error: None,
            },
            FileResult {
                source: "b.png".into(),
                status: FileStatus::Failed,
                output: None,
                width: None,
                height: None,
                error: Some("Decode failed: bad".into()),
            },
        ]);
        let path = tmp.path().join("report.json");
        write_report(&summary, &path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["processed"], 1);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["results"][0]["status"], "converted");
        assert_eq!(json["results"][1]["status"], "failed");
        assert!(json["results"][1].get("output").is_none());
    }
}
