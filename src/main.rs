use batch_resize::config::{self, ConfigOverrides, ConvertConfig, ErrorPolicy};
use batch_resize::convert::{self, ConversionRequest};
use batch_resize::output;
use batch_resize::prompt::Prompter;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Sizing and format flags.
#[derive(clap::Args, Clone, Default)]
struct SizeArgs {
    /// Output width in pixels (source width if omitted)
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (source height if omitted)
    #[arg(long)]
    height: Option<u32>,

    /// Bound the longer edge, keeping aspect ratio (wins over --width/--height)
    #[arg(long, short = 'm')]
    max_dimension: Option<u32>,

    /// Output format: jpeg, jpg, png, bmp, gif, webp, tif, tiff (source format if omitted)
    #[arg(long, short = 'f')]
    format: Option<String>,

    /// JPEG quality, 1-100
    #[arg(long)]
    jpeg_quality: Option<u32>,
}

/// Shared flags for commands that run a batch.
#[derive(clap::Args, Clone)]
struct RunArgs {
    /// Config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip files that fail instead of stopping the batch
    #[arg(long)]
    keep_going: bool,

    /// Parallel workers (default 1: one file at a time)
    #[arg(long, short = 'j')]
    jobs: Option<usize>,

    /// Write a JSON summary of every file to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "batch-resize")]
#[command(about = "Resize and re-encode every image in a folder")]
#[command(long_about = "\
Resize and re-encode every image in a folder

Reads every .jpg, .jpeg, .png, .bmp, .gif and .webp file directly inside
INPUT (any case; subdirectories are ignored), resizes it with a Lanczos3
filter and writes it into OUTPUT, which is created if missing.

Sizing:
  --max-dimension 800       longer edge becomes 800, aspect ratio kept
  --width 150               width 150, height unchanged (stretches)
  (nothing)                 original size, useful for format conversion

Format:
  --format webp             photo.png → photo.webp
  (nothing)                 photo.png → photo.png

JPEG output drops any alpha channel and is written at quality 90 unless
--jpeg-quality says otherwise.

Run 'batch-resize gen-config' to print a documented config file.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a folder using command-line flags
    Convert {
        /// Folder to read images from
        input: PathBuf,
        /// Folder to write results to
        output: PathBuf,
        #[command(flatten)]
        size: SizeArgs,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Ask for folders and sizes on the terminal, then convert
    Interactive(RunArgs),
    /// Print a config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Convert { input, output, size, run } => {
            let config = load_base_config(run.config.as_deref())?
                .with_overrides(&overrides(&size, &run));
            let request = ConversionRequest::from_config(input, output, &config)?;
            run_batch(&request, run.report.as_deref())?;
        }
        Command::Interactive(run) => {
            println!("Batch Resize (interactive mode)");
            let job = {
                let stdin = std::io::stdin();
                let stdout = std::io::stdout();
                Prompter::new(stdin.lock(), stdout.lock()).run()?
            };
            let answered = SizeArgs {
                width: job.config.width,
                height: job.config.height,
                max_dimension: job.config.max_dimension,
                format: job.config.format.clone(),
                jpeg_quality: None,
            };
            let config = load_base_config(run.config.as_deref())?
                .with_overrides(&overrides(&answered, &run));
            let request = ConversionRequest::from_config(job.input_dir, job.output_dir, &config)?;
            run_batch(&request, run.report.as_deref())?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_base_config(path: Option<&Path>) -> Result<ConvertConfig, config::ConfigError> {
    match path {
        Some(path) => config::load_config(path),
        None => Ok(ConvertConfig::default()),
    }
}

fn overrides(size: &SizeArgs, run: &RunArgs) -> ConfigOverrides {
    ConfigOverrides {
        width: size.width,
        height: size.height,
        max_dimension: size.max_dimension,
        format: size.format.clone(),
        jpeg_quality: size.jpeg_quality,
        on_error: run.keep_going.then_some(ErrorPolicy::Skip),
        max_processes: run.jobs,
    }
}

/// Run the batch, streaming per-file lines from a printer thread.
fn run_batch(
    request: &ConversionRequest,
    report: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_convert_event(&event);
        }
    });
    let result = convert::convert_all(request, Some(tx));
    printer
        .join()
        .map_err(|_| "output thread panicked".to_string())?;

    let summary = result?;
    if let Some(path) = report {
        convert::write_report(&summary, path)?;
    }
    output::print_summary(&summary);

    if summary.failed > 0 {
        return Err(format!("{} of {} files failed", summary.failed, summary.results.len()).into());
    }
    Ok(())
}
