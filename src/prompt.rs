//! Interactive front end.
//!
//! Asks the questions one by one and turns the answers into the same
//! [`ConvertConfig`] the flag and file front ends produce:
//!
//! ```text
//! Input folder path: "C:\photos\raw"
//! Output folder path: C:\photos\small
//! Set max dimension? (y/n): n
//! Width (Enter to skip): 1024
//! Height (Enter to skip):
//! Output format (JPEG, PNG, WEBP, ...) or Enter to keep: webp
//! ```
//!
//! Surrounding double quotes on folder paths are stripped so paths pasted
//! from a file manager work as-is. Generic over `BufRead`/`Write` so tests
//! can drive it from byte buffers.

use crate::config::ConvertConfig;
use crate::imaging::RequestedFormat;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{field} must be a whole number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("Input ended before all questions were answered")]
    UnexpectedEof,
}

/// Answers collected from one interactive session.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptedJob {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub config: ConvertConfig,
}

/// Asks questions on `output`, reads answers from `input`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::UnexpectedEof);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn ask_path(&mut self, question: &str) -> Result<PathBuf, PromptError> {
        let answer = self.ask(question)?;
        Ok(PathBuf::from(answer.trim().trim_matches('"')))
    }

    fn ask_number(&mut self, question: &str, field: &'static str) -> Result<Option<u32>, PromptError> {
        let answer = self.ask(question)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(None);
        }
        answer
            .parse()
            .map(Some)
            .map_err(|_| PromptError::InvalidNumber {
                field,
                value: answer.to_string(),
            })
    }

    /// Run the whole questionnaire.
    pub fn run(&mut self) -> Result<PromptedJob, PromptError> {
        let input_dir = self.ask_path("Input folder path: ")?;
        let output_dir = self.ask_path("Output folder path: ")?;

        let mut config = ConvertConfig::default();
        let use_max = self.ask("Set max dimension? (y/n): ")?;
        if use_max.trim().eq_ignore_ascii_case("y") {
            // Unlike width/height, this answer is required
            let max = self.ask_number("Maximum dimension (e.g. 800): ", "max dimension")?;
            if max.is_none() {
                return Err(PromptError::InvalidNumber {
                    field: "max dimension",
                    value: String::new(),
                });
            }
            config.max_dimension = max;
        } else {
            config.width = self.ask_number("Width (Enter to skip): ", "width")?;
            config.height = self.ask_number("Height (Enter to skip): ", "height")?;
        }

        let format = self.ask("Output format (JPEG, PNG, WEBP, ...) or Enter to keep: ")?;
        let format = format.trim();
        if !format.is_empty() {
            RequestedFormat::parse(format)
                .map_err(|_| PromptError::UnsupportedFormat(format.to_string()))?;
            config.format = Some(format.to_string());
        }

        Ok(PromptedJob {
            input_dir,
            output_dir,
            config,
        })
    }
}
