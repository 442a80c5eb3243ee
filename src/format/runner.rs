//! Sequential batch invocation of the external formatter.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::FormatterConfiguration;
use crate::error::FormatError;
use crate::process::ProcessExecutor;

use super::batch::{batch_count, batches};
use super::style::{style_args, write_style_file};

/// Formatter script shipped in the formatter container image.
pub const DEFAULT_FORMATTER: &str = "/opt/idea/bin/format.sh";

/// Where the style definition is written before formatting.
pub const DEFAULT_STYLE_PATH: &str = "/atm/home/codestyle.xml";

/// Where the formatter lives and where its style file goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterOptions {
    pub binary: String,
    pub style_path: PathBuf,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            binary: DEFAULT_FORMATTER.to_string(),
            style_path: PathBuf::from(DEFAULT_STYLE_PATH),
        }
    }
}

/// Summary of a completed formatting pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatReport {
    pub batches: usize,
    pub files: usize,
}

/// Check that the formatter binary exists and is executable.
///
/// Uses the `which` crate, so both bare names on `PATH` and explicit paths work.
pub fn check_formatter_installed(binary: &str) -> Result<(), FormatError> {
    which::which(binary)
        .map(|_| ())
        .map_err(|_| FormatError::NotInstalled(binary.to_string()))
}

/// Format `files` under `root`, at most `files_to_format_per_slice` per invocation.
///
/// If a style definition is configured it is written once to
/// `options.style_path`, even when `files` is empty, and `-s <path>` leads
/// every batch's arguments.
/// Batches run one after another; the first failure stops the run and
/// earlier batches' changes stay on disk.
pub async fn format_in_batches<E: ProcessExecutor + ?Sized>(
    executor: &E,
    root: &Path,
    files: &[String],
    config: &FormatterConfiguration,
    options: &FormatterOptions,
) -> Result<FormatReport, FormatError> {
    let prefix = match config.style_definition() {
        Some(style) => {
            write_style_file(&options.style_path, style)?;
            info!("Wrote style configuration to {:?}", options.style_path);
            style_args(&options.style_path)
        }
        None => Vec::new(),
    };

    let size = config.files_to_format_per_slice;
    let total = batch_count(files.len(), size);
    let mut report = FormatReport::default();

    if files.is_empty() {
        info!("No files to format");
        return Ok(report);
    }

    for (index, batch) in batches(files, size).enumerate() {
        let number = index + 1;
        info!("Formatting batch {}/{} ({} files)", number, total, batch.len());

        let mut args = Vec::with_capacity(prefix.len() + batch.len());
        args.extend_from_slice(&prefix);
        args.extend_from_slice(batch);

        if let Err(source) = executor.run_to_completion(&options.binary, &args, root).await {
            warn!(
                "Formatter failed on batch {}/{} after {} completed batches",
                number, total, report.batches
            );
            return Err(FormatError::BatchFailed {
                batch: number,
                total,
                source,
            });
        }

        report.batches += 1;
        report.files += batch.len();
    }

    info!(
        "Formatted {} files in {} batches",
        report.files, report.batches
    );
    Ok(report)
}
