//! Single-shot formatting run: select files, then format them in batches.

use std::path::PathBuf;

use tracing::info;

use crate::config::FormatterConfiguration;
use crate::error::{ConfigError, RunError};
use crate::format::{FormatterOptions, batch_count, format_in_batches};
use crate::git::Commit;
use crate::process::ProcessExecutor;
use crate::select::{Selection, select_files};

/// Branches the bot pushes its own fixes to start with this prefix.
pub const DEFAULT_GENERATED_BRANCH_PREFIX: &str = "pushfmt/";

/// Everything one run needs, supplied up front.
#[derive(Debug, Clone)]
pub struct RunInput {
    /// Working tree the run inspects and formats.
    pub root: PathBuf,
    pub config: FormatterConfiguration,
    /// Commits of the push. Required when only changed files are formatted.
    pub commits: Option<Vec<Commit>>,
    pub formatter: FormatterOptions,
    /// Branch the push went to, used for the generated-branch guard.
    pub branch: Option<String>,
    pub generated_branch_prefix: String,
    /// Select and plan batches without invoking the formatter.
    pub dry_run: bool,
}

impl RunInput {
    pub fn new(root: impl Into<PathBuf>, config: FormatterConfiguration) -> Self {
        Self {
            root: root.into(),
            config,
            commits: None,
            formatter: FormatterOptions::default(),
            branch: None,
            generated_branch_prefix: DEFAULT_GENERATED_BRANCH_PREFIX.to_string(),
            dry_run: false,
        }
    }

    /// Reject inputs that cannot produce a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.root.is_dir() {
            return Err(ConfigError::InvalidRoot(self.root.clone()));
        }
        self.config.validate()?;
        if self.config.only_format_changed_files && self.commits.is_none() {
            return Err(ConfigError::MissingCommits);
        }
        Ok(())
    }

    fn is_generated_branch(&self) -> bool {
        !self.generated_branch_prefix.is_empty()
            && self
                .branch
                .as_deref()
                .is_some_and(|b| b.starts_with(&self.generated_branch_prefix))
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Formatted,
    NothingToFormat,
    DryRun,
    SkippedGeneratedBranch,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Files selected for formatting, in formatting order.
    pub files: Vec<String>,
    pub batches_planned: usize,
    pub batches_run: usize,
    pub files_formatted: usize,
}

impl RunReport {
    fn empty(outcome: RunOutcome) -> Self {
        Self {
            outcome,
            files: Vec::new(),
            batches_planned: 0,
            batches_run: 0,
            files_formatted: 0,
        }
    }
}

/// Run the pipeline once for `input`.
///
/// Any failure ends the run and reports the stage it happened in. Formatting
/// failures also report how many batches finished first.
pub async fn run<E: ProcessExecutor + ?Sized>(
    executor: &E,
    input: &RunInput,
) -> Result<RunReport, RunError> {
    if input.is_generated_branch() {
        info!(
            "Ignoring push to generated branch {}",
            input.branch.as_deref().unwrap_or_default()
        );
        return Ok(RunReport::empty(RunOutcome::SkippedGeneratedBranch));
    }

    input.validate()?;
    let selection = Selection::from_config(&input.config, input.commits.as_deref())?;

    info!("Selecting files under {:?}", input.root);
    let files = select_files(executor, &input.root, selection, &input.config.ignores).await?;

    let planned = batch_count(files.len(), input.config.files_to_format_per_slice);

    if input.dry_run {
        info!(
            "Dry run: {} files in {} batches, formatter not invoked",
            files.len(),
            planned
        );
        return Ok(RunReport {
            outcome: RunOutcome::DryRun,
            files,
            batches_planned: planned,
            batches_run: 0,
            files_formatted: 0,
        });
    }

    let report = format_in_batches(
        executor,
        &input.root,
        &files,
        &input.config,
        &input.formatter,
    )
    .await
    .map_err(|source| RunError::Formatting {
        total_batches: planned,
        source,
    })?;

    let outcome = if files.is_empty() {
        RunOutcome::NothingToFormat
    } else {
        RunOutcome::Formatted
    };

    Ok(RunReport {
        outcome,
        files,
        batches_planned: planned,
        batches_run: report.batches,
        files_formatted: report.files,
    })
}
