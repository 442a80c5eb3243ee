//! pushfmt - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use git2::Repository;
use tracing_subscriber::{EnvFilter, fmt};

use pushfmt::format::{
    DEFAULT_FORMATTER, DEFAULT_STYLE_PATH, FormatterOptions, check_formatter_installed,
};
use pushfmt::git::{fetch_push_commits, resolve_push_range};
use pushfmt::pipeline::DEFAULT_GENERATED_BRANCH_PREFIX;
use pushfmt::{Commit, FormatterConfiguration, PushEvent, RunInput, RunOutcome, SystemExecutor};

/// Reformat the files a push touched with an external formatter.
#[derive(Parser, Debug)]
#[command(name = "pushfmt")]
#[command(about = "Reformat files with an external formatter, in bounded batches")]
#[command(version)]
struct Cli {
    /// Working tree to format
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// JSON file with formatter parameters (glob, ignores, onlyFormatChangedFiles, ...)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Glob of files to format in full-scan mode
    #[arg(long)]
    glob: Option<String>,

    /// Pattern of files to skip (repeatable)
    #[arg(long = "ignore")]
    ignores: Vec<String>,

    /// Only format files changed by the pushed commits
    #[arg(long)]
    changed_only: bool,

    /// Pushed commit sha (repeatable, oldest first)
    #[arg(long = "commit")]
    commits: Vec<String>,

    /// Push event JSON payload supplying commits and branch
    #[arg(long)]
    event: Option<PathBuf>,

    /// Commit before the push (exclusive); walks from..to with git
    #[arg(long)]
    from: Option<String>,

    /// Commit after the push (defaults to HEAD when --from is given)
    #[arg(long)]
    to: Option<String>,

    /// Files per formatter invocation
    #[arg(long)]
    slice_size: Option<usize>,

    /// File holding the style definition to pass to the formatter
    #[arg(long)]
    codestyle_file: Option<PathBuf>,

    /// Formatter binary
    #[arg(long, default_value = DEFAULT_FORMATTER)]
    formatter: String,

    /// Where the style definition is written before formatting
    #[arg(long, default_value = DEFAULT_STYLE_PATH)]
    style_path: PathBuf,

    /// Branch the push went to
    #[arg(long)]
    branch: Option<String>,

    /// Pushes to branches with this prefix are ignored
    #[arg(long, default_value = DEFAULT_GENERATED_BRANCH_PREFIX)]
    generated_branch_prefix: String,

    /// Dry run - list files and batches without formatting
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    // Step 1: Build configuration
    let config = build_config(&cli)?;

    // Step 2: Resolve commits and branch
    let event = cli
        .event
        .as_deref()
        .map(PushEvent::from_json_file)
        .transpose()
        .context("Failed to load push event")?;
    let commits = resolve_commits(&cli, event.as_ref())?;
    let branch = cli
        .branch
        .clone()
        .or_else(|| event.as_ref().and_then(|e| e.branch()).map(str::to_string));

    // Step 3: Check prerequisites
    if !cli.dry_run {
        check_formatter_installed(&cli.formatter).context("Formatter is required")?;
    }

    // Step 4: Run
    let input = RunInput {
        root: cli.root.clone(),
        config,
        commits,
        formatter: FormatterOptions {
            binary: cli.formatter.clone(),
            style_path: cli.style_path.clone(),
        },
        branch,
        generated_branch_prefix: cli.generated_branch_prefix.clone(),
        dry_run: cli.dry_run,
    };

    let executor = SystemExecutor::from_env();
    let report = match pushfmt::run(&executor, &input).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!(
                "pushfmt failed during {} ({} batches completed)",
                e.stage(),
                e.batches_completed()
            );
            return Err(e.into());
        }
    };

    match report.outcome {
        RunOutcome::SkippedGeneratedBranch => println!("Ignored push to generated branch"),
        RunOutcome::NothingToFormat => println!("No files to format"),
        RunOutcome::DryRun => {
            println!(
                "Would format {} files in {} batches:",
                report.files.len(),
                report.batches_planned
            );
            for file in &report.files {
                println!("  {}", file);
            }
        }
        RunOutcome::Formatted => println!(
            "✓ Formatted {} files in {} batches",
            report.files_formatted, report.batches_run
        ),
    }

    Ok(())
}

/// Load the parameter file, then apply command-line overrides.
fn build_config(cli: &Cli) -> Result<FormatterConfiguration> {
    let mut config = match &cli.config {
        Some(path) => FormatterConfiguration::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => FormatterConfiguration::default(),
    };

    if let Some(glob) = &cli.glob {
        config.glob = glob.clone();
    }
    if !cli.ignores.is_empty() {
        config.ignores = cli.ignores.clone();
    }
    if cli.changed_only {
        config.only_format_changed_files = true;
    }
    if let Some(size) = cli.slice_size {
        config.files_to_format_per_slice = size;
    }
    if let Some(path) = &cli.codestyle_file {
        let style = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read style file {}", path.display()))?;
        config.codestyle = Some(style);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Commits from `--commit`, the push event, or a `--from`/`--to` walk.
///
/// Returns None when no source was given.
fn resolve_commits(cli: &Cli, event: Option<&PushEvent>) -> Result<Option<Vec<Commit>>> {
    let walk_requested = cli.from.is_some() || cli.to.is_some();
    let sources = [!cli.commits.is_empty(), event.is_some(), walk_requested]
        .iter()
        .filter(|&&given| given)
        .count();
    if sources > 1 {
        bail!("Use only one of --commit, --event, or --from/--to");
    }

    if !cli.commits.is_empty() {
        return Ok(Some(cli.commits.iter().map(Commit::new).collect()));
    }

    if let Some(event) = event {
        return Ok(Some(event.commits.clone()));
    }

    if walk_requested {
        let repo = Repository::open(&cli.root)
            .with_context(|| format!("{} is not a git repository", cli.root.display()))?;
        let range = resolve_push_range(&repo, cli.from.as_deref(), cli.to.as_deref())
            .context("Failed to resolve push range")?;
        let commits = fetch_push_commits(&repo, range.from, range.to)
            .context("Failed to list pushed commits")?;
        println!("Found {} commits up to {}", commits.len(), range.to_ref);
        return Ok(Some(commits));
    }

    Ok(None)
}
