//! Command-line interface definitions for reclaim.
//!
//! This module defines the CLI structure using clap. The main entry point
//! is the [`Cli`] struct; [`CliBuilder`] constructs the same configuration
//! programmatically for library and test use.
//!
//! # Example
//!
//! ```no_run
//! use reclaim::cli::Cli;
//!
//! let cli = Cli::parse_args();
//! println!("target: {}", cli.target().display());
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::error::Result;

/// Main command-line interface for reclaim.
///
/// Deletes files under TARGET that are older than the configured age,
/// and/or evicts the oldest files until disk usage drops below the
/// configured threshold, optionally pruning empty directories afterwards.
#[derive(Parser, Debug)]
#[command(
    name = "reclaim",
    bin_name = "reclaim",
    author,
    version,
    about = "Reclaim disk space by deleting files by age and evicting oldest files by usage",
    long_about = None
)]
pub struct Cli {
    /// Target file or directory to reclaim space under
    #[arg(value_name = "TARGET")]
    target: PathBuf,

    /// Delete files older than this duration expression (e.g. "2W", "1M2W")
    #[arg(short = 't', long, value_name = "EXPR", env = "RECLAIM_OLDER_THAN")]
    older_than: Option<String>,

    /// Evict oldest files until usage drops to this percent (0 disables)
    #[arg(
        short = 'p',
        long,
        value_name = "PCT",
        default_value = "0",
        value_parser = clap::value_parser!(u8).range(0..=100),
        env = "RECLAIM_USAGE_THRESHOLD"
    )]
    usage_threshold: u8,

    /// Remove directories left empty after the deletion phases
    #[arg(short = 'f', long)]
    prune_empty_dirs: bool,

    /// Exclude paths matching this glob pattern (repeatable)
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Audit log destination: a file path, or "syslog"
    #[arg(short = 'l', long, value_name = "DEST", env = "RECLAIM_LOG")]
    log: Option<String>,

    /// List what would be deleted without deleting (age and prune phases)
    #[arg(short = 'n', long, env = "RECLAIM_DRY_RUN")]
    dry_run: bool,

    /// Silence console output (the audit log is still written)
    #[arg(short, long, conflicts_with = "verbose", env = "RECLAIM_QUIET")]
    quiet: bool,

    /// Enable verbose output (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, env = "RECLAIM_VERBOSE")]
    verbose: u8,

    /// Directory for the instance marker file (defaults to the runtime
    /// state directory)
    #[arg(long, value_name = "DIR", env = "RECLAIM_STATE_DIR")]
    state_dir: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a builder for programmatic construction
    pub fn builder() -> CliBuilder {
        CliBuilder::default()
    }

    /// Get the target path
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Get the age expression, if any
    pub fn older_than(&self) -> Option<&str> {
        self.older_than.as_deref()
    }

    /// Get the usage threshold percent
    pub fn usage_threshold(&self) -> u8 {
        self.usage_threshold
    }

    /// Check if empty-directory pruning is enabled
    pub fn prune_empty_dirs(&self) -> bool {
        self.prune_empty_dirs
    }

    /// Get the exclusion patterns
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Get the audit log destination, if any
    pub fn log(&self) -> Option<&str> {
        self.log.as_deref()
    }

    /// Check if dry run mode is enabled
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Check if quiet mode is enabled
    pub fn quiet(&self) -> bool {
        self.quiet
    }

    /// Get the verbose level
    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    /// Get the state directory override, if any
    pub fn state_dir(&self) -> Option<&Path> {
        self.state_dir.as_deref()
    }
}

/// Builder for [`Cli`]
#[derive(Debug, Default)]
pub struct CliBuilder {
    target: Option<PathBuf>,
    older_than: Option<String>,
    usage_threshold: u8,
    prune_empty_dirs: bool,
    exclude: Vec<String>,
    log: Option<String>,
    dry_run: bool,
    quiet: bool,
    verbose: u8,
    state_dir: Option<PathBuf>,
}

impl CliBuilder {
    /// Set the target path
    pub fn target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the age expression
    pub fn older_than(mut self, expr: impl Into<String>) -> Self {
        self.older_than = Some(expr.into());
        self
    }

    /// Set the usage threshold percent
    pub fn usage_threshold(mut self, percent: u8) -> Self {
        self.usage_threshold = percent;
        self
    }

    /// Enable empty-directory pruning
    pub fn prune_empty_dirs(mut self, enabled: bool) -> Self {
        self.prune_empty_dirs = enabled;
        self
    }

    /// Add an exclusion pattern
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Set the audit log destination
    pub fn log(mut self, destination: impl Into<String>) -> Self {
        self.log = Some(destination.into());
        self
    }

    /// Enable dry run mode
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Enable quiet mode
    pub fn quiet(mut self, enabled: bool) -> Self {
        self.quiet = enabled;
        self
    }

    /// Set the verbose level
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Set the state directory for the instance marker
    pub fn state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(dir.into());
        self
    }

    /// Build the [`Cli`] instance
    pub fn build(self) -> Result<Cli> {
        Ok(Cli {
            target: self.target.unwrap_or_else(|| PathBuf::from(".")),
            older_than: self.older_than,
            usage_threshold: self.usage_threshold,
            prune_empty_dirs: self.prune_empty_dirs,
            exclude: self.exclude,
            log: self.log,
            dry_run: self.dry_run,
            quiet: self.quiet,
            verbose: self.verbose,
            state_dir: self.state_dir,
        })
    }
}
