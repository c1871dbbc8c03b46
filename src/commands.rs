//! Run orchestration for a single reclaim invocation.
//!
//! The main entry point is [`execute`], which validates the parsed
//! configuration, opens the audit log, takes the single-instance guard,
//! and hands off to [`crate::cleanup::Cleanup`]. Configuration errors
//! abort before any deletion; a concurrent run against the same target is
//! reported and skipped with success.

use std::path::Path;

use crate::audit::AuditLog;
use crate::cleanup::{Cleanup, CleanupStats};
use crate::cli::Cli;
use crate::duration::parse_duration;
use crate::error::{ReclaimError, Result};
use crate::exclude::ExclusionSet;
use crate::guard::{self, InstanceGuard};
use crate::usage::MountUsage;

/// Execute a reclamation run from parsed CLI arguments.
///
/// # Errors
///
/// Configuration problems (bad duration expression, missing target,
/// unusable log destination, dry-run combined with eviction) and eviction
/// failures are returned as errors. [`ReclaimError::AlreadyRunning`] is
/// handled here: it is reported and the run returns `Ok(())`.
///
/// # Example
///
/// ```no_run
/// use reclaim::cli::Cli;
/// use reclaim::commands;
///
/// let cli = Cli::parse_args();
/// if let Err(e) = commands::execute(&cli) {
///     eprintln!("Error: {e:?}");
/// }
/// ```
pub fn execute(cli: &Cli) -> Result<()> {
    // Resolve and validate configuration up front, before the guard and
    // before anything destructive.
    let age_minutes = match cli.older_than() {
        Some(expr) => parse_duration(expr)?,
        None => 0,
    };

    if !cli.target().exists() {
        return Err(ReclaimError::TargetNotFound(cli.target().to_path_buf()));
    }

    if cli.dry_run() && cli.usage_threshold() > 0 {
        return Err(ReclaimError::DryRunEviction);
    }

    let exclusions: ExclusionSet = cli.exclude().iter().cloned().collect();
    // Reject bad patterns before acquiring the guard.
    exclusions.compile()?;

    let mut audit = AuditLog::new(cli.log(), cli.quiet())?;

    let state_dir = cli
        .state_dir()
        .map(Path::to_path_buf)
        .unwrap_or_else(guard::default_state_dir);

    let _guard = match InstanceGuard::acquire(&state_dir, cli.target()) {
        Ok(guard) => guard,
        Err(ReclaimError::AlreadyRunning { pid }) => {
            audit.line(format!(
                "reclaim: skipping {}: another instance (pid {pid}) is running",
                cli.target().display()
            ));
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let cleanup = Cleanup::builder()
        .target(cli.target())
        .age_minutes(age_minutes)
        .usage_threshold(cli.usage_threshold())
        .prune_empty_dirs(cli.prune_empty_dirs())
        .dry_run(cli.dry_run())
        .exclusions(exclusions)
        .build();

    audit.start(cli.target());
    let result = cleanup.run(&MountUsage, &mut audit);
    audit.end(cli.target());

    let stats = result?;
    report(cli, &stats);

    Ok(())
}

/// Print the run summary to stderr.
fn report(cli: &Cli, stats: &CleanupStats) {
    if cli.quiet() {
        return;
    }

    let prefix = if cli.dry_run() { "would be " } else { "" };
    eprintln!("Reclamation complete:");
    if cli.older_than().is_some() {
        eprintln!("  Files {prefix}removed by age: {}", stats.files_aged_out);
    }
    if cli.usage_threshold() > 0 {
        eprintln!("  Files evicted by usage: {}", stats.files_evicted);
    }
    if cli.prune_empty_dirs() {
        eprintln!("  Empty directories {prefix}pruned: {}", stats.dirs_pruned);
    }
    if cli.verbose() > 0 {
        eprintln!("  Target: {}", cli.target().display());
    }
}
