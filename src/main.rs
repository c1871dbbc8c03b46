//! # reclaim CLI
//!
//! Disk-space reclamation for backup and cache directories: delete files
//! older than an age expression, evict the oldest files until usage drops
//! below a threshold, and prune the empty directories left behind.
//!
//! ## Usage
//!
//! ```bash
//! # Age-based cleanup, keeping two weeks of backups:
//! reclaim --older-than 2W /srv/backups
//!
//! # Keep the filesystem at most 80% full, oldest files go first:
//! reclaim --usage-threshold 80 /srv/backups
//!
//! # Both, with exclusions, empty-dir pruning and an audit log:
//! reclaim --older-than 1M2W --usage-threshold 80 --prune-empty-dirs \
//!     --exclude '*.keep' --log /var/log/reclaim.log /srv/backups
//! ```
//!
//! ## Environment Variables
//!
//! - `RECLAIM_OLDER_THAN`: Age expression
//! - `RECLAIM_USAGE_THRESHOLD`: Usage threshold percent
//! - `RECLAIM_LOG`: Audit log destination (file path or "syslog")
//! - `RECLAIM_DRY_RUN`: List instead of deleting
//! - `RECLAIM_QUIET`: Silence console output
//! - `RECLAIM_STATE_DIR`: Instance marker directory
//!
//! Exit code is 0 on success, on "nothing to do", and when another
//! instance already holds the target; non-zero for configuration errors
//! and eviction failures.

use std::io::IsTerminal;

use miette::IntoDiagnostic;

use reclaim::cli::Cli;

fn main() -> miette::Result<()> {
    miette::set_panic_hook();
    install_report_handler()?;

    let cli = Cli::parse_args();
    reclaim::commands::execute(&cli).map_err(Into::into)
}

/// Pick a miette report handler to match where stderr ends up.
///
/// Interactive runs get graphical unicode reports; scheduler runs land in
/// log files or mail, where box-drawing characters are just noise.
fn install_report_handler() -> miette::Result<()> {
    if std::io::stderr().is_terminal() {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::unicode_nocolor())
                    .with_context_lines(3),
            )
        }))
        .into_diagnostic()
    } else {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::none())
                    .with_context_lines(0),
            )
        }))
        .into_diagnostic()
    }
}
