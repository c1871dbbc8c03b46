//! # reclaim
//!
//! A disk-space reclamation tool for backup and cache directories. Given a
//! target path, reclaim deletes files older than a configured age and/or
//! evicts the oldest files until the filesystem backing the target drops to
//! or below a configured usage percentage, optionally pruning the empty
//! directories left behind.
//!
//! ## Overview
//!
//! reclaim is built for unattended, periodic invocation (cron, systemd
//! timers). A single run sequences up to three phases:
//!
//! 1. **Age phase**: delete files whose status-change time is older than the
//!    `--older-than` expression (e.g. `2W`, `1M2W`, `90d`).
//! 2. **Eviction phase**: while filesystem usage exceeds
//!    `--usage-threshold`, delete the single oldest remaining file, re-probing
//!    real usage between deletions.
//! 3. **Prune phase**: with `--prune-empty-dirs`, remove directories that are
//!    empty after the earlier phases.
//!
//! A per-target instance marker prevents two runs against the same path from
//! interleaving deletions, and every affected path is written to an audit
//! log (file or syslog).
//!
//! ## Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`commands`]: Run orchestration for a single invocation
//! - [`error`]: Error types and handling with thiserror + miette
//! - [`cleanup`]: Phase sequencing and run configuration
//! - [`duration`]: Compact multi-unit duration expression parsing
//! - [`evict`]: The oldest-first eviction loop
//! - [`scan`]: Exclusion-aware file and directory enumeration
//! - [`exclude`]: Glob exclusion rules
//! - [`usage`]: Filesystem usage probing
//! - [`guard`]: Single-instance marker guard
//! - [`audit`]: Audit log sinks
//!
//! ## Usage
//!
//! ```bash
//! # Delete backups older than two weeks, then evict oldest files until the
//! # filesystem is at most 80% full, pruning empty directories afterwards:
//! reclaim --older-than 2W --usage-threshold 80 --prune-empty-dirs /srv/backups
//! ```
//!
//! ## Library Usage
//!
//! While reclaim is primarily a CLI tool, the run pipeline is exposed for
//! integration into other tools:
//!
//! ```no_run
//! use reclaim::cli::Cli;
//! use reclaim::commands;
//!
//! let cli = Cli::builder()
//!     .target("/srv/backups")
//!     .older_than("2W")
//!     .build()?;
//!
//! commands::execute(&cli)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! The crate uses a combination of:
//! - `thiserror` for strongly-typed errors
//! - `miette` for rich diagnostic output in the CLI
//!
//! Configuration problems abort before any deletion. A concurrent run
//! against the same target is reported and skipped with exit code 0.

pub mod audit;
pub mod cleanup;
pub mod cli;
pub mod commands;
pub mod duration;
pub mod error;
pub mod evict;
pub mod exclude;
pub mod guard;
pub mod scan;
pub mod usage;
