//! Error types for reclaim.
//!
//! This module defines all error types used throughout reclaim, using a
//! combination of `thiserror` for ergonomic error definitions and `miette`
//! for rich diagnostic output.
//!
//! # Error Handling Strategy
//!
//! - All errors derive from [`ReclaimError`]
//! - Each variant includes helpful error messages and diagnostic codes
//! - Configuration errors abort before any deletion happens
//! - [`ReclaimError::AlreadyRunning`] is informational: the caller reports
//!   it and exits successfully rather than failing the run

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error types that can occur in reclaim operations
#[derive(Error, Debug, Diagnostic)]
pub enum ReclaimError {
    /// A duration expression could not be parsed.
    ///
    /// Raised by the duration parser for empty expressions, unknown unit
    /// suffixes, trailing garbage after the last token, or expressions
    /// that total zero minutes.
    #[error("Invalid duration expression: '{value}' - {message}")]
    #[diagnostic(
        code(reclaim::duration::invalid),
        help(
            "Specify a duration as one or more <number><unit> tokens, where the unit is one of \
             'm' (minutes), 'h' (hours), 'd' (days), 'w' (weeks), 'M' (months) or 'y' (years), \
             e.g. '2W', '1M2W', or '90d'."
        )
    )]
    InvalidDuration {
        /// The expression that failed to parse
        value: String,
        /// Description of the parsing error
        message: String,
    },

    /// An exclusion glob pattern could not be compiled.
    #[error("Invalid exclusion pattern: '{value}' - {message}")]
    #[diagnostic(
        code(reclaim::exclude::invalid_pattern),
        help("Exclusion rules are shell-style globs such as '*.log' or 'cache/tmp/*'.")
    )]
    InvalidPattern {
        /// The pattern that failed to compile
        value: String,
        /// Description of the glob error
        message: String,
    },

    /// A usage threshold outside the range 0-100 was supplied.
    ///
    /// The CLI range-validates the flag, so this is raised only when the
    /// configuration is constructed programmatically.
    #[error("Invalid usage threshold: {0} (must be between 0 and 100)")]
    #[diagnostic(
        code(reclaim::config::invalid_threshold),
        help("The usage threshold is a whole percentage; 0 disables eviction.")
    )]
    InvalidThreshold(
        /// The out-of-range threshold value
        u64,
    ),

    /// The target path does not exist at invocation time.
    #[error("Target path '{0}' does not exist")]
    #[diagnostic(
        code(reclaim::config::target_not_found),
        help("The target must be an existing file or directory.")
    )]
    TargetNotFound(
        /// The missing target path
        PathBuf,
    ),

    /// The audit log destination cannot be opened for appending.
    ///
    /// Raised when the log path's parent directory does not exist or the
    /// file cannot be created/opened.
    #[error("Cannot open log destination '{path}'")]
    #[diagnostic(
        code(reclaim::config::invalid_log_path),
        help("The log file's parent directory must exist and be writable, or pass 'syslog'.")
    )]
    InvalidLogPath {
        /// The log path that could not be opened
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Dry-run mode was combined with a non-zero usage threshold.
    ///
    /// Usage-based eviction has no dry-run mode: it must observe real
    /// usage dropping after each deletion, which a simulation cannot
    /// provide. The combination is rejected before any phase runs.
    #[error("--dry-run cannot be combined with a non-zero usage threshold")]
    #[diagnostic(
        code(reclaim::config::dry_run_eviction),
        help(
            "Usage-based eviction reacts to measured disk usage and cannot be simulated. Drop \
             --dry-run or set the usage threshold to 0."
        )
    )]
    DryRunEviction,

    /// Another reclaim instance is already running against this target.
    ///
    /// The instance marker file names a process that is still alive. The
    /// run is skipped, not failed: callers report this and exit 0.
    #[error("Another instance (pid {pid}) is already running against this target")]
    #[diagnostic(
        code(reclaim::guard::already_running),
        help("The run is skipped. If the marker is stale, remove it from the state directory.")
    )]
    AlreadyRunning {
        /// Process id recorded in the marker file
        pid: u32,
    },

    /// The eviction loop selected the same path twice in a row.
    ///
    /// Deleting the previous selection did not change what the enumerator
    /// sees, which indicates hard-linked files, filesystem reporting lag,
    /// or a deletion that failed silently. The loop aborts rather than
    /// spinning forever.
    #[error("Eviction is not making progress: '{0}' was selected twice in a row")]
    #[diagnostic(
        code(reclaim::evict::loop_detected),
        help(
            "Check for hard links, permission problems, or exclusion patterns that prevent the \
             target filesystem's usage from dropping."
        )
    )]
    LoopDetected(
        /// The path selected in two consecutive iterations
        PathBuf,
    ),

    /// No candidate files remain but usage is still above the threshold.
    ///
    /// Everything eligible under the target has been removed (or was
    /// excluded) and the goal is unreachable.
    #[error("No files left to evict: usage is {percent}% but the threshold is {threshold}%")]
    #[diagnostic(
        code(reclaim::evict::exhausted),
        help(
            "Other data on the same filesystem is holding usage up. Widen the target, relax the \
             exclusions, or lower expectations for this path."
        )
    )]
    EvictionExhausted {
        /// Usage reported by the probe when candidates ran out
        percent: u8,
        /// The configured usage threshold
        threshold: u8,
    },

    /// Querying filesystem usage failed.
    ///
    /// Wraps `statvfs` failures (or running on a platform without a usage
    /// probe implementation).
    #[error("Failed to query filesystem usage for '{path}': {message}")]
    #[diagnostic(code(reclaim::usage::probe_error))]
    UsageProbe {
        /// The path whose filesystem could not be probed
        path: PathBuf,
        /// Description of the probe failure
        message: String,
    },

    /// File system I/O error during reclaim operations.
    ///
    /// Common causes: permission denied, file not found, or the state
    /// directory being unwritable. Used throughout for file operations
    /// and marker handling.
    #[error("I/O error accessing '{path}'")]
    #[diagnostic(code(reclaim::io_error))]
    IoError {
        /// The path that caused the I/O error
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ReclaimError>;
