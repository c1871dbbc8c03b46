//! The oldest-first eviction loop.
//!
//! While the filesystem backing the target is above the usage threshold,
//! remove the single least-recently-modified file, then re-probe. Usage is
//! measured fresh on every iteration rather than estimated from file
//! sizes: external processes may be writing to the same filesystem, and
//! the loop must react to real state.
//!
//! Termination:
//!
//! - usage drops to or below the threshold: success;
//! - no candidate files remain: [`ReclaimError::EvictionExhausted`];
//! - the same path is selected in two consecutive iterations:
//!   [`ReclaimError::LoopDetected`]. An exact-repeat selection means the
//!   previous removal changed nothing the enumerator or probe can see
//!   (hard links, reporting lag, a deletion that failed), so continuing
//!   would spin forever. There is deliberately no iteration cap beyond
//!   this check.

use std::fs;
use std::path::{Path, PathBuf};

use crate::audit::AuditLog;
use crate::error::{ReclaimError, Result};
use crate::exclude::CompiledExclusions;
use crate::scan;
use crate::usage::UsageProbe;

/// Evict oldest files until usage drops to or below `threshold` percent.
///
/// Returns the number of files removed. Per-file deletion failures are
/// logged and skipped; a file that repeatedly fails to delete is
/// re-selected on the next iteration and terminates the loop via
/// [`ReclaimError::LoopDetected`].
pub fn run_eviction(
    root: &Path,
    exclusions: &CompiledExclusions,
    threshold: u8,
    probe: &dyn UsageProbe,
    audit: &mut AuditLog,
) -> Result<u64> {
    let mut previous: Option<PathBuf> = None;
    let mut removed: u64 = 0;

    loop {
        let percent = probe.percent_used(root)?;
        if percent <= threshold {
            audit.line(format!(
                "evict: usage {percent}% is within threshold {threshold}%, {removed} file(s) \
                 removed"
            ));
            return Ok(removed);
        }

        let Some(candidate) = scan::oldest_file(root, exclusions)? else {
            return Err(ReclaimError::EvictionExhausted {
                percent,
                threshold,
            });
        };

        if previous.as_deref() == Some(candidate.as_path()) {
            return Err(ReclaimError::LoopDetected(candidate));
        }

        match fs::remove_file(&candidate) {
            Ok(()) => {
                removed += 1;
                audit.line(format!(
                    "evict: removed {} (usage {percent}%)",
                    candidate.display()
                ));
            }
            Err(e) => {
                // Logged skip; loop detection bounds repeated failures.
                audit.line(format!(
                    "evict: failed to remove {}: {e}",
                    candidate.display()
                ));
            }
        }

        previous = Some(candidate);
    }
}
