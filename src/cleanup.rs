//! Phase sequencing for a single reclamation run.
//!
//! A run executes up to three phases in a fixed, non-configurable order:
//!
//! 1. **Age**: delete files whose status-change time is older than the
//!    configured threshold.
//! 2. **Eviction**: delete oldest files until usage drops to or below the
//!    configured percentage (never in dry-run mode).
//! 3. **Prune**: remove empty directories.
//!
//! Age-based deletion runs first so it reduces volume before eviction
//! measures usage, and pruning runs last so it sees directories emptied by
//! the earlier phases. All phases share one exclusion set. Phases are not
//! transactional: an eviction error leaves age-phase deletions applied.
//!
//! # Example
//!
//! ```no_run
//! use reclaim::audit::AuditLog;
//! use reclaim::cleanup::Cleanup;
//! use reclaim::usage::MountUsage;
//!
//! let cleanup = Cleanup::builder()
//!     .target("/srv/backups")
//!     .age_minutes(20_160) // 2 weeks
//!     .usage_threshold(80)
//!     .prune_empty_dirs(true)
//!     .build();
//!
//! let mut audit = AuditLog::console(false);
//! let stats = cleanup.run(&MountUsage, &mut audit)?;
//! println!("removed {} file(s)", stats.files_aged_out + stats.files_evicted);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::audit::AuditLog;
use crate::error::{ReclaimError, Result};
use crate::evict;
use crate::exclude::{CompiledExclusions, ExclusionSet};
use crate::scan;
use crate::usage::UsageProbe;

/// Immutable configuration for one reclamation run.
#[derive(Debug)]
pub struct Cleanup {
    /// Target file or directory to reclaim space under
    target: PathBuf,
    /// Age threshold in minutes (0 disables the age phase)
    age_minutes: u64,
    /// Explicit age cutoff, overriding the one derived from `age_minutes`
    age_cutoff: Option<SystemTime>,
    /// Usage threshold percent (0 disables the eviction phase)
    usage_threshold: u8,
    /// Remove empty directories after the deletion phases
    prune_empty_dirs: bool,
    /// Dry run mode - list instead of deleting (age and prune phases only)
    dry_run: bool,
    /// Exclusion rules shared by every phase
    exclusions: ExclusionSet,
}

impl Cleanup {
    /// Creates a new builder for [`Cleanup`]
    pub fn builder() -> CleanupBuilder {
        CleanupBuilder::default()
    }

    /// Get the target path
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Get the age threshold in minutes
    pub fn age_minutes(&self) -> u64 {
        self.age_minutes
    }

    /// Get the explicit age cutoff, if one was set
    pub fn age_cutoff(&self) -> Option<SystemTime> {
        self.age_cutoff
    }

    /// Get the usage threshold percent
    pub fn usage_threshold(&self) -> u8 {
        self.usage_threshold
    }

    /// Check if empty-directory pruning is enabled
    pub fn prune_empty_dirs(&self) -> bool {
        self.prune_empty_dirs
    }

    /// Check if dry run mode is enabled
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Get the exclusion set
    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    /// Execute the configured phases.
    ///
    /// # Errors
    ///
    /// Fails before any deletion with [`ReclaimError::TargetNotFound`] if
    /// the target is missing, [`ReclaimError::InvalidThreshold`] for an
    /// out-of-range threshold, or [`ReclaimError::DryRunEviction`] when
    /// dry-run is combined with a non-zero usage threshold. Eviction
    /// failures abort the run with age-phase deletions already applied.
    pub fn run(&self, probe: &dyn UsageProbe, audit: &mut AuditLog) -> Result<CleanupStats> {
        if !self.target.exists() {
            return Err(ReclaimError::TargetNotFound(self.target.clone()));
        }
        if self.usage_threshold > 100 {
            return Err(ReclaimError::InvalidThreshold(self.usage_threshold as u64));
        }
        if self.dry_run && self.usage_threshold > 0 {
            return Err(ReclaimError::DryRunEviction);
        }

        let exclusions = self.exclusions.compile()?;
        let mut stats = CleanupStats::default();

        if self.age_minutes > 0 || self.age_cutoff.is_some() {
            // Saturate on both ends: an enormous age threshold degrades to
            // a cutoff at the epoch, which matches nothing.
            let cutoff = match self.age_cutoff {
                Some(cutoff) => cutoff,
                None => SystemTime::now()
                    .checked_sub(Duration::from_secs(self.age_minutes.saturating_mul(60)))
                    .unwrap_or(SystemTime::UNIX_EPOCH),
            };
            stats.files_aged_out = self.run_age_phase(cutoff, &exclusions, audit)?;
        }

        if self.usage_threshold > 0 {
            stats.files_evicted = evict::run_eviction(
                &self.target,
                &exclusions,
                self.usage_threshold,
                probe,
                audit,
            )?;
        }

        if self.prune_empty_dirs {
            stats.dirs_pruned = self.run_prune_phase(&exclusions, audit)?;
        }

        Ok(stats)
    }

    /// Delete (or, in dry-run mode, list) files older than `cutoff`.
    fn run_age_phase(
        &self,
        cutoff: SystemTime,
        exclusions: &CompiledExclusions,
        audit: &mut AuditLog,
    ) -> Result<u64> {
        let candidates = scan::list_files_older_than(&self.target, exclusions, cutoff)?;
        let mut removed: u64 = 0;

        for path in candidates {
            if self.dry_run {
                audit.line(format!("age: would remove {}", path.display()));
                removed += 1;
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    removed += 1;
                    audit.line(format!("age: removed {}", path.display()));
                }
                Err(e) => {
                    // Logged skip; the run continues.
                    audit.line(format!("age: failed to remove {}: {e}", path.display()));
                }
            }
        }

        Ok(removed)
    }

    /// Remove (or list) directories that are empty at removal time.
    fn run_prune_phase(
        &self,
        exclusions: &CompiledExclusions,
        audit: &mut AuditLog,
    ) -> Result<u64> {
        let candidates = scan::list_empty_dirs(&self.target, exclusions)?;
        let mut pruned: u64 = 0;

        for dir in candidates {
            if self.dry_run {
                audit.line(format!("prune: would remove {}", dir.display()));
                pruned += 1;
                continue;
            }
            // remove_dir refuses non-empty directories, which re-checks
            // emptiness at the moment of removal.
            match fs::remove_dir(&dir) {
                Ok(()) => {
                    pruned += 1;
                    audit.line(format!("prune: removed {}", dir.display()));
                }
                Err(e) => {
                    audit.line(format!("prune: skipped {}: {e}", dir.display()));
                }
            }
        }

        Ok(pruned)
    }
}

/// Builder for [`Cleanup`]
#[derive(Debug, Default)]
pub struct CleanupBuilder {
    target: Option<PathBuf>,
    age_minutes: u64,
    age_cutoff: Option<SystemTime>,
    usage_threshold: u8,
    prune_empty_dirs: bool,
    dry_run: bool,
    exclusions: ExclusionSet,
}

impl CleanupBuilder {
    /// Set the target path
    pub fn target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the age threshold in minutes (0 disables the age phase)
    pub fn age_minutes(mut self, minutes: u64) -> Self {
        self.age_minutes = minutes;
        self
    }

    /// Set an explicit age cutoff instead of deriving one from the age
    /// threshold. Files whose status-change time is older than the cutoff
    /// are removed by the age phase.
    pub fn age_cutoff(mut self, cutoff: SystemTime) -> Self {
        self.age_cutoff = Some(cutoff);
        self
    }

    /// Set the usage threshold percent (0 disables eviction)
    pub fn usage_threshold(mut self, percent: u8) -> Self {
        self.usage_threshold = percent;
        self
    }

    /// Enable empty-directory pruning
    pub fn prune_empty_dirs(mut self, enabled: bool) -> Self {
        self.prune_empty_dirs = enabled;
        self
    }

    /// Enable dry run mode
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Set the exclusion rules
    pub fn exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Add a single exclusion pattern
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclusions.add(pattern);
        self
    }

    /// Build the [`Cleanup`]
    pub fn build(self) -> Cleanup {
        Cleanup {
            target: self.target.unwrap_or_else(|| PathBuf::from(".")),
            age_minutes: self.age_minutes,
            age_cutoff: self.age_cutoff,
            usage_threshold: self.usage_threshold,
            prune_empty_dirs: self.prune_empty_dirs,
            dry_run: self.dry_run,
            exclusions: self.exclusions,
        }
    }
}

/// Statistics about a reclamation run
#[derive(Debug, Default)]
pub struct CleanupStats {
    /// Files removed (or listed) by the age phase
    pub files_aged_out: u64,
    /// Files removed by the eviction phase
    pub files_evicted: u64,
    /// Directories removed (or listed) by the prune phase
    pub dirs_pruned: u64,
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use tempfile::TempDir;

    use super::*;
    use crate::usage::MountUsage;

    #[test]
    fn test_missing_target_fails_before_any_phase() {
        let cleanup = Cleanup::builder().target("/no/such/path").build();
        let mut audit = AuditLog::console(true);
        let result = cleanup.run(&MountUsage, &mut audit);
        assert!(matches!(result, Err(ReclaimError::TargetNotFound(_))));
    }

    #[test]
    fn test_dry_run_with_threshold_is_rejected() {
        let tmp = TempDir::new().unwrap();
        File::create(tmp.path().join("victim")).unwrap();

        let cleanup = Cleanup::builder()
            .target(tmp.path())
            .usage_threshold(50)
            .dry_run(true)
            .build();
        let mut audit = AuditLog::console(true);
        let result = cleanup.run(&MountUsage, &mut audit);

        assert!(matches!(result, Err(ReclaimError::DryRunEviction)));
        // Rejected before any phase ran.
        assert!(tmp.path().join("victim").exists());
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let cleanup = Cleanup::builder()
            .target(tmp.path())
            .usage_threshold(101)
            .build();
        let mut audit = AuditLog::console(true);
        assert!(matches!(
            cleanup.run(&MountUsage, &mut audit),
            Err(ReclaimError::InvalidThreshold(101))
        ));
    }

    #[test]
    fn test_all_phases_disabled_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        File::create(tmp.path().join("kept")).unwrap();

        let cleanup = Cleanup::builder().target(tmp.path()).build();
        let mut audit = AuditLog::console(true);
        let stats = cleanup.run(&MountUsage, &mut audit).unwrap();

        assert_eq!(stats.files_aged_out, 0);
        assert_eq!(stats.files_evicted, 0);
        assert_eq!(stats.dirs_pruned, 0);
        assert!(tmp.path().join("kept").exists());
    }

    #[test]
    fn test_fresh_files_survive_age_phase() {
        let tmp = TempDir::new().unwrap();
        File::create(tmp.path().join("fresh")).unwrap();

        // Threshold of one day; the file was created milliseconds ago.
        let cleanup = Cleanup::builder()
            .target(tmp.path())
            .age_minutes(1440)
            .build();
        let mut audit = AuditLog::console(true);
        let stats = cleanup.run(&MountUsage, &mut audit).unwrap();

        assert_eq!(stats.files_aged_out, 0);
        assert!(tmp.path().join("fresh").exists());
    }

    #[test]
    fn test_enormous_age_threshold_deletes_nothing() {
        let tmp = TempDir::new().unwrap();
        File::create(tmp.path().join("kept")).unwrap();

        // A parsed duration can total more minutes than fit in a u64 of
        // seconds; the cutoff must saturate at the epoch instead of
        // wrapping into the recent past.
        let cleanup = Cleanup::builder()
            .target(tmp.path())
            .age_minutes(u64::MAX / 60 + 1)
            .build();
        let mut audit = AuditLog::console(true);
        let stats = cleanup.run(&MountUsage, &mut audit).unwrap();

        assert_eq!(stats.files_aged_out, 0);
        assert!(tmp.path().join("kept").exists());
    }

    #[test]
    fn test_prune_removes_dirs_empty_at_scan_time() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a/b/c")).unwrap();
        fs::create_dir(tmp.path().join("full")).unwrap();
        File::create(tmp.path().join("full/file")).unwrap();

        let cleanup = Cleanup::builder()
            .target(tmp.path())
            .prune_empty_dirs(true)
            .build();
        let mut audit = AuditLog::console(true);
        let stats = cleanup.run(&MountUsage, &mut audit).unwrap();

        // Single pass: only a/b/c was empty when the candidates were
        // enumerated. a/b becomes empty as a side effect and is left for
        // the next run.
        assert_eq!(stats.dirs_pruned, 1);
        assert!(!tmp.path().join("a/b/c").exists());
        assert!(tmp.path().join("a/b").exists());
        assert!(tmp.path().join("full").exists());
    }

    #[test]
    fn test_prune_dry_run_deletes_nothing() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("empty")).unwrap();

        let cleanup = Cleanup::builder()
            .target(tmp.path())
            .prune_empty_dirs(true)
            .dry_run(true)
            .build();
        let mut audit = AuditLog::console(true);
        let stats = cleanup.run(&MountUsage, &mut audit).unwrap();

        assert_eq!(stats.dirs_pruned, 1);
        assert!(tmp.path().join("empty").exists());
    }

    #[test]
    fn test_excluded_dirs_are_not_pruned() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("spare")).unwrap();

        let cleanup = Cleanup::builder()
            .target(tmp.path())
            .prune_empty_dirs(true)
            .exclude("spare")
            .build();
        let mut audit = AuditLog::console(true);
        let stats = cleanup.run(&MountUsage, &mut audit).unwrap();

        assert_eq!(stats.dirs_pruned, 0);
        assert!(tmp.path().join("spare").exists());
    }
}
