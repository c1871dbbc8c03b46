//! Exclusion-aware file and directory enumeration.
//!
//! All enumeration is eager: the candidate set is bounded by the target
//! subtree, and the deletion phases want stable snapshots rather than lazy
//! streams. Excluded directories are pruned from the walk entirely, so
//! nothing beneath them is ever visited.
//!
//! Age comparisons use the status-change time (ctime) on Unix, which is
//! what cleanup schedules care about: a file restored from an old archive
//! keeps its old mtime but gets a fresh ctime, and must not be reaped
//! immediately. Eviction ordering uses the last-modification time.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::error::Result;
use crate::exclude::CompiledExclusions;

/// List all regular files under `root`, honoring exclusions.
pub fn list_files(root: &Path, exclusions: &CompiledExclusions) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in walk(root, exclusions) {
        if entry.file_type().is_file() {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

/// List regular files whose status-change time is strictly older than
/// `cutoff`.
pub fn list_files_older_than(
    root: &Path,
    exclusions: &CompiledExclusions,
    cutoff: SystemTime,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in walk(root, exclusions) {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(metadata) = entry.metadata()
            && status_change_time(&metadata) < cutoff
        {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

/// List directories that contain zero entries, deepest first.
///
/// The root itself is never returned. Emptiness is evaluated at the moment
/// of the check; callers that delete should re-check before removal.
pub fn list_empty_dirs(root: &Path, exclusions: &CompiledExclusions) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    let walker = WalkDir::new(root)
        .contents_first(true)
        .into_iter()
        .filter_entry(|e| !exclusions.is_excluded(root, e.path()));

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_dir() || entry.path() == root {
            continue;
        }
        if let Ok(mut children) = fs::read_dir(entry.path())
            && children.next().is_none()
        {
            dirs.push(entry.path().to_path_buf());
        }
    }
    Ok(dirs)
}

/// Find the regular file with the smallest last-modification timestamp.
///
/// Returns `None` when no candidates remain. When several files share the
/// minimal timestamp, whichever the walk yields first wins; the choice is
/// not deterministic and does not need to be.
pub fn oldest_file(root: &Path, exclusions: &CompiledExclusions) -> Result<Option<PathBuf>> {
    let mut oldest: Option<(SystemTime, PathBuf)> = None;

    for entry in walk(root, exclusions) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let Ok(mtime) = metadata.modified() else {
            continue;
        };
        match &oldest {
            Some((current, _)) if *current <= mtime => {}
            _ => oldest = Some((mtime, entry.path().to_path_buf())),
        }
    }

    Ok(oldest.map(|(_, path)| path))
}

/// Walk `root`, pruning excluded entries and skipping unreadable ones.
fn walk<'a>(
    root: &'a Path,
    exclusions: &'a CompiledExclusions,
) -> impl Iterator<Item = walkdir::DirEntry> + 'a {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(move |e| !exclusions.is_excluded(root, e.path()))
        .filter_map(|e| e.ok())
}

/// The timestamp used for age comparisons.
///
/// ctime on Unix; other platforms fall back to the modified time.
pub fn status_change_time(metadata: &fs::Metadata) -> SystemTime {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        use std::time::Duration;

        let secs = metadata.ctime();
        let nanos = metadata.ctime_nsec() as u32;
        if secs >= 0 {
            SystemTime::UNIX_EPOCH + Duration::new(secs as u64, nanos)
        } else {
            SystemTime::UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs())
        }
    }
    #[cfg(not(unix))]
    {
        metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH)
    }
}
