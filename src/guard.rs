//! Single-instance guard.
//!
//! Two runs deleting under the same target must not interleave. Each run
//! writes a plain-text marker file containing its process id to a
//! runtime-state directory; the marker name carries a stable hash of the
//! target path so runs against different targets never block each other.
//!
//! Acquisition is check-then-act: read any existing marker, and if it
//! names a live process fail with [`ReclaimError::AlreadyRunning`]. A
//! stale marker (dead pid, unreadable contents) is replaced. The window
//! between the check and the write is a known, accepted race; the intended
//! deployment is serialized scheduler invocation, not concurrent launches.
//! The marker is removed when the guard is dropped, on every exit path
//! reached after acquisition.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReclaimError, Result};

/// Holds the instance marker for the duration of a run.
///
/// Dropping the guard removes the marker file.
#[derive(Debug)]
pub struct InstanceGuard {
    marker: PathBuf,
}

impl InstanceGuard {
    /// Acquire the single-instance marker for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ReclaimError::AlreadyRunning`] when an existing marker
    /// names a live process, and [`ReclaimError::IoError`] when the state
    /// directory is unusable.
    pub fn acquire(state_dir: &Path, target: &Path) -> Result<Self> {
        let marker = marker_path(state_dir, target);

        if let Ok(contents) = fs::read_to_string(&marker)
            && let Ok(pid) = contents.trim().parse::<u32>()
            && process_alive(pid)
        {
            return Err(ReclaimError::AlreadyRunning { pid });
        }

        fs::create_dir_all(state_dir).map_err(|source| ReclaimError::IoError {
            path: state_dir.to_path_buf(),
            source,
        })?;
        fs::write(&marker, format!("{}\n", std::process::id())).map_err(|source| {
            ReclaimError::IoError {
                path: marker.clone(),
                source,
            }
        })?;

        Ok(Self { marker })
    }

    /// Path of the marker file held by this guard.
    pub fn marker(&self) -> &Path {
        &self.marker
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.marker);
    }
}

/// Marker file path for a target: `reclaim-<hash>.pid`, where the hash is
/// a 16-character blake3 prefix of the target path.
pub fn marker_path(state_dir: &Path, target: &Path) -> PathBuf {
    let digest = blake3::hash(target.as_os_str().as_encoded_bytes());
    let hex = digest.to_hex();
    let suffix = &hex[..16];
    state_dir.join(format!("reclaim-{suffix}.pid"))
}

/// Resolve the default runtime-state directory.
///
/// `$XDG_RUNTIME_DIR` when set, then `~/.local/state`, then the system
/// temp directory.
pub fn default_state_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("XDG_RUNTIME_DIR") {
        let dir = PathBuf::from(dir);
        if dir.is_dir() {
            return dir;
        }
    }
    if let Some(home) = home::home_dir() {
        return home.join(".local").join("state");
    }
    std::env::temp_dir()
}

/// Check whether a process with the given pid is currently alive.
#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    // SAFETY: signal 0 performs no delivery, only an existence and
    // permission check.
    let rc = unsafe { libc::kill(pid as libc::pid_t, 0) };
    if rc == 0 {
        return true;
    }
    // EPERM means the process exists but belongs to someone else.
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    // Without a liveness probe, treat any marker as live and let the
    // operator clear stale ones.
    true
}
