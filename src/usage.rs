//! Filesystem usage probing.
//!
//! The eviction loop needs the real, current percentage of used space on
//! the filesystem backing the target path, re-queried after every deletion
//! because other writers may be active. [`UsageProbe`] is the seam: the
//! production implementation asks the OS via `statvfs`, tests substitute
//! scripted probes.

use std::path::Path;

use crate::error::{ReclaimError, Result};

/// Reports the percentage of used space for the filesystem backing a path.
///
/// Implementations must be side-effect-free and must report current state
/// on every call, not a cached estimate.
pub trait UsageProbe {
    /// Whole-percent used space in `[0, 100]` for the mount backing `path`.
    fn percent_used(&self, path: &Path) -> Result<u8>;
}

/// Usage probe backed by `statvfs(2)`.
///
/// Percentage is computed the way `df` reports it, with the capacity base
/// `used + available-to-unprivileged` rather than raw block count, floored
/// to a whole percent.
#[derive(Debug, Default, Clone, Copy)]
pub struct MountUsage;

#[cfg(unix)]
impl UsageProbe for MountUsage {
    fn percent_used(&self, path: &Path) -> Result<u8> {
        use std::ffi::CString;
        use std::mem::MaybeUninit;
        use std::os::unix::ffi::OsStrExt;

        let c_path =
            CString::new(path.as_os_str().as_bytes()).map_err(|_| ReclaimError::UsageProbe {
                path: path.to_path_buf(),
                message: "path contains an interior NUL byte".to_string(),
            })?;

        // SAFETY: statvfs is a standard POSIX call. We check the return
        // value before using the result.
        let stat = unsafe {
            let mut stat: MaybeUninit<libc::statvfs> = MaybeUninit::uninit();
            if libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) != 0 {
                return Err(ReclaimError::UsageProbe {
                    path: path.to_path_buf(),
                    message: std::io::Error::last_os_error().to_string(),
                });
            }
            stat.assume_init()
        };

        let used = stat.f_blocks.saturating_sub(stat.f_bfree) as u128;
        let capacity = used + stat.f_bavail as u128;
        if capacity == 0 {
            return Ok(0);
        }

        let percent = used * 100 / capacity;
        Ok(percent.min(100) as u8)
    }
}

#[cfg(not(unix))]
impl UsageProbe for MountUsage {
    fn percent_used(&self, path: &Path) -> Result<u8> {
        Err(ReclaimError::UsageProbe {
            path: path.to_path_buf(),
            message: "usage probing is only supported on Unix platforms".to_string(),
        })
    }
}
