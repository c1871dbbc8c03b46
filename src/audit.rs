//! Audit log sinks.
//!
//! Every phase writes one line per affected path, plus a start and end
//! banner per run. The destination is an append-only file, the Unix system
//! log (the `syslog` sentinel), or nothing beyond the console. Quiet mode
//! suppresses the mirrored console copy but never the sink write.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::{ReclaimError, Result};

/// Where audit lines are persisted.
#[derive(Debug)]
enum Sink {
    /// Append to a log file.
    File(File),
    /// Write to the Unix system log.
    #[cfg(unix)]
    Syslog,
    /// Console mirror only.
    None,
}

/// The audit log for a single run.
///
/// Construct with [`AuditLog::new`] from the CLI's log destination; `None`
/// means console-only output.
#[derive(Debug)]
pub struct AuditLog {
    sink: Sink,
    quiet: bool,
}

impl AuditLog {
    /// Open the audit log for the given destination.
    ///
    /// `destination` is a file path, or the literal `"syslog"` for the
    /// system log facility.
    ///
    /// # Errors
    ///
    /// Returns [`ReclaimError::InvalidLogPath`] if the file cannot be
    /// opened for appending (e.g. its parent directory does not exist).
    pub fn new(destination: Option<&str>, quiet: bool) -> Result<Self> {
        let sink = match destination {
            None => Sink::None,
            #[cfg(unix)]
            Some("syslog") => {
                open_syslog();
                Sink::Syslog
            }
            #[cfg(not(unix))]
            Some("syslog") => {
                return Err(ReclaimError::InvalidLogPath {
                    path: Path::new("syslog").to_path_buf(),
                    source: std::io::Error::other("syslog is only available on Unix platforms"),
                });
            }
            Some(path) => {
                let path = Path::new(path);
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| ReclaimError::InvalidLogPath {
                        path: path.to_path_buf(),
                        source,
                    })?;
                Sink::File(file)
            }
        };

        Ok(Self { sink, quiet })
    }

    /// Console-only audit log.
    pub fn console(quiet: bool) -> Self {
        Self {
            sink: Sink::None,
            quiet,
        }
    }

    /// Write one audit line.
    ///
    /// The line goes to the sink unconditionally and is mirrored to stderr
    /// unless quiet mode is enabled. Sink write failures are swallowed:
    /// losing a log line must not abort a deletion run in progress.
    pub fn line(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        match &mut self.sink {
            Sink::File(file) => {
                let _ = writeln!(file, "{message}");
            }
            #[cfg(unix)]
            Sink::Syslog => syslog_line(message),
            Sink::None => {}
        }
        if !self.quiet {
            eprintln!("{message}");
        }
    }

    /// Write the run-start banner.
    pub fn start(&mut self, target: &Path) {
        self.line(format!("reclaim: run started for {}", target.display()));
    }

    /// Write the run-end banner.
    pub fn end(&mut self, target: &Path) {
        self.line(format!("reclaim: run finished for {}", target.display()));
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

#[cfg(unix)]
fn open_syslog() {
    use std::sync::OnceLock;

    // openlog keeps a pointer to the ident string; keep it alive for the
    // process lifetime.
    static IDENT: OnceLock<std::ffi::CString> = OnceLock::new();
    let ident = IDENT.get_or_init(|| std::ffi::CString::new("reclaim").expect("static ident"));

    // SAFETY: openlog with a 'static ident and standard flags.
    unsafe {
        libc::openlog(ident.as_ptr(), libc::LOG_PID, libc::LOG_DAEMON);
    }
}

#[cfg(unix)]
fn syslog_line(message: &str) {
    let Ok(c_message) = std::ffi::CString::new(message) else {
        return;
    };
    // SAFETY: the format string is a static literal and the message is a
    // valid NUL-terminated string.
    unsafe {
        libc::syslog(
            libc::LOG_INFO,
            c"%s".as_ptr(),
            c_message.as_ptr(),
        );
    }
}
