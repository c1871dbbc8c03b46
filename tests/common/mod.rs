//! Shared helpers for integration tests.

use std::cell::RefCell;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use reclaim::error::Result;
use reclaim::usage::UsageProbe;

/// Create a file with contents and a last-modification time `minutes_old`
/// minutes in the past.
pub fn create_aged_file(dir: &Path, name: &str, minutes_old: u64) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut file = File::create(&path).unwrap();
    file.write_all(name.as_bytes()).unwrap();
    drop(file);

    let mtime = filetime::FileTime::from_system_time(
        SystemTime::now() - Duration::from_secs(minutes_old * 60),
    );
    filetime::set_file_mtime(&path, mtime).unwrap();
    path
}

/// A usage probe that replays a scripted sequence of readings and then
/// repeats the final reading forever.
pub struct ScriptedProbe {
    readings: RefCell<Vec<u8>>,
}

impl ScriptedProbe {
    pub fn new(mut readings: Vec<u8>) -> Self {
        assert!(!readings.is_empty());
        readings.reverse();
        Self {
            readings: RefCell::new(readings),
        }
    }
}

impl UsageProbe for ScriptedProbe {
    fn percent_used(&self, _path: &Path) -> Result<u8> {
        let mut readings = self.readings.borrow_mut();
        if readings.len() > 1 {
            Ok(readings.pop().unwrap())
        } else {
            Ok(*readings.last().unwrap())
        }
    }
}

/// A probe that always reports the same usage.
pub struct ConstantProbe(pub u8);

impl UsageProbe for ConstantProbe {
    fn percent_used(&self, _path: &Path) -> Result<u8> {
        Ok(self.0)
    }
}
