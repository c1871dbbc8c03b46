//! Glob exclusion rules.
//!
//! Exclusions are shell-style glob patterns (not regexes) applied as a
//! negative filter to every enumeration phase: a path matching any rule is
//! never listed, aged out, evicted, or pruned. Patterns are matched against
//! both the full path and the path relative to the scan root, so `*.log`
//! and `cache/tmp/*` both behave the way `find`-style filters do.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::{ReclaimError, Result};

/// An unordered set of glob exclusion rules.
///
/// Rules are combined with logical OR: matching any single rule excludes
/// the path. The set is append-only and performs no de-duplication.
#[derive(Debug, Default, Clone)]
pub struct ExclusionSet {
    patterns: Vec<String>,
}

impl ExclusionSet {
    /// Create an empty exclusion set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a glob pattern to the set.
    ///
    /// Empty patterns are silently ignored. Invalid glob syntax is
    /// rejected when the set is compiled by [`ExclusionSet::compile`].
    pub fn add(&mut self, pattern: impl Into<String>) {
        let pattern = pattern.into();
        if !pattern.is_empty() {
            self.patterns.push(pattern);
        }
    }

    /// Get the raw patterns in insertion order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Check if the set contains no rules.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Compile the rules into a matcher usable by the enumerator.
    pub fn compile(&self) -> Result<CompiledExclusions> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.patterns {
            let glob = Glob::new(pattern).map_err(|e| ReclaimError::InvalidPattern {
                value: pattern.clone(),
                message: e.to_string(),
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| ReclaimError::InvalidPattern {
            value: self.patterns.join(","),
            message: e.to_string(),
        })?;
        Ok(CompiledExclusions { set })
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for pattern in iter {
            set.add(pattern);
        }
        set
    }
}

/// A compiled exclusion matcher.
#[derive(Debug)]
pub struct CompiledExclusions {
    set: GlobSet,
}

impl CompiledExclusions {
    /// Check whether a path is excluded.
    ///
    /// Matches against the path as given and, when it lives under `root`,
    /// against its root-relative form as well.
    pub fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        if self.set.is_empty() {
            return false;
        }
        if self.set.is_match(path) {
            return true;
        }
        match path.strip_prefix(root) {
            Ok(relative) if !relative.as_os_str().is_empty() => self.set.is_match(relative),
            _ => false,
        }
    }
}
