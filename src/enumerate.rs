//! File enumeration with exclusion rules
//!
//! Directories named in the exclusion set are pruned during the walk, so
//! their contents are never visited. Files are dropped by base name or by a
//! glob pattern over the root-relative path.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::{DirEntry, WalkDir};

/// Exclusion rules applied while walking a tree
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    /// Directory names whose subtrees are pruned, at any depth
    pub dirs: HashSet<String>,
    /// File base names that are skipped
    pub files: HashSet<String>,
    /// Patterns matched against `/`-separated root-relative paths
    pub patterns: Vec<Pattern>,
}

impl ExclusionRules {
    pub fn new<D, F>(dirs: D, files: F) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
            files: files.into_iter().map(Into::into).collect(),
            patterns: Vec::new(),
        }
    }

    pub fn with_patterns(mut self, patterns: Vec<Pattern>) -> Self {
        self.patterns = patterns;
        self
    }

    fn matches_pattern(&self, relative: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(relative))
    }

    /// Whether the walk should descend into / yield this entry
    fn keeps(&self, root: &Path, entry: &DirEntry) -> bool {
        // The root itself is always walked
        if entry.depth() == 0 {
            return true;
        }

        let name = entry.file_name().to_string_lossy();
        let relative = relative_path(root, entry.path());

        if entry.file_type().is_dir() {
            !self.dirs.contains(name.as_ref()) && !self.matches_pattern(&relative)
        } else {
            !self.files.contains(name.as_ref()) && !self.matches_pattern(&relative)
        }
    }
}

/// Render `path` relative to `root` with `/` separators
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Enumerate analyzable files under `root`
///
/// Order follows the walk (entries sorted by file name within a directory),
/// which keeps repeated runs stable. Symlinks are not followed, so every
/// returned path lies under `root`.
pub fn enumerate_files(root: &Path, rules: &ExclusionRules) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| rules.keeps(root, entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}
