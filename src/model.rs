//! Hotspot data structures
//!
//! A run moves through three shapes:
//!
//! 1. [`FileRecord`] - one per enumerated file, keyed by canonical path,
//!    with the metric columns filled in by the strategies.
//! 2. [`MetricRow`] - root-relative rows, either files or directory
//!    aggregates. The depth aggregator consumes and produces these.
//! 3. [`HotspotRow`] - a classified row handed to reports and the web UI.

use std::path::PathBuf;

use serde::Serialize;

use crate::changes::ChangeMode;
use crate::classify::{Category, classify};
use crate::complexity::ComplexityMode;

/// Per-file measurements for a single enumerated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Canonical absolute path
    pub path: PathBuf,
    /// Complexity proxy, `None` until a complexity strategy ran
    pub complexity: Option<u64>,
    /// Change activity, `None` until a change strategy ran
    pub changes: Option<u64>,
}

impl FileRecord {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            complexity: None,
            changes: None,
        }
    }

    pub fn with_complexity(self, complexity: u64) -> Self {
        Self {
            complexity: Some(complexity),
            ..self
        }
    }

    pub fn with_changes(self, changes: u64) -> Self {
        Self {
            changes: Some(changes),
            ..self
        }
    }

    /// Whether both metric columns have been populated
    pub fn is_complete(&self) -> bool {
        self.complexity.is_some() && self.changes.is_some()
    }
}

/// Whether a row stands for a single file or a directory aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// A root-relative row, either a file or an aggregate node
///
/// `path` uses `/` separators. Directory rows carry a trailing `/`, which
/// is also how [`MetricRow::kind`] tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRow {
    pub path: String,
    pub complexity: u64,
    pub changes: u64,
}

impl MetricRow {
    pub fn new(path: impl Into<String>, complexity: u64, changes: u64) -> Self {
        Self {
            path: path.into(),
            complexity,
            changes,
        }
    }

    pub fn kind(&self) -> NodeKind {
        if self.path.ends_with('/') {
            NodeKind::Directory
        } else {
            NodeKind::File
        }
    }

    /// Path components, ignoring the directory marker
    pub fn components(&self) -> Vec<&str> {
        self.path.split('/').filter(|c| !c.is_empty()).collect()
    }
}

/// A classified row of the final table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HotspotRow {
    pub path: String,
    pub complexity: u64,
    pub changes: u64,
    pub kind: NodeKind,
    pub category: Category,
}

impl HotspotRow {
    /// Hotspot score: rows that are both complex and busy rank first
    pub fn score(&self) -> u64 {
        self.complexity.saturating_mul(self.changes)
    }
}

impl From<MetricRow> for HotspotRow {
    fn from(row: MetricRow) -> Self {
        let kind = row.kind();
        let category = classify(&row.path);
        Self {
            path: row.path,
            complexity: row.complexity,
            changes: row.changes,
            kind,
            category,
        }
    }
}

/// Settings a table was produced with, echoed into reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSettings {
    pub complexity: ComplexityMode,
    pub changes: ChangeMode,
    /// `None` means the whole history was considered
    pub months_back: Option<u32>,
    /// `None` means no aggregation
    pub depth: Option<usize>,
}

/// The final hotspot table
#[derive(Debug, Clone, Serialize)]
pub struct HotspotTable {
    /// Canonical enumeration root
    pub root: PathBuf,
    /// Canonical repository root
    pub repository: PathBuf,
    pub settings: TableSettings,
    pub rows: Vec<HotspotRow>,
}

impl HotspotTable {
    pub fn total_complexity(&self) -> u64 {
        self.rows.iter().map(|r| r.complexity).sum()
    }

    pub fn total_changes(&self) -> u64 {
        self.rows.iter().map(|r| r.changes).sum()
    }

    /// Rows ordered by hotspot score, highest first; ties keep table order
    pub fn ranked(&self) -> Vec<&HotspotRow> {
        let mut rows: Vec<&HotspotRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| b.score().cmp(&a.score()));
        rows
    }

    /// The `n` most complex rows
    pub fn most_complex(&self, n: usize) -> Vec<&HotspotRow> {
        let mut rows: Vec<&HotspotRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| b.complexity.cmp(&a.complexity));
        rows.truncate(n);
        rows
    }

    /// The `n` most changed rows
    pub fn most_changed(&self, n: usize) -> Vec<&HotspotRow> {
        let mut rows: Vec<&HotspotRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| b.changes.cmp(&a.changes));
        rows.truncate(n);
        rows
    }
}
