//! Change-activity strategies
//!
//! - [`CommitCount`] runs one history query for the whole tree and counts
//!   how many commits touched each path. Cheap: one pass over history.
//! - [`LinesChanged`] runs one numstat query per file and sums added plus
//!   deleted lines. One process per file, so noticeably slower.
//!
//! Both honour the same [`TimeWindow`]. Any failed query aborts the run: a
//! partially filled change column would misrank hotspots.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::ConfigError;
use crate::enumerate::relative_path;
use crate::history::{HistoryError, HistorySource, TimeWindow, tally_touches, sum_numstat};
use crate::model::FileRecord;

/// Selects the change-activity strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeMode {
    /// Number of commits touching the file
    #[default]
    Commits,
    /// Added plus deleted lines over all commits touching the file
    Lines,
}

impl ChangeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeMode::Commits => "commits",
            ChangeMode::Lines => "lines",
        }
    }

    /// Resolve the mode into its strategy
    ///
    /// For [`ChangeMode::Commits`] this already runs the whole-tree query.
    pub fn metric<'a>(
        &self,
        history: &'a dyn HistorySource,
        window: TimeWindow,
    ) -> Result<Box<dyn ChangeMetric + 'a>, HistoryError> {
        Ok(match self {
            ChangeMode::Commits => Box::new(CommitCount::load(history, &window)?),
            ChangeMode::Lines => Box::new(LinesChanged::new(history, window)),
        })
    }
}

impl FromStr for ChangeMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "commits" | "commit-count" | "touches" => Ok(ChangeMode::Commits),
            "lines" | "lines-changed" | "churn" => Ok(ChangeMode::Lines),
            _ => Err(ConfigError::InvalidStrategy(format!(
                "unknown change strategy '{}' (expected 'commits' or 'lines')",
                s
            ))),
        }
    }
}

impl fmt::Display for ChangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Change activity for a repository-relative path
pub trait ChangeMetric: Send + Sync {
    fn changes(&self, relative_path: &str) -> Result<u64, HistoryError>;
}

/// Commit-touch count from a single whole-tree query
#[derive(Debug, Clone, Default)]
pub struct CommitCount {
    tally: HashMap<String, u64>,
}

impl CommitCount {
    pub fn load(history: &dyn HistorySource, window: &TimeWindow) -> Result<Self, HistoryError> {
        let output = history.touched_files(window)?;
        let tally = tally_touches(&output);
        log::debug!("Commit tally covers {} paths", tally.len());
        Ok(Self { tally })
    }

    pub fn from_tally(tally: HashMap<String, u64>) -> Self {
        Self { tally }
    }

    pub fn tracked_paths(&self) -> usize {
        self.tally.len()
    }
}

impl ChangeMetric for CommitCount {
    fn changes(&self, relative_path: &str) -> Result<u64, HistoryError> {
        // Never touched in the window
        Ok(self.tally.get(relative_path).copied().unwrap_or(0))
    }
}

/// Added plus deleted lines from one numstat query per file
pub struct LinesChanged<'a> {
    history: &'a dyn HistorySource,
    window: TimeWindow,
}

impl<'a> LinesChanged<'a> {
    pub fn new(history: &'a dyn HistorySource, window: TimeWindow) -> Self {
        Self { history, window }
    }
}

impl ChangeMetric for LinesChanged<'_> {
    fn changes(&self, relative_path: &str) -> Result<u64, HistoryError> {
        let output = self.history.line_stats(relative_path, &self.window)?;
        Ok(sum_numstat(&output))
    }
}

/// Key under which history reports `path`: repository-relative, `/`-separated
///
/// Returns `None` for paths outside the repository.
pub fn relative_key(repo_root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(repo_root)
        .ok()
        .map(|_| relative_path(repo_root, path))
}

/// Fill in the changes column of every record
///
/// `records` hold canonical absolute paths; `repo_root` is the canonical
/// repository root. Per-file lookups run in parallel and the first failure
/// aborts the whole computation. Output order matches input order.
pub fn compute_changes(
    records: Vec<FileRecord>,
    repo_root: &Path,
    metric: &dyn ChangeMetric,
) -> Result<Vec<FileRecord>, HistoryError> {
    records
        .into_par_iter()
        .map(|record| -> Result<FileRecord, HistoryError> {
            let changes = match relative_key(repo_root, &record.path) {
                Some(key) => metric.changes(&key)?,
                None => {
                    log::warn!(
                        "{} lies outside the repository, counting no changes",
                        record.path.display()
                    );
                    0
                }
            };
            Ok(record.with_changes(changes))
        })
        .collect()
}
