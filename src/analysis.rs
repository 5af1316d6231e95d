//! Hotspot analysis pipeline
//!
//! Locate repository -> enumerate files -> complexity -> changes ->
//! aggregate -> classify. Every stage hands a fresh collection to the
//! next; aggregation only starts once both metric columns are populated
//! for every file.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;

use crate::aggregate::{aggregate, to_metric_rows};
use crate::changes::compute_changes;
use crate::complexity::compute_complexity;
use crate::config::{CompiledConfig, ConfigError};
use crate::enumerate::enumerate_files;
use crate::history::{GitCli, HistoryError, HistorySource, TimeWindow};
use crate::model::{FileRecord, HotspotRow, HotspotTable, TableSettings};
use crate::repository::{RepositoryError, find_repository_root};

/// Errors that abort an analysis run
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("History query failed: {0}")]
    History(#[from] HistoryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Wall time spent in each stage
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AnalysisTimings {
    pub enumerate: Duration,
    pub complexity: Duration,
    pub changes: Duration,
    pub aggregate: Duration,
}

impl AnalysisTimings {
    pub fn total(&self) -> Duration {
        self.enumerate + self.complexity + self.changes + self.aggregate
    }
}

/// Result of a run: the table plus bookkeeping
#[derive(Debug, Clone)]
pub struct Analysis {
    pub table: HotspotTable,
    /// Number of files enumerated before aggregation
    pub files: usize,
    pub timings: AnalysisTimings,
}

/// Analyze the tree at `path` using the `git` binary for history
pub fn analyze(path: &Path, config: &CompiledConfig) -> Result<Analysis, AnalysisError> {
    let root = canonical_root(path)?;
    let repository = find_repository_root(&root)?;
    let history = GitCli::new(&repository);
    let window = TimeWindow::last_months(config.months_back);

    analyze_with(&root, &repository, config, &history, window)
}

/// Analyze with an explicit history source and window
///
/// `root` and `repository` must be canonical, with `root` inside
/// `repository`.
pub fn analyze_with(
    root: &Path,
    repository: &Path,
    config: &CompiledConfig,
    history: &dyn HistorySource,
    window: TimeWindow,
) -> Result<Analysis, AnalysisError> {
    let mut timings = AnalysisTimings::default();

    let start = Instant::now();
    let records: Vec<FileRecord> = enumerate_files(root, &config.exclusion_rules())
        .into_iter()
        .map(FileRecord::new)
        .collect();
    let files = records.len();
    timings.enumerate = start.elapsed();
    log::debug!("Enumerated {} files under {}", files, root.display());

    let start = Instant::now();
    let complexity = config.complexity.metric();
    let records = compute_complexity(records, complexity.as_ref());
    timings.complexity = start.elapsed();

    let start = Instant::now();
    let changes = config.changes.metric(history, window)?;
    let records = compute_changes(records, repository, changes.as_ref())?;
    timings.changes = start.elapsed();

    let start = Instant::now();
    let rows = aggregate(&to_metric_rows(&records, root), config.depth);
    timings.aggregate = start.elapsed();

    let table = HotspotTable {
        root: root.to_path_buf(),
        repository: repository.to_path_buf(),
        settings: TableSettings {
            complexity: config.complexity,
            changes: config.changes,
            months_back: window_months(config.months_back),
            depth: config.depth,
        },
        rows: rows.into_iter().map(HotspotRow::from).collect(),
    };

    Ok(Analysis {
        table,
        files,
        timings,
    })
}

fn window_months(months_back: i64) -> Option<u32> {
    if months_back < 0 {
        None
    } else {
        Some(u32::try_from(months_back).unwrap_or(u32::MAX))
    }
}

fn canonical_root(path: &Path) -> Result<PathBuf, AnalysisError> {
    let root = path
        .canonicalize()
        .map_err(|e| AnalysisError::InvalidPath(format!("{}: {}", path.display(), e)))?;
    if !root.is_dir() {
        return Err(AnalysisError::InvalidPath(format!(
            "{} is not a directory",
            path.display()
        )));
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::ChangeMode;
    use crate::classify::Category;
    use crate::complexity::ComplexityMode;
    use crate::model::NodeKind;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    struct CannedHistory {
        touched: String,
        stats: HashMap<String, String>,
    }

    impl HistorySource for CannedHistory {
        fn touched_files(&self, _window: &TimeWindow) -> Result<String, HistoryError> {
            Ok(self.touched.clone())
        }

        fn line_stats(
            &self,
            relative_path: &str,
            _window: &TimeWindow,
        ) -> Result<String, HistoryError> {
            Ok(self.stats.get(relative_path).cloned().unwrap_or_default())
        }
    }

    struct BrokenHistory;

    impl HistorySource for BrokenHistory {
        fn touched_files(&self, _window: &TimeWindow) -> Result<String, HistoryError> {
            Err(HistoryError::QueryFailed {
                args: vec!["log".to_string()],
                status: "exit status: 128".to_string(),
                stderr: "fatal: your current branch does not have any commits yet".to_string(),
            })
        }

        fn line_stats(&self, _: &str, window: &TimeWindow) -> Result<String, HistoryError> {
            self.touched_files(window)
        }
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn repo() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        let root = dir.path().canonicalize().unwrap();
        (dir, root)
    }

    #[test]
    fn test_two_file_scenario() {
        let (_dir, root) = repo();
        write(&root, "a.py", &"x = 1\n".repeat(10));
        write(&root, "b.yaml", "a: 1\nb: 2\nc: 3\n");

        let history = CannedHistory {
            touched: "a.py\n\na.py\n".to_string(),
            stats: HashMap::new(),
        };
        let analysis = analyze_with(
            &root,
            &root,
            &CompiledConfig::empty(),
            &history,
            TimeWindow::Unbounded,
        )
        .unwrap();

        let rows: Vec<(&str, u64, u64)> = analysis
            .table
            .rows
            .iter()
            .map(|r| (r.path.as_str(), r.complexity, r.changes))
            .collect();
        assert_eq!(rows, vec![("a.py", 10, 2), ("b.yaml", 3, 0)]);
        assert_eq!(analysis.files, 2);
        assert_eq!(analysis.table.rows[0].category, Category::Source);
        assert_eq!(analysis.table.rows[1].category, Category::ConfigFormat);
    }

    #[test]
    fn test_git_directory_is_not_enumerated() {
        let (_dir, root) = repo();
        write(&root, "main.py", "pass\n");

        let history = CannedHistory {
            touched: String::new(),
            stats: HashMap::new(),
        };
        let analysis = analyze_with(
            &root,
            &root,
            &CompiledConfig::empty(),
            &history,
            TimeWindow::Unbounded,
        )
        .unwrap();

        assert_eq!(analysis.table.rows.len(), 1);
        assert_eq!(analysis.table.rows[0].path, "main.py");
    }

    #[test]
    fn test_nested_git_marker_file_is_not_enumerated() {
        let (_dir, root) = repo();
        write(&root, "main.py", "pass\n");
        write(&root, "vendored/.git", "gitdir: ../.git/modules/vendored\n");
        write(&root, "vendored/lib.py", "x\n");

        let history = CannedHistory {
            touched: String::new(),
            stats: HashMap::new(),
        };
        let analysis = analyze_with(
            &root,
            &root,
            &CompiledConfig::empty(),
            &history,
            TimeWindow::Unbounded,
        )
        .unwrap();

        let paths: Vec<&str> = analysis.table.rows.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["main.py", "vendored/lib.py"]);
    }

    #[test]
    fn test_subdirectory_root_uses_repository_keys() {
        let (_dir, repository) = repo();
        write(&repository, "service/app.py", "a\nb\n");
        write(&repository, "other/skip.py", "a\n");
        let root = repository.join("service");

        let history = CannedHistory {
            touched: "service/app.py\nother/skip.py\n\nservice/app.py\n".to_string(),
            stats: HashMap::new(),
        };
        let analysis = analyze_with(
            &root,
            &repository,
            &CompiledConfig::empty(),
            &history,
            TimeWindow::Unbounded,
        )
        .unwrap();

        assert_eq!(analysis.table.rows.len(), 1);
        assert_eq!(analysis.table.rows[0].path, "app.py");
        assert_eq!(analysis.table.rows[0].changes, 2);
    }

    #[test]
    fn test_aggregated_run() {
        let (_dir, root) = repo();
        write(&root, "src/x.py", &"l\n".repeat(5));
        write(&root, "src/y.py", &"l\n".repeat(7));

        let history = CannedHistory {
            touched: String::new(),
            stats: HashMap::from([
                ("src/x.py".to_string(), "1\t0\tsrc/x.py\n".to_string()),
                ("src/y.py".to_string(), "1\t1\tsrc/y.py\n".to_string()),
            ]),
        };
        let config = CompiledConfig {
            changes: ChangeMode::Lines,
            depth: Some(0),
            ..CompiledConfig::empty()
        };
        let analysis =
            analyze_with(&root, &root, &config, &history, TimeWindow::Unbounded).unwrap();

        assert_eq!(analysis.table.rows.len(), 1);
        let node = &analysis.table.rows[0];
        assert_eq!(node.path, "src/");
        assert_eq!(node.kind, NodeKind::Directory);
        assert_eq!(node.category, Category::Directory);
        assert_eq!((node.complexity, node.changes), (12, 3));
        assert_eq!(analysis.table.settings.depth, Some(0));
        assert_eq!(analysis.table.settings.changes, ChangeMode::Lines);
    }

    #[test]
    fn test_indentation_strategy() {
        let (_dir, root) = repo();
        write(&root, "f.py", "def f():\n    # note\n    return 1\n");

        let history = CannedHistory {
            touched: String::new(),
            stats: HashMap::new(),
        };
        let config = CompiledConfig {
            complexity: ComplexityMode::Indentation,
            ..CompiledConfig::empty()
        };
        let analysis =
            analyze_with(&root, &root, &config, &history, TimeWindow::Unbounded).unwrap();
        assert_eq!(analysis.table.rows[0].complexity, 4);
    }

    #[test]
    fn test_history_failure_aborts() {
        let (_dir, root) = repo();
        write(&root, "a.py", "x\n");

        let result = analyze_with(
            &root,
            &root,
            &CompiledConfig::empty(),
            &BrokenHistory,
            TimeWindow::Unbounded,
        );
        assert!(matches!(result, Err(AnalysisError::History(_))));
    }

    #[test]
    fn test_invalid_root() {
        let dir = TempDir::new().unwrap();
        let result = analyze(&dir.path().join("missing"), &CompiledConfig::empty());
        assert!(matches!(result, Err(AnalysisError::InvalidPath(_))));

        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        let result = analyze(&file, &CompiledConfig::empty());
        assert!(matches!(result, Err(AnalysisError::InvalidPath(_))));
    }

    #[test]
    fn test_window_months() {
        assert_eq!(window_months(-1), None);
        assert_eq!(window_months(6), Some(6));
    }
}
