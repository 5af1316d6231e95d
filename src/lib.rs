//! # repo-hotspots - Complexity vs Change Analysis
//!
//! A tool for finding the parts of a git repository that are both complex
//! and frequently modified, a common proxy for defect risk and
//! maintenance cost.
//!
//! ## Overview
//!
//! Every tracked file gets two numbers:
//!
//! 1. **Complexity** - a cheap proxy: line count, or leading whitespace
//!    summed over code lines
//! 2. **Changes** - activity from `git log`: commits touching the file, or
//!    lines added plus deleted, optionally over a trailing window
//!
//! Files can be folded into directory nodes at a chosen depth, then each
//! row is classified for plotting.
//!
//! ## Usage
//!
//! ```bash
//! # Analyze the current repository
//! repo-hotspots .
//!
//! # Top lists only, last 6 months
//! repo-hotspots --summary --months 6 .
//!
//! # One node per top-level directory, served as a scatter
//! repo-hotspots --depth 0 --web .
//! ```

pub mod aggregate;
pub mod analysis;
pub mod changes;
pub mod classify;
pub mod complexity;
pub mod config;
pub mod enumerate;
pub mod history;
pub mod model;
pub mod report;
pub mod repository;
pub mod web;

pub use aggregate::{aggregate, depth_from_level, to_metric_rows};
pub use analysis::{Analysis, AnalysisError, AnalysisTimings, analyze, analyze_with};
pub use changes::{ChangeMetric, ChangeMode, CommitCount, LinesChanged, compute_changes};
pub use classify::{Category, classify};
pub use complexity::{
    ComplexityMetric, ComplexityMode, IndentationMass, LineCount, compute_complexity,
};
pub use config::{
    AnalysisConfig, CompiledConfig, ConfigError, HotspotsConfig, ReportConfig,
    load_compiled_config, load_config,
};
pub use enumerate::{ExclusionRules, enumerate_files};
pub use history::{GitCli, HistoryError, HistorySource, TimeWindow};
pub use model::{FileRecord, HotspotRow, HotspotTable, MetricRow, NodeKind, TableSettings};
pub use report::{generate_json, generate_summary, generate_table, generate_timings};
pub use repository::{RepositoryError, find_repository_root};
