//! Configuration file support for repo-hotspots
//!
//! This module handles parsing `.hotspots.toml` configuration files that
//! control file exclusion, the metric strategies and aggregation.
//!
//! ## Configuration File Format
//!
//! ```toml
//! # .hotspots.toml
//!
//! [analysis]
//! # Directory names pruned from the walk, at any depth
//! exclude_dirs = [".git", "node_modules", "target"]
//!
//! # File base names skipped wherever they appear
//! exclude_files = [".git", "package-lock.json", "Cargo.lock"]
//!
//! # Glob patterns over root-relative paths
//! exclude = ["docs/generated/*"]
//!
//! # "lines" or "indentation"
//! complexity = "lines"
//!
//! # "commits" or "lines"
//! changes = "commits"
//!
//! # History window in months, -1 for the whole history
//! months_back = 12
//!
//! # Aggregation depth, negative to report individual files
//! depth = -1
//!
//! [report]
//! # Rows in each summary list
//! top = 5
//! ```

use glob::Pattern;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::aggregate::depth_from_level;
use crate::changes::ChangeMode;
use crate::complexity::ComplexityMode;
use crate::enumerate::ExclusionRules;
use crate::repository::GIT_MARKER;

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid glob pattern: {0}")]
    PatternError(String),

    #[error("Invalid strategy: {0}")]
    InvalidStrategy(String),
}

/// Analysis configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Directory names whose subtrees are never walked
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// File base names that are skipped
    #[serde(default = "default_exclude_files")]
    pub exclude_files: Vec<String>,

    /// Glob patterns over root-relative paths
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Complexity strategy name
    #[serde(default = "default_complexity")]
    pub complexity: String,

    /// Change strategy name
    #[serde(default = "default_changes")]
    pub changes: String,

    /// History window in months (negative = unbounded)
    #[serde(default = "default_months_back")]
    pub months_back: i64,

    /// Aggregation depth (negative = disabled)
    #[serde(default = "default_depth")]
    pub depth: i64,
}

fn default_exclude_dirs() -> Vec<String> {
    vec![GIT_MARKER.to_string()]
}

/// Submodules and worktrees mark their root with a `.git` file
fn default_exclude_files() -> Vec<String> {
    vec![GIT_MARKER.to_string()]
}

fn default_complexity() -> String {
    ComplexityMode::default().as_str().to_string()
}

fn default_changes() -> String {
    ChangeMode::default().as_str().to_string()
}

fn default_months_back() -> i64 {
    12
}

fn default_depth() -> i64 {
    -1
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: default_exclude_dirs(),
            exclude_files: default_exclude_files(),
            exclude: Vec::new(),
            complexity: default_complexity(),
            changes: default_changes(),
            months_back: default_months_back(),
            depth: default_depth(),
        }
    }
}

/// Report configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Rows in each summary list
    #[serde(default = "default_top")]
    pub top: usize,
}

fn default_top() -> usize {
    5
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top: default_top() }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HotspotsConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

/// Validated configuration, ready for a run
///
/// Strategy names are resolved and glob patterns compiled, so every
/// configuration mistake surfaces before any analysis work starts.
#[derive(Debug, Clone)]
pub struct CompiledConfig {
    pub exclude_dirs: HashSet<String>,
    pub exclude_files: HashSet<String>,
    pub exclude_patterns: Vec<Pattern>,
    pub complexity: ComplexityMode,
    pub changes: ChangeMode,
    /// Negative = whole history
    pub months_back: i64,
    /// `None` = no aggregation
    pub depth: Option<usize>,
    pub top: usize,
    /// File the configuration was read from, if any
    pub source: Option<PathBuf>,
}

impl CompiledConfig {
    /// Create a compiled config from raw config
    pub fn from_config(config: HotspotsConfig) -> Result<Self, ConfigError> {
        let exclude_patterns = config
            .analysis
            .exclude
            .iter()
            .map(|p| Pattern::new(p).map_err(|e| ConfigError::PatternError(format!("{}: {}", p, e))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            exclude_dirs: config.analysis.exclude_dirs.into_iter().collect(),
            exclude_files: config.analysis.exclude_files.into_iter().collect(),
            exclude_patterns,
            complexity: config.analysis.complexity.parse()?,
            changes: config.analysis.changes.parse()?,
            months_back: config.analysis.months_back,
            depth: depth_from_level(config.analysis.depth),
            top: config.report.top,
            source: None,
        })
    }

    /// Configuration with all defaults
    pub fn empty() -> Self {
        Self {
            exclude_dirs: default_exclude_dirs().into_iter().collect(),
            exclude_files: default_exclude_files().into_iter().collect(),
            exclude_patterns: Vec::new(),
            complexity: ComplexityMode::default(),
            changes: ChangeMode::default(),
            months_back: default_months_back(),
            depth: None,
            top: default_top(),
            source: None,
        }
    }

    /// Exclusion rules for the file enumerator
    pub fn exclusion_rules(&self) -> ExclusionRules {
        ExclusionRules {
            dirs: self.exclude_dirs.clone(),
            files: self.exclude_files.clone(),
            patterns: self.exclude_patterns.clone(),
        }
    }

    pub fn pattern_count(&self) -> usize {
        self.exclude_patterns.len()
    }
}

impl Default for CompiledConfig {
    fn default() -> Self {
        Self::empty()
    }
}

/// Load configuration from the project directory
///
/// Searches for `.hotspots.toml` in the given directory and parent directories.
/// `path` may also name a configuration file directly.
pub fn load_config(path: &Path) -> Result<(HotspotsConfig, Option<PathBuf>), ConfigError> {
    let config_path = if path.is_file() {
        Some(path.to_path_buf())
    } else {
        find_config_file(path)
    };

    match config_path {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: HotspotsConfig = toml::from_str(&content)?;
            log::debug!("Loaded configuration from {}", path.display());
            Ok((config, Some(path)))
        }
        None => Ok((HotspotsConfig::default(), None)),
    }
}

/// Find the config file by searching up the directory tree
fn find_config_file(start_path: &Path) -> Option<PathBuf> {
    let config_names = [".hotspots.toml", "hotspots.toml"];

    let mut current = start_path.canonicalize().ok()?;

    loop {
        for name in &config_names {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        // Move to parent directory
        if let Some(parent) = current.parent() {
            current = parent.to_path_buf();
        } else {
            break;
        }
    }

    None
}

/// Load and compile configuration
pub fn load_compiled_config(path: &Path) -> Result<CompiledConfig, ConfigError> {
    let (config, source) = load_config(path)?;
    let mut compiled = CompiledConfig::from_config(config)?;
    compiled.source = source;
    Ok(compiled)
}
