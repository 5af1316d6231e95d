//! Version-control history queries
//!
//! The analysis needs two shapes of `git log` output:
//!
//! 1. every path touched by every commit in the window
//!    (`git log --pretty=format: --name-only`), tallied per path;
//! 2. per-commit added/deleted line counts for one path
//!    (`git log --pretty=format: --numstat -- <path>`), summed.
//!
//! [`HistorySource`] is the seam between issuing those queries and parsing
//! their text. [`GitCli`] runs the `git` binary; tests plug in canned output.

use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{Days, Local, NaiveDate};
use thiserror::Error;

/// Days per month used when converting a month window into a cutoff date
pub const DAYS_PER_MONTH: u64 = 30;

/// Errors from history queries. All of them abort the run.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to run git: {0}")]
    Spawn(#[from] io::Error),

    #[error("git {} exited with {status}: {stderr}", args.join(" "))]
    QueryFailed {
        args: Vec<String>,
        status: String,
        stderr: String,
    },
}

/// Trailing window of history to consider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    /// The whole history
    #[default]
    Unbounded,
    /// Commits on or after the given date
    Since(NaiveDate),
}

impl TimeWindow {
    /// Window covering `months_back` months before `today`
    ///
    /// Negative values select the whole history. A month is 30 days.
    pub fn from_months_back(months_back: i64, today: NaiveDate) -> Self {
        if months_back < 0 {
            return TimeWindow::Unbounded;
        }
        let days = DAYS_PER_MONTH.saturating_mul(months_back as u64);
        let cutoff = today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        TimeWindow::Since(cutoff)
    }

    /// Window covering `months_back` months before the local date
    pub fn last_months(months_back: i64) -> Self {
        Self::from_months_back(months_back, Local::now().date_naive())
    }

    pub fn cutoff(&self) -> Option<NaiveDate> {
        match self {
            TimeWindow::Unbounded => None,
            TimeWindow::Since(date) => Some(*date),
        }
    }

    /// The `--since` argument for this window, if bounded
    pub fn since_arg(&self) -> Option<String> {
        self.cutoff()
            .map(|date| format!("--since={}", date.format("%Y-%m-%d")))
    }
}

/// Source of raw history output
pub trait HistorySource: Send + Sync {
    /// Paths touched per commit, one per line, relative to the repository root
    fn touched_files(&self, window: &TimeWindow) -> Result<String, HistoryError>;

    /// `added<TAB>deleted<TAB>path` lines for every commit touching `relative_path`
    fn line_stats(
        &self,
        relative_path: &str,
        window: &TimeWindow,
    ) -> Result<String, HistoryError>;
}

/// History source backed by the `git` command line
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_root: PathBuf,
    program: OsString,
}

impl GitCli {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            program: OsString::from("git"),
        }
    }

    /// Use a different git executable
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Arguments of the whole-tree touch query
    pub fn touched_files_args(window: &TimeWindow) -> Vec<String> {
        let mut args = vec![
            "-c".to_string(),
            "core.quotepath=off".to_string(),
            "log".to_string(),
            "--pretty=format:".to_string(),
            "--name-only".to_string(),
            "-M".to_string(),
        ];
        args.extend(window.since_arg());
        args
    }

    /// Arguments of the per-file line statistics query
    ///
    /// The path is matched literally, so names holding `[`, `*` or `?`
    /// never pick up other files' history.
    pub fn line_stats_args(relative_path: &str, window: &TimeWindow) -> Vec<String> {
        let mut args = vec![
            "-c".to_string(),
            "core.quotepath=off".to_string(),
            "--literal-pathspecs".to_string(),
            "log".to_string(),
            "--pretty=format:".to_string(),
            "--numstat".to_string(),
        ];
        args.extend(window.since_arg());
        args.push("--".to_string());
        args.push(relative_path.to_string());
        args
    }

    fn run(&self, args: Vec<String>) -> Result<String, HistoryError> {
        log::debug!("git -C {} {}", self.repo_root.display(), args.join(" "));

        let output = Command::new(&self.program)
            .arg("-C")
            .arg(&self.repo_root)
            .args(&args)
            .output()?;

        if !output.status.success() {
            return Err(HistoryError::QueryFailed {
                args,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl HistorySource for GitCli {
    fn touched_files(&self, window: &TimeWindow) -> Result<String, HistoryError> {
        self.run(Self::touched_files_args(window))
    }

    fn line_stats(
        &self,
        relative_path: &str,
        window: &TimeWindow,
    ) -> Result<String, HistoryError> {
        self.run(Self::line_stats_args(relative_path, window))
    }
}

/// Count how many times each path appears in `--name-only` output
///
/// Blank lines separate commits and are discarded.
pub fn tally_touches(output: &str) -> HashMap<String, u64> {
    let mut tally: HashMap<String, u64> = HashMap::new();
    for line in output.lines() {
        let trimmed = line.trim_end_matches('\r');
        if trimmed.trim().is_empty() {
            continue;
        }
        *tally.entry(unquote_path(trimmed)).or_insert(0) += 1;
    }
    tally
}

/// Sum added and deleted lines over `--numstat` output
///
/// Binary files report `-` for both counts and contribute nothing.
pub fn sum_numstat(output: &str) -> u64 {
    let mut total = 0u64;
    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.splitn(3, '\t');
        let (Some(added), Some(deleted), Some(_path)) = (parts.next(), parts.next(), parts.next())
        else {
            log::debug!("Ignoring unexpected numstat line: {}", trimmed);
            continue;
        };

        if added == "-" || deleted == "-" {
            continue;
        }

        match (added.parse::<u64>(), deleted.parse::<u64>()) {
            (Ok(a), Ok(d)) => total += a + d,
            _ => log::debug!("Ignoring unexpected numstat line: {}", trimmed),
        }
    }
    total
}

/// Undo git's C-style quoting of unusual path names
///
/// Even with `core.quotepath=off`, git quotes paths holding control
/// characters, `"` or `\`. Unquoted paths are returned as-is.
pub fn unquote_path(raw: &str) -> String {
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return raw.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut iter = inner.bytes().peekable();
    while let Some(b) = iter.next() {
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        match iter.next() {
            Some(b'n') => bytes.push(b'\n'),
            Some(b't') => bytes.push(b'\t'),
            Some(b'r') => bytes.push(b'\r'),
            Some(b'a') => bytes.push(0x07),
            Some(b'b') => bytes.push(0x08),
            Some(b'f') => bytes.push(0x0c),
            Some(b'v') => bytes.push(0x0b),
            Some(d @ b'0'..=b'7') => {
                let mut value = u32::from(d - b'0');
                for _ in 0..2 {
                    match iter.peek() {
                        Some(&o @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(o - b'0');
                            iter.next();
                        }
                        _ => break,
                    }
                }
                bytes.push(value as u8);
            }
            Some(other) => bytes.push(other),
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
