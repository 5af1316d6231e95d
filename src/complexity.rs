//! Complexity proxies
//!
//! Two cheap stand-ins for structural complexity:
//!
//! - **Line count**: number of lines in the file.
//! - **Indentation mass**: total leading whitespace over code lines.
//!   Blank lines and lines starting with a comment marker are ignored,
//!   since their indentation carries no nesting signal.
//!
//! Files are decoded lossily. Invalid UTF-8 sequences are dropped and the
//! rest of the file is still measured; a file that cannot be read at all
//! measures as zero and is reported with a warning.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::ConfigError;
use crate::model::FileRecord;

/// Line prefixes that mark a comment line
pub const COMMENT_MARKERS: &[&str] = &["#", "//", "/*", "*"];

/// Selects the complexity proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityMode {
    /// Newline-delimited line count
    #[default]
    Lines,
    /// Leading whitespace summed over code lines
    Indentation,
}

impl ComplexityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityMode::Lines => "lines",
            ComplexityMode::Indentation => "indentation",
        }
    }

    /// Resolve the mode into its strategy
    pub fn metric(&self) -> Box<dyn ComplexityMetric> {
        match self {
            ComplexityMode::Lines => Box::new(LineCount),
            ComplexityMode::Indentation => Box::new(IndentationMass),
        }
    }
}

impl FromStr for ComplexityMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lines" | "line-count" | "loc" => Ok(ComplexityMode::Lines),
            "indentation" | "whitespace" => Ok(ComplexityMode::Indentation),
            _ => Err(ConfigError::InvalidStrategy(format!(
                "unknown complexity strategy '{}' (expected 'lines' or 'indentation')",
                s
            ))),
        }
    }
}

impl fmt::Display for ComplexityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complexity proxy measured on decoded file text
pub trait ComplexityMetric: Send + Sync {
    /// Measure already-decoded text
    fn measure_text(&self, text: &str) -> u64;

    /// Read and measure a file, absorbing read failures
    fn measure(&self, path: &Path) -> u64 {
        match fs::read(path) {
            Ok(bytes) => self.measure_text(&decode_lossy(&bytes)),
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                0
            }
        }
    }
}

/// Total number of lines
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCount;

impl ComplexityMetric for LineCount {
    fn measure_text(&self, text: &str) -> u64 {
        text.lines().count() as u64
    }
}

/// Total leading whitespace over non-blank, non-comment lines
#[derive(Debug, Clone, Copy, Default)]
pub struct IndentationMass;

impl IndentationMass {
    fn is_comment(stripped: &str) -> bool {
        COMMENT_MARKERS.iter().any(|m| stripped.starts_with(m))
    }
}

impl ComplexityMetric for IndentationMass {
    fn measure_text(&self, text: &str) -> u64 {
        text.lines()
            .filter(|line| {
                let stripped = line.trim();
                !stripped.is_empty() && !Self::is_comment(stripped)
            })
            .map(|line| line.chars().take_while(|c| c.is_whitespace()).count() as u64)
            .sum()
    }
}

/// Decode bytes as UTF-8, dropping invalid sequences
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Fill in the complexity column of every record
///
/// Files are measured in parallel; output order matches input order.
pub fn compute_complexity(
    records: Vec<FileRecord>,
    metric: &dyn ComplexityMetric,
) -> Vec<FileRecord> {
    records
        .into_par_iter()
        .map(|record| {
            let complexity = metric.measure(&record.path);
            record.with_complexity(complexity)
        })
        .collect()
}
