//! Depth-based aggregation
//!
//! Folds root-relative rows into nodes `depth + 1` components deep:
//!
//! - deeper rows are summed into the directory node of their leading
//!   components (`src/api/routes.py` at depth 0 becomes `src/`),
//! - rows exactly that deep are kept as they are, file or directory,
//! - shallower rows are out of scope and dropped.
//!
//! The sum of each metric over the produced nodes equals the sum over the
//! input rows that were in scope, and aggregating the output again at the
//! same depth returns it unchanged.

use std::collections::HashMap;
use std::path::Path;

use crate::enumerate::relative_path;
use crate::model::{FileRecord, MetricRow};

/// Convert a configured depth level into an aggregation depth
///
/// Negative levels disable aggregation.
pub fn depth_from_level(level: i64) -> Option<usize> {
    usize::try_from(level).ok()
}

/// Turn populated records into rows relative to the enumeration `root`
pub fn to_metric_rows(records: &[FileRecord], root: &Path) -> Vec<MetricRow> {
    records
        .iter()
        .map(|record| {
            debug_assert!(record.is_complete(), "unpopulated record {:?}", record.path);
            MetricRow::new(
                relative_path(root, &record.path),
                record.complexity.unwrap_or(0),
                record.changes.unwrap_or(0),
            )
        })
        .collect()
}

/// Node path for `row` at the given depth, or `None` when out of scope
fn truncated_path(row: &MetricRow, depth: usize) -> Option<String> {
    let keep = depth + 1;
    let components = row.components();

    if components.len() > keep {
        Some(format!("{}/", components[..keep].join("/")))
    } else if components.len() == keep {
        Some(row.path.clone())
    } else {
        None
    }
}

/// Aggregate rows at `depth`; `None` returns the rows unchanged
///
/// Nodes appear in the order their first contributing row appeared.
pub fn aggregate(rows: &[MetricRow], depth: Option<usize>) -> Vec<MetricRow> {
    let Some(depth) = depth else {
        return rows.to_vec();
    };

    let mut nodes: Vec<MetricRow> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let Some(path) = truncated_path(row, depth) else {
            log::debug!("{} is shallower than depth {}, dropped", row.path, depth);
            continue;
        };

        match index.get(&path) {
            Some(&i) => {
                nodes[i].complexity += row.complexity;
                nodes[i].changes += row.changes;
            }
            None => {
                index.insert(path.clone(), nodes.len());
                nodes.push(MetricRow::new(path, row.complexity, row.changes));
            }
        }
    }

    nodes
}
