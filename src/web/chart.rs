//! Scatter data for web visualization
//!
//! Converts a HotspotTable into the JSON shape the embedded page feeds
//! to Plotly: one point per row, x = complexity, y = changes.

use serde::Serialize;

use crate::changes::ChangeMode;
use crate::classify::Category;
use crate::complexity::ComplexityMode;
use crate::model::HotspotTable;

/// Complete scatter for visualization
#[derive(Debug, Clone, Serialize)]
pub struct ScatterData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<Point>,
    pub legend: Vec<LegendEntry>,
}

/// A single row as a scatter point
#[derive(Debug, Clone, Serialize)]
pub struct Point {
    pub x: u64,
    pub y: u64,
    /// Root-relative path shown on hover
    pub label: String,
    pub category: Category,
    pub color: &'static str,
    pub score: u64,
}

/// Colour key for one category
#[derive(Debug, Clone, Serialize)]
pub struct LegendEntry {
    pub category: Category,
    pub color: &'static str,
    pub count: usize,
}

fn x_label(complexity: ComplexityMode) -> String {
    match complexity {
        ComplexityMode::Lines => "Complexity (lines of code)".to_string(),
        ComplexityMode::Indentation => "Complexity (leading whitespace)".to_string(),
    }
}

fn y_label(changes: ChangeMode, months_back: Option<u32>) -> String {
    let metric = match changes {
        ChangeMode::Commits => "Commits",
        ChangeMode::Lines => "Lines changed",
    };
    match months_back {
        Some(months) => format!("{} (past {} months)", metric, months),
        None => format!("{} (full history)", metric),
    }
}

/// Convert a HotspotTable to ScatterData
pub fn table_to_scatter(table: &HotspotTable) -> ScatterData {
    let points: Vec<Point> = table
        .rows
        .iter()
        .map(|row| Point {
            x: row.complexity,
            y: row.changes,
            label: row.path.clone(),
            category: row.category,
            color: row.category.color(),
            score: row.score(),
        })
        .collect();

    let legend = Category::ALL
        .iter()
        .map(|category| LegendEntry {
            category: *category,
            color: category.color(),
            count: points.iter().filter(|p| p.category == *category).count(),
        })
        .filter(|entry| entry.count > 0)
        .collect();

    ScatterData {
        title: format!("Complexity vs Changes: {}", table.root.display()),
        x_label: x_label(table.settings.complexity),
        y_label: y_label(table.settings.changes, table.settings.months_back),
        points,
        legend,
    }
}
