//! Report generation for hotspot analysis
//!
//! Plain-text tables for the terminal and JSON for tooling.

use std::io::{self, Write};

use crate::analysis::AnalysisTimings;
use crate::model::{HotspotRow, HotspotTable};

const PATH_HEADER: &str = "Path";

fn path_width(rows: &[&HotspotRow]) -> usize {
    rows.iter()
        .map(|r| r.path.chars().count())
        .max()
        .unwrap_or(0)
        .max(PATH_HEADER.len())
}

fn settings_line(table: &HotspotTable) -> String {
    let window = match table.settings.months_back {
        Some(months) => format!("last {} months", months),
        None => "full history".to_string(),
    };
    let depth = match table.settings.depth {
        Some(depth) => format!("depth {}", depth),
        None => "per file".to_string(),
    };
    format!(
        "Complexity: {} | Changes: {} ({}) | {}",
        table.settings.complexity, table.settings.changes, window, depth
    )
}

/// Write the full table, highest hotspot score first
pub fn generate_table<W: Write>(table: &HotspotTable, writer: &mut W) -> io::Result<()> {
    let rows = table.ranked();
    let width = path_width(&rows);

    writeln!(writer, "Hotspot Analysis: {}", table.root.display())?;
    writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    writeln!(writer, "{}", settings_line(table))?;
    writeln!(writer)?;

    writeln!(
        writer,
        "{:<width$}  {:>10}  {:>8}  {:<13}",
        PATH_HEADER,
        "Complexity",
        "Changes",
        "Category",
        width = width
    )?;
    writeln!(writer, "{}", "-".repeat(width + 2 + 10 + 2 + 8 + 2 + 13))?;

    for row in &rows {
        writeln!(
            writer,
            "{:<width$}  {:>10}  {:>8}  {:<13}",
            row.path,
            row.complexity,
            row.changes,
            row.category.label(),
            width = width
        )?;
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "{} rows | total complexity {} | total changes {}",
        table.rows.len(),
        table.total_complexity(),
        table.total_changes()
    )?;

    Ok(())
}

fn write_ranking<W: Write>(
    writer: &mut W,
    title: &str,
    column: &str,
    rows: &[&HotspotRow],
    value: impl Fn(&HotspotRow) -> u64,
) -> io::Result<()> {
    let width = path_width(rows);
    writeln!(writer, "{}", title)?;
    writeln!(writer, "{:<width$}  {:>10}", PATH_HEADER, column, width = width)?;
    writeln!(writer, "{}", "-".repeat(width + 12))?;
    for row in rows {
        writeln!(writer, "{:<width$}  {:>10}", row.path, value(*row), width = width)?;
    }
    Ok(())
}

/// Write the top-`n` most complex and most changed rows
pub fn generate_summary<W: Write>(
    table: &HotspotTable,
    top: usize,
    writer: &mut W,
) -> io::Result<()> {
    writeln!(writer, "Hotspot Summary: {}", table.root.display())?;
    writeln!(writer, "{}", settings_line(table))?;
    writeln!(writer)?;

    write_ranking(
        writer,
        &format!("Top {} Most Complex", top),
        "Complexity",
        &table.most_complex(top),
        |r| r.complexity,
    )?;
    writeln!(writer)?;
    write_ranking(
        writer,
        &format!("Top {} Most Changed", top),
        "Changes",
        &table.most_changed(top),
        |r| r.changes,
    )?;
    writeln!(writer)?;
    write_ranking(
        writer,
        &format!("Top {} Hotspots (complexity x changes)", top),
        "Score",
        &table.ranked().into_iter().take(top).collect::<Vec<_>>(),
        |r| r.score(),
    )?;

    Ok(())
}

/// Write the table as pretty JSON
pub fn generate_json<W: Write>(table: &HotspotTable, writer: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, table).map_err(io::Error::other)?;
    writeln!(writer)
}

/// Write per-stage timings
pub fn generate_timings<W: Write>(timings: &AnalysisTimings, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "Enumeration: {:.2?}", timings.enumerate)?;
    writeln!(writer, "Complexity calculations: {:.2?}", timings.complexity)?;
    writeln!(writer, "Change calculations: {:.2?}", timings.changes)?;
    writeln!(writer, "Aggregation: {:.2?}", timings.aggregate)?;
    writeln!(writer, "Total: {:.2?}", timings.total())
}
