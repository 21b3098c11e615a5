//! Whitespace-aligned text tables.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use snow_agg::WindowTable;
use snow_core::errors::{ErrorInfo, SnowError};
use snow_core::{
    column_names, counts_column, energy_column, CategoryStats, ModelKey, PerCategory,
    TimeSeriesTable, TimeStepRecord, TOTAL,
};
use tracing::debug;

const TIME_COLUMN: &str = "time";
const MASS_COLUMN: &str = "mass";
const COUNTS_PREFIX: &str = "counts_";

fn shape_error(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
}

/// Left-justifies every cell to its column width, one space apart.
fn render(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(String::len).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }
    let mut out = String::new();
    for line in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(cells.join(" ").trim_end());
        out.push('\n');
    }
    out
}

fn stats_cells(stats: &PerCategory<CategoryStats>) -> Vec<String> {
    let energies = stats.labelled().map(|(_, s)| s.mean_energy.to_string());
    let counts = stats.labelled().map(|(_, s)| s.counts.to_string());
    energies.chain(counts).collect()
}

/// Renders a time-series table with `time`, `energy_*` then `counts_*` columns.
pub fn render_timebin_table(table: &TimeSeriesTable) -> String {
    let header = column_names(table.categories());
    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|record| {
            std::iter::once(record.time.to_string())
                .chain(stats_cells(&record.stats))
                .collect()
        })
        .collect();
    render(&header, &rows)
}

fn parse_rows(text: &str) -> Result<(Vec<String>, Vec<Vec<f64>>), SnowError> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());
    let header: Vec<String> = match lines.next() {
        Some((_, line)) => line.split_whitespace().map(str::to_string).collect(),
        None => {
            return Err(SnowError::DataShape(shape_error(
                "table-empty",
                "table text has no header",
            )))
        }
    };
    let mut rows = Vec::new();
    for (idx, line) in lines {
        let cells = line
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| {
                    SnowError::DataShape(
                        shape_error("table-number", "cell is not a number")
                            .with_context("line", idx + 1)
                            .with_context("value", token),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if cells.len() != header.len() {
            return Err(SnowError::DataShape(
                shape_error("table-width", "row width differs from header")
                    .with_context("line", idx + 1)
                    .with_context("expected", header.len())
                    .with_context("found", cells.len()),
            ));
        }
        rows.push(cells);
    }
    Ok((header, rows))
}

fn column_index(header: &[String], name: &str) -> Result<usize, SnowError> {
    header.iter().position(|column| column == name).ok_or_else(|| {
        SnowError::MissingData(
            ErrorInfo::new("table-column-missing", "expected column not found")
                .with_context("column", name),
        )
    })
}

/// Parses text produced by [`render_timebin_table`].
///
/// Categories are inferred from the `counts_*` columns in order.
pub fn parse_timebin_table(key: ModelKey, text: &str) -> Result<TimeSeriesTable, SnowError> {
    let (header, rows) = parse_rows(text)?;
    let time_idx = column_index(&header, TIME_COLUMN)?;
    let categories: Vec<String> = header
        .iter()
        .filter_map(|column| column.strip_prefix(COUNTS_PREFIX))
        .filter(|label| *label != TOTAL)
        .map(str::to_string)
        .collect();
    let lookup = |label: &str| -> Result<(usize, usize), SnowError> {
        Ok((
            column_index(&header, &energy_column(label))?,
            column_index(&header, &counts_column(label))?,
        ))
    };
    let total_idx = lookup(TOTAL)?;
    let named_idx = categories
        .iter()
        .map(|label| lookup(label))
        .collect::<Result<Vec<_>, _>>()?;

    let stats_at = |row: &[f64], (energy, counts): (usize, usize)| CategoryStats {
        counts: row[counts],
        mean_energy: row[energy],
    };
    let mut table = TimeSeriesTable::new(key, categories.clone())?;
    for row in &rows {
        let row = row.as_slice();
        let named: IndexMap<String, CategoryStats> = categories
            .iter()
            .zip(&named_idx)
            .map(|(label, idx)| (label.clone(), stats_at(row, *idx)))
            .collect();
        table.push(TimeStepRecord {
            time: row[time_idx],
            stats: PerCategory {
                total: stats_at(row, total_idx),
                named,
            },
        })?;
    }
    Ok(table)
}

fn write_text(path: &Path, text: &str) -> Result<(), SnowError> {
    let io_error = |code: &str, err: std::io::Error| {
        SnowError::Io(
            ErrorInfo::new(code, "failed to write table")
                .with_context("path", path.display())
                .with_hint(err.to_string()),
        )
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| io_error("table-create-dir", err))?;
    }
    fs::write(path, text).map_err(|err| io_error("table-write", err))?;
    debug!(path = %path.display(), bytes = text.len(), "wrote table");
    Ok(())
}

/// Writes a time-series table, creating parent directories, and returns its text.
pub fn write_timebin_table(path: &Path, table: &TimeSeriesTable) -> Result<String, SnowError> {
    let text = render_timebin_table(table);
    write_text(path, &text)?;
    Ok(text)
}

/// Reads a time-series table for `key` from disk.
pub fn read_timebin_table(path: &Path, key: ModelKey) -> Result<TimeSeriesTable, SnowError> {
    if !path.exists() {
        return Err(SnowError::MissingData(
            ErrorInfo::new("table-missing-file", "time-series table does not exist")
                .with_context("model", &key)
                .with_context("path", path.display()),
        ));
    }
    let text = fs::read_to_string(path).map_err(|err| {
        SnowError::Io(
            ErrorInfo::new("table-read", "failed to read time-series table")
                .with_context("path", path.display())
                .with_hint(err.to_string()),
        )
    })?;
    parse_timebin_table(key, &text).map_err(|err| err.with_context("path", path.display()))
}

/// Renders window-integrated stats with a leading `mass` column, one row per model.
pub fn render_window_table(window: &WindowTable) -> String {
    let header: Vec<String> = std::iter::once(MASS_COLUMN.to_string())
        .chain(column_names(window.categories()).into_iter().skip(1))
        .collect();
    let rows: Vec<Vec<String>> = window
        .iter()
        .map(|(key, stats)| {
            std::iter::once(key.mass.clone())
                .chain(stats_cells(stats))
                .collect()
        })
        .collect();
    render(&header, &rows)
}

/// Writes a window table and returns its text.
pub fn write_window_table(path: &Path, window: &WindowTable) -> Result<String, SnowError> {
    let text = render_window_table(window);
    write_text(path, &text)?;
    Ok(text)
}
