//! CSV exports of cumulative and fraction tables.

use std::fmt::Display;
use std::fs;
use std::path::Path;

use csv::WriterBuilder;
use snow_agg::{CumulativeTable, FractionTable};
use snow_core::column_names;
use snow_core::errors::{ErrorInfo, SnowError};
use tracing::debug;

fn wrap_csv(code: &str, err: csv::Error) -> SnowError {
    SnowError::Io(ErrorInfo::new(code, "failed to write CSV table").with_hint(err.to_string()))
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, SnowError> {
    let bytes = writer
        .into_inner()
        .map_err(|err| SnowError::Io(ErrorInfo::new("csv-flush", err.to_string())))?;
    String::from_utf8(bytes)
        .map_err(|err| SnowError::Io(ErrorInfo::new("csv-utf8", err.to_string())))
}

/// Renders every model's cumulative rows as `model,n_bins,time,energy_*,counts_*`.
///
/// Models must share categories; the header follows the first model.
pub fn render_cumulative_csv(table: &CumulativeTable) -> Result<String, SnowError> {
    let categories = table
        .iter()
        .next()
        .map(|(_, series)| series.categories.clone())
        .unwrap_or_default();
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    let header: Vec<String> = ["model", "n_bins"]
        .iter()
        .map(|name| name.to_string())
        .chain(column_names(&categories))
        .collect();
    writer
        .write_record(&header)
        .map_err(|err| wrap_csv("cumulative-header", err))?;
    for (key, series) in table.iter() {
        if series.categories != categories {
            return Err(SnowError::DataShape(
                ErrorInfo::new(
                    "cumulative-category-set",
                    "models in one cumulative table must share categories",
                )
                .with_context("model", key),
            ));
        }
        for row in &series.rows {
            let mut record = vec![key.to_string(), row.n_bins.to_string(), row.time.to_string()];
            record.extend(row.stats.labelled().map(|(_, s)| s.mean_energy.to_string()));
            record.extend(row.stats.labelled().map(|(_, s)| s.counts.to_string()));
            writer
                .write_record(&record)
                .map_err(|err| wrap_csv("cumulative-row", err))?;
        }
    }
    finish(writer)
}

/// Renders fractions with one row per category and one column per batch.
pub fn render_fractions_csv<K>(table: &FractionTable<K>) -> Result<String, SnowError>
where
    K: Ord + Display,
{
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    let batches: Vec<&K> = table.batches().collect();
    let header: Vec<String> = std::iter::once("category".to_string())
        .chain(batches.iter().map(|batch| batch.to_string()))
        .collect();
    writer
        .write_record(&header)
        .map_err(|err| wrap_csv("fractions-header", err))?;
    for category in table.categories() {
        let mut record = vec![category.clone()];
        for batch in &batches {
            let value = table.get(*batch, category).unwrap_or(0.0);
            record.push(value.to_string());
        }
        writer
            .write_record(&record)
            .map_err(|err| wrap_csv("fractions-row", err))?;
    }
    finish(writer)
}

/// Writes rendered CSV text, creating parent directories.
pub fn write_csv(path: &Path, text: &str) -> Result<(), SnowError> {
    let io_error = |code: &str, err: std::io::Error| {
        SnowError::Io(
            ErrorInfo::new(code, "failed to write CSV file")
                .with_context("path", path.display())
                .with_hint(err.to_string()),
        )
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| io_error("csv-create-dir", err))?;
    }
    fs::write(path, text).map_err(|err| io_error("csv-write", err))?;
    debug!(path = %path.display(), bytes = text.len(), "wrote csv");
    Ok(())
}
