use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use snow_agg::{BatchReport, ModelFailure};
use snow_core::errors::{ErrorInfo, SnowError};
use snow_core::ModelKey;

use crate::hash::stable_hash_string;
use crate::serde::{from_json_slice, to_canonical_json_bytes};

/// A table written by an analyze run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenTable {
    /// Model the table belongs to.
    pub model: ModelKey,
    /// Path of the written file.
    pub path: String,
    /// Number of time steps.
    pub rows: usize,
    /// SHA-256 of the file contents.
    pub sha256: String,
}

/// Provenance record of an analyze run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeReport {
    /// Stable hash of the effective configuration.
    pub config_hash: String,
    /// Tables written, in model order.
    pub tables: Vec<WrittenTable>,
    /// Models whose build failed.
    pub failures: Vec<ModelFailure>,
    /// Models skipped after cancellation.
    pub skipped: Vec<ModelKey>,
}

impl AnalyzeReport {
    /// Assembles the report from written tables and the batch outcome.
    pub fn new<C: Serialize>(
        config: &C,
        tables: Vec<WrittenTable>,
        batch: &BatchReport,
    ) -> Result<Self, SnowError> {
        Ok(Self {
            config_hash: stable_hash_string(config)?,
            tables,
            failures: batch.failures.clone(),
            skipped: batch.skipped.clone(),
        })
    }
}

/// Writes the report as canonical JSON.
pub fn write_report(path: &Path, report: &AnalyzeReport) -> Result<(), SnowError> {
    let bytes = to_canonical_json_bytes(report)?;
    fs::write(path, bytes).map_err(|err| {
        SnowError::Io(
            ErrorInfo::new("report-write", "failed to write analyze report")
                .with_context("path", path.display())
                .with_hint(err.to_string()),
        )
    })
}

/// Reads a report written by [`write_report`].
pub fn read_report(path: &Path) -> Result<AnalyzeReport, SnowError> {
    let bytes = fs::read(path).map_err(|err| {
        SnowError::Io(
            ErrorInfo::new("report-read", "failed to read analyze report")
                .with_context("path", path.display())
                .with_hint(err.to_string()),
        )
    })?;
    from_json_slice(&bytes)
}
