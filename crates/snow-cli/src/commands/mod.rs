use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use snow_core::errors::SnowError;
use snow_core::{ModelKey, TimeSeriesTable};
use snow_io::paths::timebin_path;
use snow_io::{load_config, read_timebin_table, AnalysisConfig};
use tracing::{debug, warn};

pub mod analyze;
pub mod cumulative;
pub mod fractions;
pub mod integrate;

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct DataArgs {
    /// Directory holding time-series tables and derived outputs.
    #[arg(long, env = "SNOWGLOBES_DATA")]
    pub data: PathBuf,
    /// YAML configuration; built-in presets apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Families to process, overriding the configuration.
    #[arg(long = "family", value_name = "NAME")]
    pub families: Vec<String>,
    /// Progenitor masses to process, overriding the configuration.
    #[arg(long = "mass", value_name = "MASS")]
    pub masses: Vec<String>,
    /// Detectors to process, overriding the configuration.
    #[arg(long = "detector", value_name = "NAME")]
    pub detectors: Vec<String>,
    /// Mixing schemes to process, overriding the configuration.
    #[arg(long = "mixing", value_name = "NAME")]
    pub mixing: Vec<String>,
}

impl DataArgs {
    /// Loads the configuration and applies command-line overrides.
    pub fn resolve_config(&self) -> Result<AnalysisConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AnalysisConfig::default(),
        };
        let overrides = [
            (&self.families, &mut config.models.families),
            (&self.masses, &mut config.models.masses),
            (&self.detectors, &mut config.models.detectors),
            (&self.mixing, &mut config.models.mixing),
        ];
        for (given, slot) in overrides {
            if !given.is_empty() {
                *slot = given.clone();
            }
        }
        config.validate()?;
        if config.models.masses.is_empty() {
            return Err("no masses configured; pass --mass or list models.masses".into());
        }
        Ok(config)
    }
}

/// Family, detector and mixing shared by the models of one output table.
pub type GroupKey = (String, String, String);

/// Groups model keys by family, detector and mixing.
pub fn group_models(keys: &[ModelKey]) -> BTreeMap<GroupKey, Vec<ModelKey>> {
    let mut groups: BTreeMap<GroupKey, Vec<ModelKey>> = BTreeMap::new();
    for key in keys {
        groups
            .entry((key.family.clone(), key.detector.clone(), key.mixing.clone()))
            .or_default()
            .push(key.clone());
    }
    groups
}

/// Reads the time-series tables of `keys` from the data directory.
///
/// Models without a table, typically ones whose analyze step failed, are
/// logged and skipped; any other error aborts.
pub fn load_tables(
    data: &Path,
    keys: &[ModelKey],
) -> Result<BTreeMap<ModelKey, TimeSeriesTable>, SnowError> {
    let mut tables = BTreeMap::new();
    for key in keys {
        match read_timebin_table(&timebin_path(data, key), key.clone()) {
            Ok(table) => {
                debug!(model = %key, rows = table.len(), "loaded time series");
                tables.insert(key.clone(), table);
            }
            Err(err) if is_missing_file(&err) => {
                warn!(model = %key, error = %err, "skipping model without a time series");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(tables)
}

fn is_missing_file(err: &SnowError) -> bool {
    matches!(err, SnowError::MissingData(info) if info.code == "table-missing-file")
}
