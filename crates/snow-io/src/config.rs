use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use snow_agg::BatchOpts;
use snow_core::errors::{ErrorInfo, SnowError};
use snow_core::materials::{default_detector_materials, default_material_groups};
use snow_core::{ChannelRegistry, ModelKey};

use crate::serde::from_yaml_slice;

fn config_error(code: &str, message: &str) -> SnowError {
    SnowError::Config(ErrorInfo::new(code, message))
}

/// Models to analyze, expanded as a cross product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMatrix {
    /// Simulation families (model sets).
    #[serde(default = "default_families")]
    pub families: Vec<String>,
    /// Progenitor mass labels, kept verbatim for file names.
    #[serde(default)]
    pub masses: Vec<String>,
    /// Detector configurations.
    #[serde(default = "default_detectors")]
    pub detectors: Vec<String>,
    /// Flavor mixing schemes.
    #[serde(default = "default_mixing")]
    pub mixing: Vec<String>,
}

fn default_families() -> Vec<String> {
    ["LMP", "LMP+N50", "SNA"].iter().map(|s| s.to_string()).collect()
}

fn default_detectors() -> Vec<String> {
    vec!["ar40kt".to_string()]
}

fn default_mixing() -> Vec<String> {
    vec!["nomix".to_string()]
}

impl Default for ModelMatrix {
    fn default() -> Self {
        Self {
            families: default_families(),
            masses: Vec::new(),
            detectors: default_detectors(),
            mixing: default_mixing(),
        }
    }
}

/// Time integration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationSpec {
    /// Largest cumulative window, in time bins.
    #[serde(default = "default_max_bins")]
    pub max_bins: usize,
    /// Fixed window used for the per-family analysis table.
    #[serde(default = "default_window_bins")]
    pub window_bins: usize,
    /// Width of one time bin in milliseconds.
    #[serde(default = "default_bin_width_ms")]
    pub bin_width_ms: u64,
}

fn default_max_bins() -> usize {
    200
}

fn default_window_bins() -> usize {
    6
}

fn default_bin_width_ms() -> u64 {
    5
}

impl Default for IntegrationSpec {
    fn default() -> Self {
        Self {
            max_bins: default_max_bins(),
            window_bins: default_window_bins(),
            bin_width_ms: default_bin_width_ms(),
        }
    }
}

impl IntegrationSpec {
    /// Window length in milliseconds, used in window table names.
    pub fn window_ms(&self) -> u64 {
        self.window_bins as u64 * self.bin_width_ms
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Model matrix.
    #[serde(default)]
    pub models: ModelMatrix,
    /// Detector name to material.
    #[serde(default = "default_detector_materials")]
    pub materials: IndexMap<String, String>,
    /// Material to ordered category → channels grouping.
    #[serde(default = "default_material_groups")]
    pub channel_groups: IndexMap<String, IndexMap<String, Vec<String>>>,
    /// Integration settings.
    #[serde(default)]
    pub integration: IntegrationSpec,
    /// Batch execution settings.
    #[serde(default)]
    pub batch: BatchOpts,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            models: ModelMatrix::default(),
            materials: default_detector_materials(),
            channel_groups: default_material_groups(),
            integration: IntegrationSpec::default(),
            batch: BatchOpts::default(),
        }
    }
}

impl AnalysisConfig {
    /// Resolves a detector to its material's validated registry.
    pub fn registry_for(&self, detector: &str) -> Result<ChannelRegistry, SnowError> {
        let material = self.materials.get(detector).ok_or_else(|| {
            SnowError::Config(
                ErrorInfo::new("config-unknown-detector", "detector has no material assigned")
                    .with_context("detector", detector)
                    .with_hint("add the detector under `materials`"),
            )
        })?;
        let groups = self.channel_groups.get(material).ok_or_else(|| {
            SnowError::Config(
                ErrorInfo::new("config-unknown-material", "material has no channel groups")
                    .with_context("detector", detector)
                    .with_context("material", material),
            )
        })?;
        ChannelRegistry::build(groups.clone())
            .map_err(|err| err.with_context("material", material))
    }

    /// Every model of the matrix, ordered by family, detector, mixing then mass.
    pub fn model_keys(&self) -> Vec<ModelKey> {
        let models = &self.models;
        let mut keys = Vec::new();
        for family in &models.families {
            for detector in &models.detectors {
                for mixing in &models.mixing {
                    for mass in &models.masses {
                        keys.push(ModelKey::new(
                            family.as_str(),
                            mass.as_str(),
                            detector.as_str(),
                            mixing.as_str(),
                        ));
                    }
                }
            }
        }
        keys
    }

    /// Checks integration settings and that every configured detector resolves.
    pub fn validate(&self) -> Result<(), SnowError> {
        if self.integration.window_bins == 0 {
            return Err(config_error(
                "config-window-bins",
                "window_bins must be at least one",
            ));
        }
        if self.integration.bin_width_ms == 0 {
            return Err(config_error(
                "config-bin-width",
                "bin_width_ms must be positive",
            ));
        }
        if self.batch.concurrency == 0 {
            return Err(config_error(
                "config-concurrency",
                "batch concurrency must be at least one",
            ));
        }
        for detector in &self.models.detectors {
            self.registry_for(detector)?;
        }
        Ok(())
    }
}

/// Reads and validates a YAML configuration file.
pub fn load_config(path: &Path) -> Result<AnalysisConfig, SnowError> {
    let bytes = fs::read(path).map_err(|err| {
        SnowError::Io(
            ErrorInfo::new("config-read", "failed to read configuration file")
                .with_context("path", path.display())
                .with_hint(err.to_string()),
        )
    })?;
    let config: AnalysisConfig =
        from_yaml_slice(&bytes).map_err(|err| err.with_context("path", path.display()))?;
    config.validate()?;
    Ok(config)
}
