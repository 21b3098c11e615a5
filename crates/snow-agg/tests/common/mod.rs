#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;
use snow_agg::{ChannelCountSource, ModelSource};
use snow_core::errors::{ErrorInfo, SnowError};
use snow_core::{
    CategoryStats, ChannelRegistry, EnergyBins, ModelKey, PerCategory, TimeSeriesTable,
    TimeStepRecord,
};

pub const EPS: f64 = 1e-9;

pub fn key(mass: &str) -> ModelKey {
    ModelKey::new("Nakazato_2013", mass, "wc100kt30prct", "nomix")
}

pub fn approx(left: f64, right: f64) -> bool {
    (left - right).abs() <= EPS * left.abs().max(right.abs()).max(1.0)
}

pub fn ibd_registry() -> ChannelRegistry {
    ChannelRegistry::from_static(&[("IBD", &["ibd"])]).expect("registry")
}

pub fn two_group_registry() -> ChannelRegistry {
    ChannelRegistry::from_static(&[("IBD", &["ibd"]), ("ES", &["nue_e", "nuebar_e"])])
        .expect("registry")
}

/// Channel counts for a single model, keyed by (channel, time index).
#[derive(Default)]
pub struct StepSource {
    pub counts: BTreeMap<(String, usize), Vec<f64>>,
    pub loads: AtomicUsize,
}

impl StepSource {
    pub fn with(mut self, channel: &str, time_index: usize, counts: &[f64]) -> Self {
        self.counts
            .insert((channel.to_string(), time_index), counts.to_vec());
        self
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ChannelCountSource for StepSource {
    fn load_channel_counts(&self, channel: &str, time_index: usize) -> Result<Vec<f64>, SnowError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.counts
            .get(&(channel.to_string(), time_index))
            .cloned()
            .ok_or_else(|| {
                SnowError::MissingData(
                    ErrorInfo::new("test-missing", "no counts recorded")
                        .with_context("channel", channel)
                        .with_context("time_index", time_index),
                )
            })
    }
}

/// IBD counts [2, 1] then [0, 0], meant for bins [10, 20].
pub fn ibd_two_step_source() -> StepSource {
    StepSource::default()
        .with("ibd", 0, &[2.0, 1.0])
        .with("ibd", 1, &[0.0, 0.0])
}

pub fn bins(values: &[f64]) -> EnergyBins {
    EnergyBins::new(values.to_vec()).expect("energy bins")
}

/// Several models sharing one energy grid and one time grid.
pub struct MemoryModels {
    pub time_grid: Vec<f64>,
    pub energy_bins: Vec<f64>,
    pub models: BTreeMap<ModelKey, StepSource>,
}

impl ModelSource for MemoryModels {
    fn time_grid(&self, key: &ModelKey) -> Result<Vec<f64>, SnowError> {
        if self.models.contains_key(key) {
            Ok(self.time_grid.clone())
        } else {
            Err(SnowError::MissingData(
                ErrorInfo::new("test-model", "unknown model").with_context("model", key),
            ))
        }
    }

    fn energy_bins(
        &self,
        _key: &ModelKey,
        _registry: &ChannelRegistry,
    ) -> Result<EnergyBins, SnowError> {
        EnergyBins::new(self.energy_bins.clone())
    }

    fn channel_counts(
        &self,
        key: &ModelKey,
        channel: &str,
        time_index: usize,
    ) -> Result<Vec<f64>, SnowError> {
        match self.models.get(key) {
            Some(source) => source.load_channel_counts(channel, time_index),
            None => Err(SnowError::MissingData(ErrorInfo::new(
                "test-model",
                "unknown model",
            ))),
        }
    }
}

/// Builds a table directly from named (counts, mean energy) pairs per step.
///
/// The total of each step is derived from the named categories.
pub fn make_table(
    key: ModelKey,
    categories: &[&str],
    steps: &[(f64, &[(f64, f64)])],
) -> TimeSeriesTable {
    let names: Vec<String> = categories.iter().map(|name| name.to_string()).collect();
    let mut table = TimeSeriesTable::new(key, names.clone()).expect("table");
    for (time, values) in steps {
        assert_eq!(values.len(), names.len(), "one value pair per category");
        let mut named = IndexMap::new();
        let mut counts = 0.0;
        let mut weighted = 0.0;
        for (name, &(c, e)) in names.iter().zip(values.iter()) {
            counts += c;
            weighted += c * e;
            named.insert(
                name.clone(),
                CategoryStats {
                    counts: c,
                    mean_energy: e,
                },
            );
        }
        let total = CategoryStats {
            counts,
            mean_energy: if counts > 0.0 { weighted / counts } else { 0.0 },
        };
        table
            .push(TimeStepRecord {
                time: *time,
                stats: PerCategory { total, named },
            })
            .expect("push row");
    }
    table
}
