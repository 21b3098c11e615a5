use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use snow_core::errors::{ErrorInfo, SnowError};
use snow_core::{ChannelRegistry, EnergyBins, ModelKey, TimeSeriesTable};
use tracing::{info, warn};

use crate::cancel::CancelToken;
use crate::timeseries::{ChannelCountSource, TimeSeriesBuilder};

/// Loader for every model of a batch.
pub trait ModelSource: Sync {
    /// Ordered time values of the model's steps.
    fn time_grid(&self, key: &ModelKey) -> Result<Vec<f64>, SnowError>;

    /// Energy bins shared by the model's channels.
    fn energy_bins(&self, key: &ModelKey, registry: &ChannelRegistry)
        -> Result<EnergyBins, SnowError>;

    /// Counts per energy bin for one channel at a 0-based time index.
    fn channel_counts(
        &self,
        key: &ModelKey,
        channel: &str,
        time_index: usize,
    ) -> Result<Vec<f64>, SnowError>;
}

struct ModelView<'a, S: ?Sized> {
    source: &'a S,
    key: &'a ModelKey,
}

impl<S: ModelSource + ?Sized> ChannelCountSource for ModelView<'_, S> {
    fn load_channel_counts(
        &self,
        channel: &str,
        time_index: usize,
    ) -> Result<Vec<f64>, SnowError> {
        self.source.channel_counts(self.key, channel, time_index)
    }
}

/// One model to build together with its detector's registry.
#[derive(Debug, Clone)]
pub struct BatchJob<'a> {
    /// Model identifier.
    pub key: ModelKey,
    /// Registry for the model's detector material.
    pub registry: &'a ChannelRegistry,
}

/// Options governing batch execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchOpts {
    /// Number of models built concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Load the time steps of each model concurrently as well.
    #[serde(default)]
    pub parallel_steps: bool,
}

fn default_concurrency() -> usize {
    1
}

impl Default for BatchOpts {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            parallel_steps: false,
        }
    }
}

/// A model whose build failed, with the error that aborted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFailure {
    /// Model identifier.
    pub key: ModelKey,
    /// Error raised while building the model.
    pub error: SnowError,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Successfully built tables keyed by model.
    pub tables: BTreeMap<ModelKey, TimeSeriesTable>,
    /// Models whose build failed, in job order.
    pub failures: Vec<ModelFailure>,
    /// Models never started because cancellation was requested.
    pub skipped: Vec<ModelKey>,
}

impl BatchReport {
    /// Whether every job produced a table.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }
}

enum Outcome {
    Built(TimeSeriesTable),
    Failed(SnowError),
    Skipped,
}

/// Loads grid and bins for one model and builds its time series.
pub fn build_model<S>(
    source: &S,
    key: &ModelKey,
    registry: &ChannelRegistry,
    parallel_steps: bool,
) -> Result<TimeSeriesTable, SnowError>
where
    S: ModelSource + ?Sized,
{
    let time_grid = source
        .time_grid(key)
        .map_err(|err| err.with_context("model", key))?;
    let energy_bins = source
        .energy_bins(key, registry)
        .map_err(|err| err.with_context("model", key))?;
    let builder = TimeSeriesBuilder::new(registry, &energy_bins);
    let view = ModelView { source, key };
    if parallel_steps {
        builder.build_par(key.clone(), &time_grid, &view)
    } else {
        builder.build(key.clone(), &time_grid, &view)
    }
}

/// Builds every job's time series on a dedicated thread pool.
///
/// A failing model is logged and recorded without affecting its siblings.
/// Cancellation is checked before each model starts.
pub fn run_batch<S>(
    source: &S,
    jobs: &[BatchJob<'_>],
    opts: &BatchOpts,
    cancel: &CancelToken,
) -> Result<BatchReport, SnowError>
where
    S: ModelSource + ?Sized,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.concurrency.max(1))
        .build()
        .map_err(|err| {
            SnowError::Config(
                ErrorInfo::new("thread-pool", "failed to build batch thread pool")
                    .with_context("concurrency", opts.concurrency)
                    .with_hint(err.to_string()),
            )
        })?;
    info!(
        models = jobs.len(),
        concurrency = opts.concurrency.max(1),
        parallel_steps = opts.parallel_steps,
        "starting batch"
    );

    let mut outcomes: Vec<(usize, Outcome)> = pool.install(|| {
        jobs.par_iter()
            .enumerate()
            .map(|(index, job)| {
                if cancel.is_cancelled() {
                    return (index, Outcome::Skipped);
                }
                match build_model(source, &job.key, job.registry, opts.parallel_steps) {
                    Ok(table) => (index, Outcome::Built(table)),
                    Err(err) => {
                        warn!(
                            model = %job.key,
                            family = err.family(),
                            error = %err,
                            "model build failed"
                        );
                        (index, Outcome::Failed(err))
                    }
                }
            })
            .collect()
    });
    outcomes.sort_by_key(|(index, _)| *index);

    let mut report = BatchReport::default();
    for (index, outcome) in outcomes {
        let key = jobs[index].key.clone();
        match outcome {
            Outcome::Built(table) => {
                report.tables.insert(key, table);
            }
            Outcome::Failed(error) => report.failures.push(ModelFailure { key, error }),
            Outcome::Skipped => report.skipped.push(key),
        }
    }
    info!(
        built = report.tables.len(),
        failed = report.failures.len(),
        skipped = report.skipped.len(),
        "batch finished"
    );
    Ok(report)
}
