use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use snow_core::errors::{ErrorInfo, SnowError};
use snow_core::{Category, CategoryStats, ModelKey, PerCategory, TimeSeriesTable, TimeStepRecord};
use tracing::{debug, info};

use crate::average::mean_or_zero;
use crate::cancel::CancelToken;

#[derive(Debug, Clone, Copy, Default)]
struct RunningTotal {
    counts: f64,
    weighted_energy: f64,
}

impl RunningTotal {
    fn add(&mut self, stats: &CategoryStats) {
        self.counts += stats.counts;
        self.weighted_energy += stats.counts * stats.mean_energy;
    }

    fn stats(&self) -> CategoryStats {
        CategoryStats {
            counts: self.counts,
            mean_energy: mean_or_zero(self.weighted_energy, self.counts),
        }
    }
}

/// Running per-category sums of counts and counts × mean energy.
#[derive(Debug, Clone)]
pub(crate) struct Accumulator {
    totals: PerCategory<RunningTotal>,
}

impl Accumulator {
    pub(crate) fn new(categories: &[String]) -> Self {
        Self {
            totals: PerCategory {
                total: RunningTotal::default(),
                named: categories
                    .iter()
                    .map(|name| (name.clone(), RunningTotal::default()))
                    .collect::<IndexMap<_, _>>(),
            },
        }
    }

    /// Folds one row; rows of a table share its category order.
    pub(crate) fn fold(&mut self, record: &TimeStepRecord) {
        self.totals.total.add(&record.stats.total);
        for (running, stats) in self
            .totals
            .named
            .values_mut()
            .zip(record.stats.named.values())
        {
            running.add(stats);
        }
    }

    pub(crate) fn snapshot(&self) -> PerCategory<CategoryStats> {
        self.totals.map(RunningTotal::stats)
    }
}

/// Running integral over the first `n_bins` rows of a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeRow {
    /// Number of leading rows included.
    pub n_bins: usize,
    /// Time of the last included row.
    pub time: f64,
    /// Summed counts and recombined mean energy per category.
    pub stats: PerCategory<CategoryStats>,
}

/// Cumulative rows for one model, indexed by `n_bins` starting at one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeSeries {
    /// Named categories carried by every row.
    pub categories: Vec<String>,
    /// Rows for `n_bins = 1..=len`.
    pub rows: Vec<CumulativeRow>,
}

impl CumulativeSeries {
    /// Row integrating the first `n_bins` steps.
    pub fn get(&self, n_bins: usize) -> Option<&CumulativeRow> {
        n_bins.checked_sub(1).and_then(|idx| self.rows.get(idx))
    }

    /// Number of cumulative rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows were integrated.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cumulative counts of one category for increasing `n_bins`.
    pub fn counts(&self, category: &Category) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.stats.get(category).map(|stats| stats.counts))
            .collect()
    }
}

/// Cumulative series for every integrated model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CumulativeTable {
    series: BTreeMap<ModelKey, CumulativeSeries>,
}

impl CumulativeTable {
    /// Stats for `(model, n_bins, category)`.
    pub fn get(
        &self,
        key: &ModelKey,
        n_bins: usize,
        category: &Category,
    ) -> Option<&CategoryStats> {
        self.series
            .get(key)
            .and_then(|series| series.get(n_bins))
            .and_then(|row| row.stats.get(category))
    }

    /// Series of a single model.
    pub fn series(&self, key: &ModelKey) -> Option<&CumulativeSeries> {
        self.series.get(key)
    }

    /// Models and their series in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ModelKey, &CumulativeSeries)> + '_ {
        self.series.iter()
    }

    /// Number of integrated models.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether no model was integrated.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    fn insert(&mut self, key: ModelKey, series: CumulativeSeries) {
        self.series.insert(key, series);
    }
}

fn check_range(key: &ModelKey, table: &TimeSeriesTable, max_bins: usize) -> Result<(), SnowError> {
    if max_bins > table.len() {
        return Err(SnowError::Range(
            ErrorInfo::new(
                "cumulative-range",
                "requested more bins than the model has time steps",
            )
            .with_context("model", key)
            .with_context("max_bins", max_bins)
            .with_context("rows", table.len()),
        ));
    }
    Ok(())
}

/// Integrates one model over `n_bins = 1..=max_bins` with a single pass.
pub fn integrate_series(
    table: &TimeSeriesTable,
    max_bins: usize,
    cancel: Option<&CancelToken>,
) -> Result<CumulativeSeries, SnowError> {
    check_range(table.key(), table, max_bins)?;
    let mut accumulator = Accumulator::new(table.categories());
    let mut rows = Vec::with_capacity(max_bins);
    for (idx, record) in table.rows()[..max_bins].iter().enumerate() {
        if let Some(token) = cancel {
            token
                .check("cumulative")
                .map_err(|err| err.with_context("model", table.key()))?;
        }
        accumulator.fold(record);
        rows.push(CumulativeRow {
            n_bins: idx + 1,
            time: record.time,
            stats: accumulator.snapshot(),
        });
    }
    Ok(CumulativeSeries {
        categories: table.categories().to_vec(),
        rows,
    })
}

/// Integrates every model over `1..=max_bins` leading time bins.
///
/// Fails with `Range` before any work if a model has fewer than `max_bins` rows.
pub fn integrate(
    tables: &BTreeMap<ModelKey, TimeSeriesTable>,
    max_bins: usize,
) -> Result<CumulativeTable, SnowError> {
    for (key, table) in tables {
        check_range(key, table, max_bins)?;
    }
    let mut cumulative = CumulativeTable::default();
    for (key, table) in tables {
        let series = integrate_series(table, max_bins, None)?;
        cumulative.insert(key.clone(), series);
    }
    info!(models = cumulative.len(), max_bins, "cumulative integration complete");
    Ok(cumulative)
}

/// Integrates every model over all of its own rows; lengths may differ.
pub fn integrate_full(tables: &BTreeMap<ModelKey, TimeSeriesTable>) -> CumulativeTable {
    let mut cumulative = CumulativeTable::default();
    for (key, table) in tables {
        let mut accumulator = Accumulator::new(table.categories());
        let rows = table
            .rows()
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                accumulator.fold(record);
                CumulativeRow {
                    n_bins: idx + 1,
                    time: record.time,
                    stats: accumulator.snapshot(),
                }
            })
            .collect();
        cumulative.insert(
            key.clone(),
            CumulativeSeries {
                categories: table.categories().to_vec(),
                rows,
            },
        );
    }
    cumulative
}

/// Like [`integrate`], checking `cancel` between models and between steps.
///
/// Only fully integrated models are published; the returned table omits the
/// model in flight and every model after it once cancellation is observed.
pub fn integrate_cancellable(
    tables: &BTreeMap<ModelKey, TimeSeriesTable>,
    max_bins: usize,
    cancel: &CancelToken,
) -> Result<CumulativeTable, SnowError> {
    for (key, table) in tables {
        check_range(key, table, max_bins)?;
    }
    let mut cumulative = CumulativeTable::default();
    for (key, table) in tables {
        let integrated = cancel
            .check("cumulative")
            .and_then(|()| integrate_series(table, max_bins, Some(cancel)));
        match integrated {
            Ok(series) => cumulative.insert(key.clone(), series),
            Err(SnowError::Cancelled(_)) => {
                debug!(model = %key, "cumulative integration cancelled; model not published");
                break;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(cumulative)
}
