use rayon::prelude::*;
use snow_core::errors::{ErrorInfo, SnowError};
use snow_core::{
    CategoryStats, ChannelCounts, ChannelRegistry, EnergyBins, ModelKey, PerCategory,
    TimeSeriesTable, TimeStepRecord,
};
use tracing::debug;

use crate::aggregate::aggregate;
use crate::average::summarize_groups;

/// Supplies raw per-channel count vectors for one model.
pub trait ChannelCountSource {
    /// Counts per energy bin for `channel` at the 0-based `time_index`.
    fn load_channel_counts(&self, channel: &str, time_index: usize)
        -> Result<Vec<f64>, SnowError>;
}

impl<T: ChannelCountSource + ?Sized> ChannelCountSource for &T {
    fn load_channel_counts(
        &self,
        channel: &str,
        time_index: usize,
    ) -> Result<Vec<f64>, SnowError> {
        (**self).load_channel_counts(channel, time_index)
    }
}

/// Checks that a time grid is finite and strictly increasing.
pub fn validate_time_grid(time_grid: &[f64]) -> Result<(), SnowError> {
    if let Some(idx) = time_grid.iter().position(|time| !time.is_finite()) {
        return Err(SnowError::DataShape(
            ErrorInfo::new("time-grid-non-finite", "time grid contains a non-finite value")
                .with_context("index", idx),
        ));
    }
    if let Some(idx) = time_grid.windows(2).position(|pair| pair[1] <= pair[0]) {
        return Err(SnowError::DataShape(
            ErrorInfo::new("time-grid-order", "time grid must be strictly increasing")
                .with_context("index", idx + 1)
                .with_context("previous", time_grid[idx])
                .with_context("time", time_grid[idx + 1]),
        ));
    }
    Ok(())
}

/// Assembles per-step aggregates into a [`TimeSeriesTable`] for one model.
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesBuilder<'a> {
    registry: &'a ChannelRegistry,
    energy_bins: &'a EnergyBins,
}

impl<'a> TimeSeriesBuilder<'a> {
    /// Creates a builder sharing a registry and the detector's energy bins.
    pub fn new(registry: &'a ChannelRegistry, energy_bins: &'a EnergyBins) -> Self {
        Self {
            registry,
            energy_bins,
        }
    }

    /// Loads every registered channel for one time step.
    pub fn load_step<L>(&self, loader: &L, time_index: usize) -> Result<ChannelCounts, SnowError>
    where
        L: ChannelCountSource + ?Sized,
    {
        let mut counts = ChannelCounts::new();
        for channel in self.registry.flatten() {
            let vector = loader
                .load_channel_counts(channel, time_index)
                .map_err(|err| {
                    err.with_context("time_index", time_index)
                        .with_context("channel", channel)
                })?;
            counts.insert(channel.clone(), vector);
        }
        Ok(counts)
    }

    /// Load, aggregate and average a single time step.
    pub fn step<L>(
        &self,
        loader: &L,
        time_index: usize,
    ) -> Result<PerCategory<CategoryStats>, SnowError>
    where
        L: ChannelCountSource + ?Sized,
    {
        let channel_counts = self.load_step(loader, time_index)?;
        let groups = aggregate(&channel_counts, self.registry)
            .map_err(|err| err.with_context("time_index", time_index))?;
        if groups.total.len() != self.energy_bins.len() {
            return Err(SnowError::DataShape(
                ErrorInfo::new(
                    "energy-bins-length",
                    "channel counts and energy bins differ in length",
                )
                .with_context("time_index", time_index)
                .with_context("counts", groups.total.len())
                .with_context("energy_bins", self.energy_bins.len()),
            ));
        }
        summarize_groups(&groups, self.energy_bins)
    }

    /// Builds the table sequentially; any failure aborts the whole model.
    pub fn build<L>(
        &self,
        key: ModelKey,
        time_grid: &[f64],
        loader: &L,
    ) -> Result<TimeSeriesTable, SnowError>
    where
        L: ChannelCountSource + ?Sized,
    {
        validate_time_grid(time_grid).map_err(|err| err.with_context("model", &key))?;
        let mut table = TimeSeriesTable::new(key, self.registry.category_names())?;
        for (time_index, &time) in time_grid.iter().enumerate() {
            let stats = self
                .step(loader, time_index)
                .map_err(|err| err.with_context("model", table.key()))?;
            table.push(TimeStepRecord { time, stats })?;
        }
        debug!(model = %table.key(), steps = table.len(), "assembled time series");
        Ok(table)
    }

    /// Builds the table with per-step loads issued on the rayon pool.
    ///
    /// Rows are assembled in grid order once every step has completed.
    pub fn build_par<L>(
        &self,
        key: ModelKey,
        time_grid: &[f64],
        loader: &L,
    ) -> Result<TimeSeriesTable, SnowError>
    where
        L: ChannelCountSource + Sync + ?Sized,
    {
        validate_time_grid(time_grid).map_err(|err| err.with_context("model", &key))?;
        let steps: Vec<PerCategory<CategoryStats>> = (0..time_grid.len())
            .into_par_iter()
            .map(|time_index| self.step(loader, time_index))
            .collect::<Result<_, _>>()
            .map_err(|err| err.with_context("model", &key))?;
        let mut table = TimeSeriesTable::new(key, self.registry.category_names())?;
        for (&time, stats) in time_grid.iter().zip(steps) {
            table.push(TimeStepRecord { time, stats })?;
        }
        debug!(model = %table.key(), steps = table.len(), "assembled time series in parallel");
        Ok(table)
    }
}
