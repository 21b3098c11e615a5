use snow_core::errors::{ErrorInfo, SnowError};
use snow_core::{CategoryStats, EnergyBins, PerCategory};

/// Count-weighted mean, defined as exactly zero when no counts were recorded.
pub(crate) fn mean_or_zero(weighted_energy: f64, counts: f64) -> f64 {
    if counts == 0.0 {
        0.0
    } else {
        weighted_energy / counts
    }
}

/// Total counts and count-weighted mean energy of one binned count vector.
pub fn summarize(counts: &[f64], energy_bins: &EnergyBins) -> Result<CategoryStats, SnowError> {
    if counts.len() != energy_bins.len() {
        return Err(SnowError::DataShape(
            ErrorInfo::new(
                "average-length",
                "counts and energy bins differ in length",
            )
            .with_context("counts", counts.len())
            .with_context("energy_bins", energy_bins.len()),
        ));
    }
    let total: f64 = counts.iter().sum();
    let weighted: f64 = counts
        .iter()
        .zip(energy_bins.values())
        .map(|(count, energy)| count * energy)
        .sum();
    let mut mean_energy = mean_or_zero(weighted, total);
    if total != 0.0 {
        // roundoff can push a single-bin mean one ulp outside the axis
        mean_energy = mean_energy.clamp(energy_bins.min(), energy_bins.max());
    }
    Ok(CategoryStats {
        counts: total,
        mean_energy,
    })
}

/// Count-weighted mean energy; zero when the counts sum to zero.
pub fn average(counts: &[f64], energy_bins: &EnergyBins) -> Result<f64, SnowError> {
    summarize(counts, energy_bins).map(|stats| stats.mean_energy)
}

/// Applies [`summarize`] to every category of an aggregated time step.
pub fn summarize_groups(
    group_counts: &PerCategory<Vec<f64>>,
    energy_bins: &EnergyBins,
) -> Result<PerCategory<CategoryStats>, SnowError> {
    group_counts.try_map(|counts| summarize(counts, energy_bins))
}
