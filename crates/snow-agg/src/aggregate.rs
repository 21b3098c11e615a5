use indexmap::IndexMap;
use snow_core::errors::{ErrorInfo, SnowError};
use snow_core::{ChannelCounts, ChannelRegistry, PerCategory};

fn lookup<'a>(channel_counts: &'a ChannelCounts, channel: &str) -> Result<&'a [f64], SnowError> {
    channel_counts
        .get(channel)
        .map(Vec::as_slice)
        .ok_or_else(|| {
            SnowError::MissingData(
                ErrorInfo::new("aggregate-missing-channel", "no counts supplied for channel")
                    .with_context("channel", channel),
            )
        })
}

fn validate(channel: &str, counts: &[f64], n_bins: usize) -> Result<(), SnowError> {
    if counts.len() != n_bins {
        return Err(SnowError::DataShape(
            ErrorInfo::new(
                "aggregate-length",
                "channel counts do not share the same number of energy bins",
            )
            .with_context("channel", channel)
            .with_context("expected", n_bins)
            .with_context("found", counts.len()),
        ));
    }
    if let Some(idx) = counts
        .iter()
        .position(|value| !value.is_finite() || *value < 0.0)
    {
        return Err(SnowError::DataShape(
            ErrorInfo::new(
                "aggregate-invalid-count",
                "counts must be finite and non-negative",
            )
            .with_context("channel", channel)
            .with_context("bin", idx)
            .with_context("value", counts[idx]),
        ));
    }
    Ok(())
}

/// Sums per-channel count vectors into per-category and total vectors.
///
/// The bin count is taken from the first registered channel; every other
/// channel must match it. Channels absent from the registry are ignored.
pub fn aggregate(
    channel_counts: &ChannelCounts,
    registry: &ChannelRegistry,
) -> Result<PerCategory<Vec<f64>>, SnowError> {
    let n_bins = match registry.flatten().first() {
        Some(first) => lookup(channel_counts, first)?.len(),
        None => 0,
    };

    let mut total = vec![0.0; n_bins];
    let mut named = IndexMap::with_capacity(registry.category_count());
    for (category, members) in registry.groups() {
        let mut sums = vec![0.0; n_bins];
        for channel in members {
            let counts = lookup(channel_counts, channel)?;
            validate(channel, counts, n_bins)?;
            for (sum, value) in sums.iter_mut().zip(counts) {
                *sum += value;
            }
        }
        for (acc, value) in total.iter_mut().zip(&sums) {
            *acc += value;
        }
        named.insert(category.clone(), sums);
    }

    Ok(PerCategory { total, named })
}
