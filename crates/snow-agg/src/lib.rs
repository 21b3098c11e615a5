//! Channel aggregation and energy averaging, plus time-series assembly and
//! time integration across batches of models.
#![deny(missing_docs)]

/// Per-step summation of channel counts into categories.
pub mod aggregate;
/// Count-weighted mean energies.
pub mod average;
/// Parallel batch driver with per-model failure containment.
pub mod batch;
/// Cooperative cancellation.
pub mod cancel;
/// Running integrals over leading time bins.
pub mod cumulative;
/// Category shares of total counts.
pub mod fractions;
/// Time-series assembly for one model.
pub mod timeseries;
/// Fixed-window integration.
pub mod window;

pub use aggregate::aggregate;
pub use average::{average, summarize, summarize_groups};
pub use batch::{
    build_model, run_batch, BatchJob, BatchOpts, BatchReport, ModelFailure, ModelSource,
};
pub use cancel::CancelToken;
pub use cumulative::{
    integrate, integrate_cancellable, integrate_full, integrate_series, CumulativeRow,
    CumulativeSeries, CumulativeTable,
};
pub use fractions::{fractions, time_averaged_fraction, FractionTable};
pub use timeseries::{validate_time_grid, ChannelCountSource, TimeSeriesBuilder};
pub use window::{integrate_window, integrate_window_all, WindowTable};
