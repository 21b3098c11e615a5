#![deny(missing_docs)]
#![doc = "Core data types, channel registry and error surface shared by the snowflash crates."]

pub mod errors;
pub mod materials;
pub mod registry;
mod types;

pub use errors::{ErrorInfo, SnowError};
pub use registry::ChannelRegistry;
pub use types::{
    column_names, counts_column, energy_column, Category, CategoryStats, ChannelCounts,
    EnergyBins, ModelKey, PerCategory, TimeSeriesTable, TimeStepRecord, TOTAL,
};
