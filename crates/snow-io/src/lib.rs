#![deny(missing_docs)]
#![doc = "SNOwGLoBES input readers, table writers, run configuration and provenance for snowflash."]

/// YAML run configuration.
pub mod config;
/// CSV exports.
pub mod export;
/// Content hashing.
pub mod hash;
/// File naming.
pub mod paths;
/// Analyze run report.
pub mod report;
/// Canonical JSON and YAML helpers.
pub mod serde;
/// SNOwGLoBES output reader.
pub mod snowglobes;
/// Text time-series and window tables.
pub mod table;

pub use config::{load_config, AnalysisConfig, IntegrationSpec, ModelMatrix};
pub use export::{render_cumulative_csv, render_fractions_csv, write_csv};
pub use hash::{sha256_hex, stable_hash_string};
pub use report::{read_report, write_report, AnalyzeReport, WrittenTable};
pub use crate::serde::{from_json_slice, from_yaml_slice, to_canonical_json_bytes};
pub use snowglobes::{parse_column, SnowglobesSource};
pub use table::{
    parse_timebin_table, read_timebin_table, render_timebin_table, render_window_table,
    write_timebin_table, write_window_table,
};
