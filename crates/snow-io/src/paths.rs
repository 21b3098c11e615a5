//! File naming for SNOwGLoBES inputs and analysis outputs.

use std::path::{Path, PathBuf};

use snow_core::ModelKey;

/// Name of the provenance report written by an analyze run.
pub const REPORT_FILE: &str = "analyze_report.json";

fn stem(key: &ModelKey) -> String {
    format!("pinched_{}_m{}", key.family, key.mass)
}

/// Time key listing the step times of one model.
pub fn time_key_path(root: &Path, key: &ModelKey) -> PathBuf {
    root.join(&key.mixing)
        .join("fluxes")
        .join(format!("{}_key.dat", stem(key)))
}

/// Smeared event file for one channel at a 0-based time index.
///
/// SNOwGLoBES numbers its time steps from one.
pub fn channel_path(root: &Path, key: &ModelKey, channel: &str, time_index: usize) -> PathBuf {
    root.join(&key.mixing).join("out").join(format!(
        "{}_{}_{}_{}_events_smeared.dat",
        stem(key),
        time_index + 1,
        channel,
        key.detector
    ))
}

/// Directory holding every per-model table of a family, detector and mixing.
pub fn model_dir(data: &Path, key: &ModelKey) -> PathBuf {
    data.join(&key.family).join(&key.detector).join(&key.mixing)
}

/// Time-series table of one model.
pub fn timebin_path(data: &Path, key: &ModelKey) -> PathBuf {
    model_dir(data, key).join(format!(
        "timebin_{}_{}_{}_m{}.dat",
        key.detector, key.mixing, key.family, key.mass
    ))
}

/// Cumulative table of every model sharing a family, detector and mixing.
pub fn cumulative_path(data: &Path, family: &str, detector: &str, mixing: &str) -> PathBuf {
    data.join(family)
        .join(detector)
        .join(mixing)
        .join(format!("cumulative_{detector}_{mixing}_{family}.csv"))
}

/// Window-integrated table of a family for a window length in milliseconds.
pub fn window_path(
    data: &Path,
    family: &str,
    detector: &str,
    mixing: &str,
    window_ms: u64,
) -> PathBuf {
    data.join(family)
        .join(detector)
        .join(mixing)
        .join(format!("{detector}_analysis_{family}_{window_ms}ms.dat"))
}

/// Fraction table comparing families for one detector, mixing and mass.
pub fn fractions_path(data: &Path, detector: &str, mixing: &str, mass: &str) -> PathBuf {
    data.join(format!("fractions_{detector}_{mixing}_m{mass}.csv"))
}

/// Provenance report of an analyze run.
pub fn report_path(data: &Path) -> PathBuf {
    data.join(REPORT_FILE)
}
