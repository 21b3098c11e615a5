//! Reader for SNOwGLoBES time keys and smeared event files.

use std::fs;
use std::path::{Path, PathBuf};

use snow_agg::ModelSource;
use snow_core::errors::{ErrorInfo, SnowError};
use snow_core::{ChannelRegistry, EnergyBins, ModelKey};
use tracing::debug;

use crate::paths::{channel_path, time_key_path};

/// Header lines preceding the time key data.
const KEY_HEADER_LINES: usize = 1;
/// Summary lines trailing every smeared event file.
const EVENT_FOOTER_LINES: usize = 2;
const GEV_TO_MEV: f64 = 1000.0;

const ENERGY_COLUMN: usize = 0;
const COUNTS_COLUMN: usize = 1;
const TIME_COLUMN: usize = 1;

fn read_text(path: &Path) -> Result<String, SnowError> {
    if !path.exists() {
        return Err(SnowError::MissingData(
            ErrorInfo::new("snowglobes-missing-file", "input file does not exist")
                .with_context("path", path.display()),
        ));
    }
    fs::read_to_string(path).map_err(|err| {
        SnowError::Io(
            ErrorInfo::new("snowglobes-read", "failed to read input file")
                .with_context("path", path.display())
                .with_hint(err.to_string()),
        )
    })
}

/// Extracts one numeric column from whitespace-separated text.
///
/// Blank lines and `#` comments are ignored before the header and footer
/// lines are dropped.
pub fn parse_column(
    text: &str,
    header: usize,
    footer: usize,
    column: usize,
) -> Result<Vec<f64>, SnowError> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .collect();
    let end = lines.len().saturating_sub(footer);
    let data = lines.get(header..end).unwrap_or_default();
    data.iter()
        .map(|&(line_no, line)| {
            let token = line.split_whitespace().nth(column).ok_or_else(|| {
                SnowError::DataShape(
                    ErrorInfo::new("snowglobes-column", "line has too few columns")
                        .with_context("line", line_no)
                        .with_context("column", column),
                )
            })?;
            token.parse::<f64>().map_err(|_| {
                SnowError::DataShape(
                    ErrorInfo::new("snowglobes-number", "value is not a number")
                        .with_context("line", line_no)
                        .with_context("value", token),
                )
            })
        })
        .collect()
}

fn read_column(
    path: &Path,
    header: usize,
    footer: usize,
    column: usize,
) -> Result<Vec<f64>, SnowError> {
    let text = read_text(path)?;
    let values = parse_column(&text, header, footer, column)
        .map_err(|err| err.with_context("path", path.display()))?;
    debug!(path = %path.display(), values = values.len(), "read column");
    Ok(values)
}

/// SNOwGLoBES output tree rooted at a directory containing one
/// subdirectory per mixing scheme, each with `fluxes/` and `out/`.
#[derive(Debug, Clone)]
pub struct SnowglobesSource {
    root: PathBuf,
}

impl SnowglobesSource {
    /// Creates a source over `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the output tree.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ModelSource for SnowglobesSource {
    fn time_grid(&self, key: &ModelKey) -> Result<Vec<f64>, SnowError> {
        read_column(
            &time_key_path(&self.root, key),
            KEY_HEADER_LINES,
            0,
            TIME_COLUMN,
        )
    }

    fn energy_bins(
        &self,
        key: &ModelKey,
        registry: &ChannelRegistry,
    ) -> Result<EnergyBins, SnowError> {
        let channel = registry.flatten().first().ok_or_else(|| {
            SnowError::Config(ErrorInfo::new(
                "snowglobes-no-channel",
                "registry has no channels to read energy bins from",
            ))
        })?;
        let path = channel_path(&self.root, key, channel, 0);
        let gev = read_column(&path, 0, EVENT_FOOTER_LINES, ENERGY_COLUMN)?;
        EnergyBins::new(gev.into_iter().map(|energy| energy * GEV_TO_MEV).collect())
            .map_err(|err| err.with_context("path", path.display()))
    }

    fn channel_counts(
        &self,
        key: &ModelKey,
        channel: &str,
        time_index: usize,
    ) -> Result<Vec<f64>, SnowError> {
        read_column(
            &channel_path(&self.root, key, channel, time_index),
            0,
            EVENT_FOOTER_LINES,
            COUNTS_COLUMN,
        )
    }
}
