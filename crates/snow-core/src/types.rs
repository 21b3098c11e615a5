use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, SnowError};

/// Label reserved for the synthetic all-channels category.
pub const TOTAL: &str = "total";

/// Raw per-channel counts for a single time step, keyed by channel id.
pub type ChannelCounts = BTreeMap<String, Vec<f64>>;

/// Category selector: either the synthetic total or a named group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Sum over every channel of the registry.
    Total,
    /// A named group from the channel registry.
    Named(String),
}

impl Category {
    /// Builds a named category selector.
    pub fn named(name: impl Into<String>) -> Self {
        Category::Named(name.into())
    }

    /// Returns the column label used for this category.
    pub fn label(&self) -> &str {
        match self {
            Category::Total => TOTAL,
            Category::Named(name) => name,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Values held for the total slot and for every named category, in registry order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerCategory<T> {
    /// Value for the synthetic total category.
    pub total: T,
    /// Values for named categories, ordered as in the registry.
    pub named: IndexMap<String, T>,
}

impl<T> PerCategory<T> {
    /// Creates a container holding only the total slot.
    pub fn new(total: T) -> Self {
        Self {
            total,
            named: IndexMap::new(),
        }
    }

    /// Looks up the value for the given category.
    pub fn get(&self, category: &Category) -> Option<&T> {
        match category {
            Category::Total => Some(&self.total),
            Category::Named(name) => self.named.get(name),
        }
    }

    /// Looks up a category by its column label, `total` included.
    pub fn by_label(&self, label: &str) -> Option<&T> {
        if label == TOTAL {
            Some(&self.total)
        } else {
            self.named.get(label)
        }
    }

    /// Iterates `total` first, then named categories in order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> + '_ {
        std::iter::once((Category::Total, &self.total)).chain(
            self.named
                .iter()
                .map(|(name, value)| (Category::Named(name.clone()), value)),
        )
    }

    /// Iterates column labels and values, `total` first.
    pub fn labelled(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        std::iter::once((TOTAL, &self.total))
            .chain(self.named.iter().map(|(name, value)| (name.as_str(), value)))
    }

    /// Names of the named categories in order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.named.keys().map(String::as_str)
    }

    /// Number of slots including `total`.
    pub fn len(&self) -> usize {
        self.named.len() + 1
    }

    /// Always false: the total slot is present in every container.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Applies `f` to every slot, preserving order.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerCategory<U> {
        PerCategory {
            total: f(&self.total),
            named: self
                .named
                .iter()
                .map(|(name, value)| (name.clone(), f(value)))
                .collect(),
        }
    }

    /// Fallible variant of [`PerCategory::map`], stopping at the first error.
    pub fn try_map<U, E>(
        &self,
        mut f: impl FnMut(&T) -> Result<U, E>,
    ) -> Result<PerCategory<U>, E> {
        let total = f(&self.total)?;
        let mut named = IndexMap::with_capacity(self.named.len());
        for (name, value) in &self.named {
            named.insert(name.clone(), f(value)?);
        }
        Ok(PerCategory { total, named })
    }
}

/// Total counts and count-weighted mean energy for one category.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryStats {
    /// Counts summed over all energy bins.
    pub counts: f64,
    /// Count-weighted mean energy; exactly zero when `counts` is zero.
    pub mean_energy: f64,
}

/// Ascending energy values shared by every channel of a detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct EnergyBins(Vec<f64>);

impl EnergyBins {
    /// Validates that the values are finite, non-empty and strictly ascending.
    pub fn new(values: Vec<f64>) -> Result<Self, SnowError> {
        if values.is_empty() {
            return Err(SnowError::DataShape(ErrorInfo::new(
                "energy-bins-empty",
                "energy bins must contain at least one value",
            )));
        }
        if let Some(idx) = values.iter().position(|value| !value.is_finite()) {
            return Err(SnowError::DataShape(
                ErrorInfo::new("energy-bins-non-finite", "energy bin value is not finite")
                    .with_context("index", idx),
            ));
        }
        if let Some(idx) = values.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(SnowError::DataShape(
                ErrorInfo::new(
                    "energy-bins-not-ascending",
                    "energy bins must be strictly ascending",
                )
                .with_context("index", idx + 1)
                .with_context("previous", values[idx])
                .with_context("value", values[idx + 1]),
            ));
        }
        Ok(Self(values))
    }

    /// Energy values in ascending order.
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Number of energy bins.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated bin sequence.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowest energy value.
    pub fn min(&self) -> f64 {
        self.0[0]
    }

    /// Highest energy value.
    pub fn max(&self) -> f64 {
        self.0[self.0.len() - 1]
    }
}

impl TryFrom<Vec<f64>> for EnergyBins {
    type Error = SnowError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<EnergyBins> for Vec<f64> {
    fn from(bins: EnergyBins) -> Self {
        bins.0
    }
}

/// Composite identifier of one simulated model.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelKey {
    /// Model family (simulation set), e.g. `LMP`.
    pub family: String,
    /// Progenitor mass label as used in file names, e.g. `12.5`.
    pub mass: String,
    /// Detector configuration name.
    pub detector: String,
    /// Flavor mixing scheme label.
    pub mixing: String,
}

impl ModelKey {
    /// Creates a new model key.
    pub fn new(
        family: impl Into<String>,
        mass: impl Into<String>,
        detector: impl Into<String>,
        mixing: impl Into<String>,
    ) -> Self {
        Self {
            family: family.into(),
            mass: mass.into(),
            detector: detector.into(),
            mixing: mixing.into(),
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/m{}/{}/{}",
            self.family, self.mass, self.detector, self.mixing
        )
    }
}

/// Summary statistics for every category at one time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeStepRecord {
    /// Time of the step.
    pub time: f64,
    /// Per-category counts and mean energies.
    pub stats: PerCategory<CategoryStats>,
}

/// Time-ordered per-category statistics for one model.
///
/// Rows are strictly increasing in time and every row carries exactly the
/// table's named categories plus `total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSeriesTable", into = "RawTimeSeriesTable")]
pub struct TimeSeriesTable {
    key: ModelKey,
    categories: Vec<String>,
    rows: Vec<TimeStepRecord>,
}

/// Unvalidated wire form; rebuilt row by row through [`TimeSeriesTable::push`].
#[derive(Serialize, Deserialize)]
struct RawTimeSeriesTable {
    key: ModelKey,
    categories: Vec<String>,
    rows: Vec<TimeStepRecord>,
}

impl TryFrom<RawTimeSeriesTable> for TimeSeriesTable {
    type Error = SnowError;

    fn try_from(raw: RawTimeSeriesTable) -> Result<Self, Self::Error> {
        let mut table = Self::new(raw.key, raw.categories)?;
        for record in raw.rows {
            table.push(record)?;
        }
        Ok(table)
    }
}

impl From<TimeSeriesTable> for RawTimeSeriesTable {
    fn from(table: TimeSeriesTable) -> Self {
        Self {
            key: table.key,
            categories: table.categories,
            rows: table.rows,
        }
    }
}

impl TimeSeriesTable {
    /// Creates an empty table for the given named categories.
    pub fn new(key: ModelKey, categories: Vec<String>) -> Result<Self, SnowError> {
        for (idx, name) in categories.iter().enumerate() {
            if name == TOTAL {
                return Err(SnowError::Config(
                    ErrorInfo::new("table-reserved-category", "`total` is not a named category")
                        .with_context("model", &key),
                ));
            }
            if categories[..idx].contains(name) {
                return Err(SnowError::Config(
                    ErrorInfo::new("table-duplicate-category", "category listed twice")
                        .with_context("category", name)
                        .with_context("model", &key),
                ));
            }
        }
        Ok(Self {
            key,
            categories,
            rows: Vec::new(),
        })
    }

    /// Appends a row, enforcing time ordering and the category set.
    pub fn push(&mut self, record: TimeStepRecord) -> Result<(), SnowError> {
        if !record.time.is_finite() {
            return Err(SnowError::DataShape(
                ErrorInfo::new("table-time-non-finite", "row time is not finite")
                    .with_context("model", &self.key)
                    .with_context("row", self.rows.len()),
            ));
        }
        if let Some(last) = self.rows.last() {
            if record.time <= last.time {
                return Err(SnowError::DataShape(
                    ErrorInfo::new(
                        "table-time-order",
                        "rows must be strictly increasing in time",
                    )
                    .with_context("model", &self.key)
                    .with_context("row", self.rows.len())
                    .with_context("previous", last.time)
                    .with_context("time", record.time),
                ));
            }
        }
        if !record.stats.named.keys().eq(self.categories.iter()) {
            return Err(SnowError::DataShape(
                ErrorInfo::new(
                    "table-category-set",
                    "row categories differ from the table categories",
                )
                .with_context("model", &self.key)
                .with_context("row", self.rows.len())
                .with_context("expected", self.categories.join(","))
                .with_context(
                    "found",
                    record.stats.category_names().collect::<Vec<_>>().join(","),
                ),
            ));
        }
        self.rows.push(record);
        Ok(())
    }

    /// Model identifier.
    pub fn key(&self) -> &ModelKey {
        &self.key
    }

    /// Named categories in column order (excluding `total`).
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// All rows in time order.
    pub fn rows(&self) -> &[TimeStepRecord] {
        &self.rows
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Time values of every row.
    pub fn times(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.time).collect()
    }

    /// Whether the table carries the category.
    pub fn has_category(&self, category: &Category) -> bool {
        match category {
            Category::Total => true,
            Category::Named(name) => self.categories.contains(name),
        }
    }

    /// Per-row counts for one category.
    pub fn counts(&self, category: &Category) -> Result<Vec<f64>, SnowError> {
        self.column(category, |stats| stats.counts)
    }

    /// Per-row mean energies for one category.
    pub fn mean_energies(&self, category: &Category) -> Result<Vec<f64>, SnowError> {
        self.column(category, |stats| stats.mean_energy)
    }

    fn column(
        &self,
        category: &Category,
        pick: impl Fn(&CategoryStats) -> f64,
    ) -> Result<Vec<f64>, SnowError> {
        if !self.has_category(category) {
            return Err(SnowError::MissingData(
                ErrorInfo::new("table-category-missing", "category not present in table")
                    .with_context("category", category)
                    .with_context("model", &self.key),
            ));
        }
        Ok(self
            .rows
            .iter()
            .filter_map(|row| row.stats.get(category).map(&pick))
            .collect())
    }

    /// Rows in `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<&[TimeStepRecord], SnowError> {
        if start > end || end > self.rows.len() {
            return Err(SnowError::Range(
                ErrorInfo::new("table-slice", "slice lies outside the available time steps")
                    .with_context("start", start)
                    .with_context("end", end)
                    .with_context("rows", self.rows.len())
                    .with_context("model", &self.key),
            ));
        }
        Ok(&self.rows[start..end])
    }
}

/// Column name holding the mean energy of a category.
pub fn energy_column(label: &str) -> String {
    format!("energy_{label}")
}

/// Column name holding the counts of a category.
pub fn counts_column(label: &str) -> String {
    format!("counts_{label}")
}

/// Column layout shared by every table writer: `time`, energies, then counts.
pub fn column_names(categories: &[String]) -> Vec<String> {
    let labels: Vec<&str> = std::iter::once(TOTAL)
        .chain(categories.iter().map(String::as_str))
        .collect();
    let mut columns = Vec::with_capacity(1 + 2 * labels.len());
    columns.push("time".to_string());
    columns.extend(labels.iter().map(|label| energy_column(label)));
    columns.extend(labels.iter().map(|label| counts_column(label)));
    columns
}
