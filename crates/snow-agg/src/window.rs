use std::collections::BTreeMap;

use snow_core::errors::{ErrorInfo, SnowError};
use snow_core::{Category, CategoryStats, ModelKey, PerCategory, TimeSeriesTable};

use crate::cumulative::Accumulator;

/// Statistics integrated over a fixed number of leading bins, per model.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowTable {
    n_bins: usize,
    categories: Vec<String>,
    entries: BTreeMap<ModelKey, PerCategory<CategoryStats>>,
}

impl WindowTable {
    /// Number of leading bins integrated.
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Named categories shared by every entry, taken from the first model.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Stats for one model and category.
    pub fn get(&self, key: &ModelKey, category: &Category) -> Option<&CategoryStats> {
        self.entries.get(key).and_then(|stats| stats.get(category))
    }

    /// Entries in model-key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ModelKey, &PerCategory<CategoryStats>)> + '_ {
        self.entries.iter()
    }

    /// Number of models.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no models.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sums the first `n_bins` rows of one table.
pub fn integrate_window(
    table: &TimeSeriesTable,
    n_bins: usize,
) -> Result<PerCategory<CategoryStats>, SnowError> {
    if n_bins == 0 {
        return Err(SnowError::Range(
            ErrorInfo::new("window-empty", "window must include at least one time bin")
                .with_context("model", table.key()),
        ));
    }
    let rows = table.slice(0, n_bins)?;
    let mut accumulator = Accumulator::new(table.categories());
    for record in rows {
        accumulator.fold(record);
    }
    Ok(accumulator.snapshot())
}

/// Sums the first `n_bins` rows of every table.
pub fn integrate_window_all(
    tables: &BTreeMap<ModelKey, TimeSeriesTable>,
    n_bins: usize,
) -> Result<WindowTable, SnowError> {
    let categories = tables
        .values()
        .next()
        .map(|table| table.categories().to_vec())
        .unwrap_or_default();
    let mut entries = BTreeMap::new();
    for (key, table) in tables {
        if table.categories() != categories.as_slice() {
            return Err(SnowError::DataShape(
                ErrorInfo::new(
                    "window-category-set",
                    "models in one window table must share categories",
                )
                .with_context("model", key),
            ));
        }
        entries.insert(key.clone(), integrate_window(table, n_bins)?);
    }
    Ok(WindowTable {
        n_bins,
        categories,
        entries,
    })
}
