use std::collections::BTreeMap;

use snow_core::errors::{ErrorInfo, SnowError};
use snow_core::{Category, TimeSeriesTable, TOTAL};

/// Time-averaged share of total counts per (batch, category).
#[derive(Debug, Clone, PartialEq)]
pub struct FractionTable<K> {
    categories: Vec<String>,
    rows: BTreeMap<K, Vec<f64>>,
}

impl<K: Ord> FractionTable<K> {
    /// Categories in column order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Fraction for one batch and category.
    pub fn get(&self, batch: &K, category: &str) -> Option<f64> {
        let idx = self.categories.iter().position(|name| name == category)?;
        self.rows.get(batch).map(|row| row[idx])
    }

    /// Fractions of one batch in category order.
    pub fn row(&self, batch: &K) -> Option<&[f64]> {
        self.rows.get(batch).map(Vec::as_slice)
    }

    /// Batches in key order.
    pub fn batches(&self) -> impl Iterator<Item = &K> + '_ {
        self.rows.keys()
    }

    /// Number of batches.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no batch was processed.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Mean of `category / total` over steps with a nonzero total.
///
/// Steps with zero total are skipped; if all are zero the fraction is zero.
pub fn time_averaged_fraction(table: &TimeSeriesTable, category: &str) -> Result<f64, SnowError> {
    let counts = table.counts(&Category::named(category))?;
    let totals = table.counts(&Category::Total)?;
    let mut sum = 0.0;
    let mut steps = 0usize;
    for (count, total) in counts.iter().zip(&totals) {
        if *total != 0.0 {
            sum += count / total;
            steps += 1;
        }
    }
    Ok(if steps == 0 { 0.0 } else { sum / steps as f64 })
}

/// Computes each category's time-averaged share of total counts per table.
pub fn fractions<K>(
    tables: &BTreeMap<K, TimeSeriesTable>,
    categories: &[String],
) -> Result<FractionTable<K>, SnowError>
where
    K: Ord + Clone,
{
    if categories.iter().any(|name| name == TOTAL) {
        return Err(SnowError::Config(
            ErrorInfo::new(
                "fractions-total",
                "fractions are computed relative to `total`; list named categories only",
            ),
        ));
    }
    let mut rows = BTreeMap::new();
    for (batch, table) in tables {
        let row = categories
            .iter()
            .map(|category| time_averaged_fraction(table, category))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| err.with_context("model", table.key()))?;
        rows.insert(batch.clone(), row);
    }
    Ok(FractionTable {
        categories: categories.to_vec(),
        rows,
    })
}
