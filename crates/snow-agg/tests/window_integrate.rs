mod common;

use std::collections::BTreeMap;

use snow_agg::{integrate, integrate_window, integrate_window_all};
use snow_core::Category;

use common::{approx, key, make_table};

fn tables() -> BTreeMap<snow_core::ModelKey, snow_core::TimeSeriesTable> {
    let mut tables = BTreeMap::new();
    for (mass, scale) in [("13", 1.0), ("20", 2.0)] {
        tables.insert(
            key(mass),
            make_table(
                key(mass),
                &["IBD", "ES"],
                &[
                    (0.0, &[(scale, 10.0), (0.5, 5.0)]),
                    (0.005, &[(2.0 * scale, 12.0), (0.0, 0.0)]),
                    (0.010, &[(3.0 * scale, 14.0), (1.0, 7.0)]),
                ],
            ),
        );
    }
    tables
}

#[test]
fn window_equals_cumulative_row() {
    let tables = tables();
    let cumulative = integrate(&tables, 3).expect("cumulative");
    let window = integrate_window_all(&tables, 2).expect("window");
    assert_eq!(window.n_bins(), 2);
    assert_eq!(window.len(), 2);
    for (model, stats) in window.iter() {
        for (category, value) in stats.iter() {
            let expected = cumulative.get(model, 2, &category).expect("cumulative entry");
            assert!(approx(value.counts, expected.counts));
            assert!(approx(value.mean_energy, expected.mean_energy));
        }
    }
    let es = window.get(&key("20"), &Category::named("ES")).expect("ES");
    assert_eq!(es.counts, 0.5);
    assert_eq!(es.mean_energy, 5.0);
}

#[test]
fn empty_or_oversized_windows_are_range_errors() {
    let tables = tables();
    let table = &tables[&key("13")];
    let err = integrate_window(table, 0).expect_err("zero bins");
    assert_eq!(err.info().code, "window-empty");
    let err = integrate_window(table, 4).expect_err("past the end");
    assert_eq!(err.family(), "range");
}

#[test]
fn models_must_share_categories() {
    let mut tables = tables();
    tables.insert(
        key("40"),
        make_table(key("40"), &["IBD"], &[(0.0, &[(1.0, 10.0)])]),
    );
    let err = integrate_window_all(&tables, 1).expect_err("category mismatch");
    assert_eq!(err.info().code, "window-category-set");
}
