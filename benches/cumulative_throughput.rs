use std::collections::BTreeMap;

use criterion::{criterion_group, criterion_main, Criterion};
use indexmap::IndexMap;
use snow_agg::{integrate, integrate_window_all};
use snow_core::{CategoryStats, ModelKey, PerCategory, TimeSeriesTable, TimeStepRecord};

const CATEGORIES: [&str; 5] = ["IBD", "ES", "nue_O16", "nuebar_O16", "NC"];
const STEPS: usize = 400;

fn make_table(mass: usize) -> TimeSeriesTable {
    let key = ModelKey::new("Nakazato_2013", mass.to_string(), "wc100kt30prct", "nomix");
    let names: Vec<String> = CATEGORIES.iter().map(|name| name.to_string()).collect();
    let mut table = TimeSeriesTable::new(key, names.clone()).expect("table");
    for step in 0..STEPS {
        let mut named = IndexMap::new();
        let mut total = 0.0;
        for (idx, name) in names.iter().enumerate() {
            let counts = ((step * (idx + 1)) % 17) as f64;
            total += counts;
            named.insert(
                name.clone(),
                CategoryStats {
                    counts,
                    mean_energy: 10.0 + idx as f64,
                },
            );
        }
        let stats = PerCategory {
            total: CategoryStats {
                counts: total,
                mean_energy: 12.0,
            },
            named,
        };
        table
            .push(TimeStepRecord {
                time: step as f64 * 0.005,
                stats,
            })
            .expect("push");
    }
    table
}

fn bench_cumulative(c: &mut Criterion) {
    let tables: BTreeMap<ModelKey, TimeSeriesTable> = (10..30)
        .map(|mass| {
            let table = make_table(mass);
            (table.key().clone(), table)
        })
        .collect();
    c.bench_function("cumulative_throughput", |b| {
        b.iter(|| {
            let _ = integrate(&tables, STEPS).expect("integrate");
        });
    });
    c.bench_function("window_throughput", |b| {
        b.iter(|| {
            let _ = integrate_window_all(&tables, STEPS / 2).expect("window");
        });
    });
}

criterion_group!(benches, bench_cumulative);
criterion_main!(benches);
